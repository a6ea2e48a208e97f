use std::fmt::Debug;
use crate::core::{CandidateGrid, ConstraintResult, Error, Index, Stateful, Val};
use crate::model::Board;

/// Constraints check that the board is still valid. A good constraint:
/// - returns early when it hits a contradiction or a certainty;
/// - narrows the candidate grid when it can rule values out;
/// - keeps incremental state via Stateful so check() stays cheap.
///
/// It is also legal for a constraint to only ever report Contradiction/Ok
/// without touching the candidate grid; that just leaves the solver with more
/// branching to do.
pub trait Constraint: Stateful + Debug {
    /// Check the constraint against the board (and any internal state from
    /// past actions), narrowing the candidate grid where possible.
    fn check(&self, board: &Board, grid: &mut CandidateGrid) -> ConstraintResult;
    /// Debug information at a particular cell, if any is available.
    fn debug_at(&self, board: &Board, index: Index) -> Option<String>;
}

/// Conjunction of an arbitrary set of constraints, short-circuiting on the
/// first contradiction or certainty.
pub struct MultiConstraint {
    constraints: Vec<Box<dyn Constraint>>,
}

impl MultiConstraint {
    pub fn new(constraints: Vec<Box<dyn Constraint>>) -> Self {
        MultiConstraint { constraints }
    }
}

impl Debug for MultiConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for c in &self.constraints {
            write!(f, "{:?}", c)?
        }
        Ok(())
    }
}

impl Stateful for MultiConstraint {
    fn reset(&mut self) {
        for c in &mut self.constraints {
            c.reset();
        }
    }

    fn apply(&mut self, index: Index, value: Val) -> Result<(), Error> {
        let mut res = Ok(());
        for c in &mut self.constraints {
            let maybe_err = c.apply(index, value);
            if maybe_err.is_err() {
                res = maybe_err;
            }
        }
        res
    }

    fn undo(&mut self, index: Index, value: Val) -> Result<(), Error> {
        let mut res = Ok(());
        for c in &mut self.constraints {
            let maybe_err = c.undo(index, value);
            if maybe_err.is_err() {
                res = maybe_err;
            }
        }
        res
    }
}

impl Constraint for MultiConstraint {
    fn check(&self, board: &Board, grid: &mut CandidateGrid) -> ConstraintResult {
        for c in &self.constraints {
            match c.check(board, grid) {
                ConstraintResult::Contradiction(a) => return ConstraintResult::Contradiction(a),
                ConstraintResult::Certainty(d, a) => return ConstraintResult::Certainty(d, a),
                ConstraintResult::Ok => {}
            }
        }
        ConstraintResult::Ok
    }

    fn debug_at(&self, board: &Board, index: Index) -> Option<String> {
        let somes = self.constraints.iter()
            .filter_map(|c| c.debug_at(board, index))
            .collect::<Vec<String>>();
        if somes.is_empty() {
            None
        } else {
            Some(somes.join("\n"))
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util {
    use super::*;

    pub fn assert_contradiction(cr: ConstraintResult, expected_attribution: &'static str) {
        if let ConstraintResult::Contradiction(a) = cr {
            let actual = a.name();
            assert_eq!(
                actual, expected_attribution,
                "Expected contradiction attributed to {}; got {}",
                expected_attribution, actual,
            );
        } else {
            panic!("Expected a contradiction; got: {:?}", cr);
        }
    }

    pub fn assert_no_contradiction(cr: ConstraintResult) {
        if let ConstraintResult::Contradiction(a) = cr {
            panic!("Expected no contradiction; got: {}", a.name());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use super::test_util::*;
    use crate::core::Attribution;
    use crate::model::CspModel;

    fn empty_board(n: usize) -> Board {
        CspModel::build(n, &vec![vec![0; n]; n]).unwrap().board()
    }

    /// Test constraint forbidding one value anywhere on the board.
    #[derive(Debug, Clone)]
    struct BlacklistedVal(u8);
    impl Stateful for BlacklistedVal {}
    impl Constraint for BlacklistedVal {
        fn check(&self, board: &Board, grid: &mut CandidateGrid) -> ConstraintResult {
            for index in board.size().cell_iter() {
                if board.get(index) == Some(Val::new(self.0)) {
                    return ConstraintResult::Contradiction(Attribution::new("BLACKLISTED"));
                }
                grid.get_mut(index).remove(Val::new(self.0));
            }
            ConstraintResult::Ok
        }
        fn debug_at(&self, _: &Board, _: Index) -> Option<String> {
            Some(format!("blacklisted: {}", self.0))
        }
    }

    #[test]
    fn test_multi_constraint_short_circuits() {
        let mut board = empty_board(4);
        let constraint = MultiConstraint::new(vec_box::vec_box![
            BlacklistedVal(1), BlacklistedVal(2),
        ]);
        let mut grid = CandidateGrid::full(4);
        assert_no_contradiction(constraint.check(&board, &mut grid));
        board.apply([0, 0], Val::new(2)).unwrap();
        assert_contradiction(constraint.check(&board, &mut grid), "BLACKLISTED");
        board.undo([0, 0], Val::new(2)).unwrap();
        board.apply([0, 0], Val::new(3)).unwrap();
        assert_no_contradiction(constraint.check(&board, &mut grid));
    }

    #[test]
    fn test_multi_constraint_narrows_grid() {
        let board = empty_board(4);
        let constraint = MultiConstraint::new(vec_box::vec_box![
            BlacklistedVal(1), BlacklistedVal(4),
        ]);
        let mut grid = CandidateGrid::full(4);
        assert_no_contradiction(constraint.check(&board, &mut grid));
        assert_eq!(
            grid.get([2, 2]).to_vec(),
            vec![Val::new(2), Val::new(3)],
        );
    }
}

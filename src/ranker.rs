use crate::core::{Attribution, BranchPoint, CandidateGrid, CertainDecision, ConstraintResult};
use crate::model::Board;

/// A ranker picks the best cell to branch on next. A cell's candidates form a
/// mutually exclusive and exhaustive set of guesses, so a single cell per
/// branch point is all the solver ever needs.
pub trait Ranker {
    /// The next branch point. Must never suggest an already-filled cell, and
    /// must return an empty branch point when nothing is left to fill.
    fn top(&self, step: usize, grid: &CandidateGrid, board: &Board) -> BranchPoint;

    /// Collapse the candidate grid into a ConstraintResult: surface any empty
    /// domain as a contradiction and any singleton domain as a certainty.
    /// This must be compatible with top() -- whenever this returns Ok, top()
    /// has at least one real choice to offer (or the board is complete).
    fn to_constraint_result(&self, grid: &CandidateGrid, board: &Board) -> ConstraintResult;
}

pub const BOARD_COMPLETE_ATTRIBUTION: &str = "BOARD_COMPLETE";
pub const FEWEST_CANDIDATES_ATTRIBUTION: &str = "FEWEST_CANDIDATES";
pub const CELL_NO_CANDIDATES_ATTRIBUTION: &str = "CELL_NO_CANDIDATES";
pub const CELL_ONE_CANDIDATE_ATTRIBUTION: &str = "CELL_ONE_CANDIDATE";

/// Minimum-remaining-values ranking: branch on the unfilled cell with the
/// fewest candidates left. The row-major scan keeps ties deterministic
/// (lowest row, then lowest column wins), and candidate sets iterate in
/// ascending value order, so the whole search is reproducible.
pub struct MrvRanker {
    complete_attr: Attribution,
    fewest_attr: Attribution,
    no_candidates_attr: Attribution,
    one_candidate_attr: Attribution,
}

impl MrvRanker {
    pub fn new() -> Self {
        MrvRanker {
            complete_attr: Attribution::new(BOARD_COMPLETE_ATTRIBUTION),
            fewest_attr: Attribution::new(FEWEST_CANDIDATES_ATTRIBUTION),
            no_candidates_attr: Attribution::new(CELL_NO_CANDIDATES_ATTRIBUTION),
            one_candidate_attr: Attribution::new(CELL_ONE_CANDIDATE_ATTRIBUTION),
        }
    }
}

impl Default for MrvRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ranker for MrvRanker {
    fn top(&self, step: usize, grid: &CandidateGrid, board: &Board) -> BranchPoint {
        let mut best: Option<(usize, [usize; 2])> = None;
        for index in board.size().cell_iter() {
            if board.get(index).is_some() {
                continue;
            }
            let len = grid.get(index).len();
            // Strict comparison keeps the earliest cell on ties.
            if best.map_or(true, |(best_len, _)| len < best_len) {
                best = Some((len, index));
            }
        }
        if let Some((_, index)) = best {
            BranchPoint::for_cell(step, self.fewest_attr, index, grid.get(index).to_vec())
        } else {
            BranchPoint::empty(step, self.complete_attr)
        }
    }

    fn to_constraint_result(&self, grid: &CandidateGrid, board: &Board) -> ConstraintResult {
        for index in board.size().cell_iter() {
            if board.get(index).is_some() {
                continue;
            }
            let cell = grid.get(index);
            if cell.is_empty() {
                return ConstraintResult::Contradiction(self.no_candidates_attr);
            } else if let Some(v) = cell.as_singleton() {
                return ConstraintResult::Certainty(
                    CertainDecision::new(index, v),
                    self.one_candidate_attr,
                );
            }
        }
        ConstraintResult::Ok
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{Stateful, Val};
    use crate::model::CspModel;

    fn empty_board(n: usize) -> Board {
        CspModel::build(n, &vec![vec![0; n]; n]).unwrap().board()
    }

    #[test]
    fn test_top_picks_fewest_candidates() {
        let board = empty_board(4);
        let mut grid = CandidateGrid::full(4);
        grid.get_mut([2, 1]).remove(Val::new(1));
        grid.get_mut([2, 1]).remove(Val::new(4));
        let ranker = MrvRanker::new();
        let bp = ranker.top(7, &grid, &board);
        assert_eq!(bp.branch_step, 7);
        assert_eq!(bp.chosen(), Some(([2, 1], Val::new(2))));
        assert_eq!(bp.remaining(), 1);
    }

    #[test]
    fn test_top_tie_breaks_row_major() {
        let board = empty_board(4);
        let grid = CandidateGrid::full(4);
        let ranker = MrvRanker::new();
        let bp = ranker.top(0, &grid, &board);
        // All domains equal, so the first cell wins.
        assert_eq!(bp.chosen(), Some(([0, 0], Val::new(1))));
        assert_eq!(bp.remaining(), 3);
    }

    #[test]
    fn test_top_skips_filled_cells() {
        let mut board = empty_board(4);
        board.apply([0, 0], Val::new(1)).unwrap();
        let mut grid = CandidateGrid::full(4);
        grid.set_singleton([0, 0], Val::new(1));
        let ranker = MrvRanker::new();
        let bp = ranker.top(0, &grid, &board);
        assert_eq!(bp.chosen().map(|(i, _)| i), Some([0, 1]));
    }

    #[test]
    fn test_top_empty_when_complete() {
        let mut board = empty_board(4);
        for index in board.size().cell_iter() {
            board.apply(index, Val::new(1)).unwrap();
        }
        let ranker = MrvRanker::new();
        let bp = ranker.top(0, &CandidateGrid::full(4), &board);
        assert_eq!(bp.chosen(), None);
        assert_eq!(bp.attribution.name(), BOARD_COMPLETE_ATTRIBUTION);
    }

    #[test]
    fn test_collapse_contradiction_and_certainty() {
        let board = empty_board(4);
        let ranker = MrvRanker::new();
        let mut grid = CandidateGrid::full(4);
        assert_eq!(ranker.to_constraint_result(&grid, &board), ConstraintResult::Ok);
        grid.set_singleton([1, 2], Val::new(3));
        match ranker.to_constraint_result(&grid, &board) {
            ConstraintResult::Certainty(d, a) => {
                assert_eq!(d.index, [1, 2]);
                assert_eq!(d.value, Val::new(3));
                assert_eq!(a.name(), CELL_ONE_CANDIDATE_ATTRIBUTION);
            }
            other => panic!("expected certainty, got {:?}", other),
        }
        for v in 1..=4 {
            grid.get_mut([0, 3]).remove(Val::new(v));
        }
        match ranker.to_constraint_result(&grid, &board) {
            ConstraintResult::Contradiction(a) => {
                assert_eq!(a.name(), CELL_NO_CANDIDATES_ATTRIBUTION);
            }
            other => panic!("expected contradiction, got {:?}", other),
        }
    }
}

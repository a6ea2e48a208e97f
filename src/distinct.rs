//! The classical Sudoku constraint: values are pairwise distinct within every
//! row, column, and block.

use std::fmt::Debug;
use crate::constraint::Constraint;
use crate::core::{Attribution, CandidateGrid, ConstraintResult, Error, Index, Stateful, Val, ValSet};
use crate::grid::GridSize;
use crate::model::Board;

pub const ROW_CONFLICT_ATTRIBUTION: &str = "ROW_CONFLICT";
pub const COL_CONFLICT_ATTRIBUTION: &str = "COL_CONFLICT";
pub const BLOCK_CONFLICT_ATTRIBUTION: &str = "BLOCK_CONFLICT";

pub const ILLEGAL_ACTION_PENDING: Error =
    Error::new_const("A distinctness violation already exists; can't apply further actions");

/// Incremental all-different checker over the 3N groups. Tracks the still
/// unused values of every row, column, and block; check() intersects each
/// empty cell's candidates with the three enclosing groups, which is the
/// pruning that drives naked-single propagation in the solver.
pub struct DistinctChecker {
    size: GridSize,
    rows: Vec<ValSet>,
    cols: Vec<ValSet>,
    blocks: Vec<ValSet>,
    row_attr: Attribution,
    col_attr: Attribution,
    block_attr: Attribution,
    // An applied action that directly violated a group. At most one such
    // action can be outstanding; the solver backtracks it before trying
    // anything else.
    illegal: Option<(Index, Val, Attribution)>,
}

impl DistinctChecker {
    pub fn new(size: GridSize) -> Self {
        let n = size.n();
        Self {
            size,
            rows: vec![ValSet::full(n); n],
            cols: vec![ValSet::full(n); n],
            blocks: vec![ValSet::full(n); n],
            row_attr: Attribution::new(ROW_CONFLICT_ATTRIBUTION),
            col_attr: Attribution::new(COL_CONFLICT_ATTRIBUTION),
            block_attr: Attribution::new(BLOCK_CONFLICT_ATTRIBUTION),
            illegal: None,
        }
    }

    /// Values not yet used in any of the three groups enclosing a cell.
    fn unused_at(&self, index: Index) -> ValSet {
        let mut s = self.rows[index[0]].clone();
        s.intersect_with(&self.cols[index[1]]);
        s.intersect_with(&self.blocks[self.size.block_of(index)]);
        s
    }
}

impl Debug for DistinctChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some((i, v, a)) = &self.illegal {
            writeln!(f, "Illegal move: {:?}={} ({})", i, v, a.name())?;
        }
        writeln!(f, "Unused vals by row:")?;
        for (r, s) in self.rows.iter().enumerate() {
            writeln!(f, " {}: {:?}", r, s.to_vec())?;
        }
        writeln!(f, "Unused vals by col:")?;
        for (c, s) in self.cols.iter().enumerate() {
            writeln!(f, " {}: {:?}", c, s.to_vec())?;
        }
        writeln!(f, "Unused vals by block:")?;
        for (b, s) in self.blocks.iter().enumerate() {
            writeln!(f, " {}: {:?}", b, s.to_vec())?;
        }
        Ok(())
    }
}

impl Stateful for DistinctChecker {
    fn reset(&mut self) {
        let n = self.size.n();
        self.rows = vec![ValSet::full(n); n];
        self.cols = vec![ValSet::full(n); n];
        self.blocks = vec![ValSet::full(n); n];
        self.illegal = None;
    }

    fn apply(&mut self, index: Index, value: Val) -> Result<(), Error> {
        if self.illegal.is_some() {
            return Err(ILLEGAL_ACTION_PENDING);
        }
        let b = self.size.block_of(index);
        if !self.rows[index[0]].contains(value) {
            self.illegal = Some((index, value, self.row_attr));
            return Ok(());
        } else if !self.cols[index[1]].contains(value) {
            self.illegal = Some((index, value, self.col_attr));
            return Ok(());
        } else if !self.blocks[b].contains(value) {
            self.illegal = Some((index, value, self.block_attr));
            return Ok(());
        }
        self.rows[index[0]].remove(value);
        self.cols[index[1]].remove(value);
        self.blocks[b].remove(value);
        Ok(())
    }

    fn undo(&mut self, index: Index, value: Val) -> Result<(), Error> {
        if let Some((i, v, _)) = self.illegal {
            if i != index || v != value {
                return Err(Error::new_const("Undo does not match the pending illegal move"));
            }
            self.illegal = None;
            return Ok(());
        }
        let b = self.size.block_of(index);
        self.rows[index[0]].insert(value);
        self.cols[index[1]].insert(value);
        self.blocks[b].insert(value);
        Ok(())
    }
}

impl Constraint for DistinctChecker {
    fn check(&self, board: &Board, grid: &mut CandidateGrid) -> ConstraintResult {
        if let Some((_, _, a)) = &self.illegal {
            return ConstraintResult::Contradiction(*a);
        }
        for index in board.size().cell_iter() {
            if board.get(index).is_some() {
                continue;
            }
            grid.get_mut(index).intersect_with(&self.unused_at(index));
        }
        ConstraintResult::Ok
    }

    fn debug_at(&self, _: &Board, index: Index) -> Option<String> {
        if let Some((i, v, a)) = &self.illegal {
            if *i == index {
                return Some(format!("DistinctChecker:\n  Illegal move: {} ({})", v, a.name()));
            }
        }
        Some(format!(
            "DistinctChecker:\n  Unused vals for this cell: {:?}",
            self.unused_at(index).to_vec(),
        ))
    }
}

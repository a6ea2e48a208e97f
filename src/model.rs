use std::fmt::Debug;
use crate::core::{CandidateGrid, Error, Index, Stateful, Val, ValSet};
use crate::grid::{Grid, GridSize, InvalidGrid};

/// Which family of all-different groups a group belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupFamily {
    Row,
    Col,
    Block,
}

/// One all-different constraint group: N cells that must take pairwise
/// distinct values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub family: GroupFamily,
    pub id: usize,
    pub cells: Vec<Index>,
}

/// All 3N groups of a grid: N rows, then N columns, then N blocks.
pub fn all_groups(size: GridSize) -> Vec<Group> {
    let n = size.n();
    let mut groups = Vec::with_capacity(3 * n);
    for r in 0..n {
        groups.push(Group { family: GroupFamily::Row, id: r, cells: size.row_iter(r).collect() });
    }
    for c in 0..n {
        groups.push(Group { family: GroupFamily::Col, id: c, cells: size.col_iter(c).collect() });
    }
    for b in 0..n {
        groups.push(Group { family: GroupFamily::Block, id: b, cells: size.block_iter(b).collect() });
    }
    groups
}

/// A CSP instance derived from a raw grid: a domain per cell (singleton for
/// fixed cells, the full 1..=N range otherwise), the fixed assignments, and
/// the 3N all-different groups. Building one performs all structural
/// validation; the solver trusts what it is handed.
#[derive(Debug, Clone)]
pub struct CspModel {
    grid: Grid,
    domains: CandidateGrid,
    groups: Vec<Group>,
}

impl CspModel {
    pub fn build(n: usize, rows: &[Vec<u32>]) -> Result<Self, InvalidGrid> {
        let grid = Grid::from_rows(n, rows)?;
        let size = grid.size();
        let mut domains = CandidateGrid::full(size.n());
        for index in size.cell_iter() {
            if let Some(v) = grid.get(index) {
                domains.set_singleton(index, v);
            }
        }
        Ok(CspModel { grid, domains, groups: all_groups(size) })
    }

    pub fn size(&self) -> GridSize {
        self.grid.size()
    }

    pub fn domains(&self) -> &CandidateGrid {
        &self.domains
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// The fixed assignments, in row-major order.
    pub fn givens(&self) -> Vec<(Index, Val)> {
        self.size()
            .cell_iter()
            .filter_map(|i| self.grid.get(i).map(|v| (i, v)))
            .collect()
    }

    /// The mutable search state seeded with this model's fixed cells.
    pub fn board(&self) -> Board {
        Board::new(self.grid.clone())
    }
}

/// Checks that a grid is a complete, consistent solution: no unknowns, and
/// every row, column, and block holds each value exactly once. This is the
/// correctness boundary for anything the solver claims to have solved.
pub fn check_solution(grid: &Grid) -> Result<(), Error> {
    if !grid.is_complete() {
        return Err(Error::new_const("solution has unfilled cells"));
    }
    let size = grid.size();
    for group in all_groups(size) {
        let mut seen = ValSet::empty(size.n());
        for index in &group.cells {
            // Complete grid, so the value is always present.
            if let Some(v) = grid.get(*index) {
                if seen.contains(v) {
                    return Err(Error::new(format!(
                        "value {} repeats in {:?} {}", v, group.family, group.id,
                    )));
                }
                seen.insert(v);
            }
        }
    }
    Ok(())
}

pub const OUT_OF_BOUNDS_ERROR: Error = Error::new_const("Out of bounds");
pub const ALREADY_FILLED_ERROR: Error = Error::new_const("Cell already filled");
pub const NO_SUCH_ACTION_ERROR: Error = Error::new_const("No such action to undo");
pub const UNDO_MISMATCH_ERROR: Error = Error::new_const("Undo value mismatch");

/// The grid as the search fills it in. Keeps the original givens so that
/// reset() returns to the initial position rather than an empty board.
#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    given: Grid,
}

impl Board {
    pub fn new(given: Grid) -> Self {
        Board { grid: given.clone(), given }
    }

    pub fn size(&self) -> GridSize {
        self.grid.size()
    }

    pub fn get(&self, index: Index) -> Option<Val> {
        self.grid.get(index)
    }

    pub fn is_given(&self, index: Index) -> bool {
        self.given.get(index).is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.grid.is_complete()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

impl Stateful for Board {
    fn reset(&mut self) {
        self.grid = self.given.clone();
    }

    fn apply(&mut self, index: Index, value: Val) -> Result<(), Error> {
        let n = self.size().n();
        if index[0] >= n || index[1] >= n {
            return Err(OUT_OF_BOUNDS_ERROR);
        }
        if self.grid.get(index).is_some() {
            return Err(ALREADY_FILLED_ERROR);
        }
        self.grid.set(index, Some(value));
        Ok(())
    }

    fn undo(&mut self, index: Index, value: Val) -> Result<(), Error> {
        let n = self.size().n();
        if index[0] >= n || index[1] >= n {
            return Err(OUT_OF_BOUNDS_ERROR);
        }
        match self.grid.get(index) {
            None => return Err(NO_SUCH_ACTION_ERROR),
            Some(v) if v != value => return Err(UNDO_MISMATCH_ERROR),
            Some(_) => {}
        }
        self.grid.set(index, None);
        Ok(())
    }
}

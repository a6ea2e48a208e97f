use std::fmt::{Debug, Display};
use serde_derive::{Deserialize, Serialize};
use crate::core::{Index, Val};

/// Why a raw input grid was rejected before any solving was attempted. The
/// solver itself never produces these; once a `Grid` exists, its shape and
/// value ranges are trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidGrid {
    UnsupportedSize(usize),
    WrongRowCount { expected: usize, actual: usize },
    WrongRowLength { row: usize, expected: usize, actual: usize },
    ValueOutOfRange { index: Index, value: u32, max: u32 },
    UnparsableCell { index: Index, ch: char },
}

impl Display for InvalidGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidGrid::UnsupportedSize(n) => {
                write!(f, "unsupported grid size {} (must be 4, 9, or 16)", n)
            }
            InvalidGrid::WrongRowCount { expected, actual } => {
                write!(f, "expected {} rows, got {}", expected, actual)
            }
            InvalidGrid::WrongRowLength { row, expected, actual } => {
                write!(f, "row {} has {} cells, expected {}", row, actual, expected)
            }
            InvalidGrid::ValueOutOfRange { index, value, max } => {
                write!(
                    f,
                    "cell ({}, {}) holds {} which is outside 0..={}",
                    index[0], index[1], value, max,
                )
            }
            InvalidGrid::UnparsableCell { index, ch } => {
                write!(f, "cell ({}, {}) holds unparsable {:?}", index[0], index[1], ch)
            }
        }
    }
}

impl std::error::Error for InvalidGrid {}

/// A validated grid size. Only 4, 9, and 16 are supported; anything else has
/// no integer block size (or is simply not a puzzle this crate models).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    n: usize,
    block: usize,
}

impl GridSize {
    pub fn new(n: usize) -> Result<Self, InvalidGrid> {
        let block = match n {
            4 => 2,
            9 => 3,
            16 => 4,
            _ => return Err(InvalidGrid::UnsupportedSize(n)),
        };
        Ok(GridSize { n, block })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Side length of a block (√N).
    pub fn block(&self) -> usize {
        self.block
    }

    pub fn cell_count(&self) -> usize {
        self.n * self.n
    }

    /// Which of the N blocks a cell falls in. Blocks are numbered row-major,
    /// so for 9×9 the top-middle block is 1 and the bottom-right is 8.
    pub fn block_of(&self, index: Index) -> usize {
        (index[0] / self.block) * self.block + index[1] / self.block
    }

    pub fn row_iter(&self, r: usize) -> impl Iterator<Item = Index> {
        (0..self.n).map(move |c| [r, c])
    }

    pub fn col_iter(&self, c: usize) -> impl Iterator<Item = Index> {
        (0..self.n).map(move |r| [r, c])
    }

    pub fn block_iter(&self, b: usize) -> impl Iterator<Item = Index> {
        let b0 = (b / self.block) * self.block;
        let c0 = (b % self.block) * self.block;
        let block = self.block;
        (0..block * block).map(move |i| [b0 + i / block, c0 + i % block])
    }

    pub fn cell_iter(&self) -> impl Iterator<Item = Index> {
        let n = self.n;
        (0..n * n).map(move |i| [i / n, i % n])
    }
}

// Wire shape for serde: size plus 0-for-unknown integer rows, the same raw
// form the solve() entry points accept.
#[derive(Serialize, Deserialize)]
struct GridRepr {
    size: usize,
    rows: Vec<Vec<u32>>,
}

/// An N×N table of values with unknowns; the only artifact exchanged with
/// callers. A `Grid` is structurally valid by construction.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr", into = "GridRepr")]
pub struct Grid {
    size: GridSize,
    cells: Box<[Option<Val>]>,
}

impl Grid {
    pub fn new(size: GridSize) -> Self {
        Grid { size, cells: vec![None; size.cell_count()].into_boxed_slice() }
    }

    /// Build a grid from raw rows of integers in [0, N], 0 meaning unknown.
    /// This is the structural validation gate: dimension mismatches and
    /// out-of-range values are rejected here, before any solving.
    pub fn from_rows(n: usize, rows: &[Vec<u32>]) -> Result<Self, InvalidGrid> {
        let size = GridSize::new(n)?;
        if rows.len() != n {
            return Err(InvalidGrid::WrongRowCount { expected: n, actual: rows.len() });
        }
        let mut grid = Grid::new(size);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(InvalidGrid::WrongRowLength {
                    row: r,
                    expected: n,
                    actual: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                if value > n as u32 {
                    return Err(InvalidGrid::ValueOutOfRange {
                        index: [r, c],
                        value,
                        max: n as u32,
                    });
                }
                if value != 0 {
                    grid.set([r, c], Some(Val::new(value as u8)));
                }
            }
        }
        Ok(grid)
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn get(&self, index: Index) -> Option<Val> {
        self.cells[index[0] * self.size.n + index[1]]
    }

    pub fn set(&mut self, index: Index, value: Option<Val>) {
        if let Some(v) = value {
            assert!(
                v.get() as usize <= self.size.n,
                "value {} does not fit in a {}x{} grid",
                v.get(),
                self.size.n,
                self.size.n,
            );
        }
        self.cells[index[0] * self.size.n + index[1]] = value;
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        (0..self.size.n)
            .map(|r| {
                (0..self.size.n)
                    .map(|c| self.get([r, c]).map_or(0, |v| v.get() as u32))
                    .collect()
            })
            .collect()
    }

    /// Parse the one-char-per-cell textual form produced by Display. The grid
    /// size is inferred from the number of lines.
    pub fn parse(s: &str) -> Result<Self, InvalidGrid> {
        let lines: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let n = lines.len();
        let size = GridSize::new(n)?;
        let mut grid = Grid::new(size);
        for (r, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            if chars.len() != n {
                return Err(InvalidGrid::WrongRowLength {
                    row: r,
                    expected: n,
                    actual: chars.len(),
                });
            }
            for (c, &ch) in chars.iter().enumerate() {
                if ch == '.' {
                    continue;
                }
                let value = char_to_val(ch)
                    .ok_or(InvalidGrid::UnparsableCell { index: [r, c], ch })?;
                if value.get() as usize > n {
                    return Err(InvalidGrid::ValueOutOfRange {
                        index: [r, c],
                        value: value.get() as u32,
                        max: n as u32,
                    });
                }
                grid.set([r, c], Some(value));
            }
        }
        Ok(grid)
    }
}

// One character per cell so a 16×16 grid still lines up: 1-9 as digits,
// 10-16 as A-G, '.' for unknown.
fn val_to_char(v: Val) -> char {
    match v.get() {
        1..=9 => (b'0' + v.get()) as char,
        10..=16 => (b'A' + v.get() - 10) as char,
        _ => unreachable!("values above 16 are rejected at the boundary"),
    }
}

fn char_to_val(ch: char) -> Option<Val> {
    match ch {
        '1'..='9' => Some(Val::new(ch as u8 - b'0')),
        'A'..='G' => Some(Val::new(ch as u8 - b'A' + 10)),
        'a'..='g' => Some(Val::new(ch as u8 - b'a' + 10)),
        _ => None,
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for r in 0..self.size.n {
            for c in 0..self.size.n {
                match self.get([r, c]) {
                    Some(v) => write!(f, "{}", val_to_char(v))?,
                    None => write!(f, ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl TryFrom<GridRepr> for Grid {
    type Error = InvalidGrid;
    fn try_from(repr: GridRepr) -> Result<Self, InvalidGrid> {
        Grid::from_rows(repr.size, &repr.rows)
    }
}

impl From<Grid> for GridRepr {
    fn from(grid: Grid) -> Self {
        GridRepr { size: grid.size.n(), rows: grid.to_rows() }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_grid_size_validation() {
        assert!(GridSize::new(4).is_ok());
        assert!(GridSize::new(9).is_ok());
        assert!(GridSize::new(16).is_ok());
        for n in [0, 1, 2, 3, 5, 6, 8, 12, 25] {
            assert_eq!(GridSize::new(n), Err(InvalidGrid::UnsupportedSize(n)));
        }
    }

    #[test]
    fn test_block_partitioning() {
        let nine = GridSize::new(9).unwrap();
        assert_eq!(nine.block(), 3);
        assert_eq!(nine.block_of([0, 0]), 0);
        assert_eq!(nine.block_of([0, 4]), 1);
        assert_eq!(nine.block_of([7, 4]), 7);
        assert_eq!(nine.block_of([8, 8]), 8);
        let four = GridSize::new(4).unwrap();
        assert_eq!(four.block(), 2);
        assert_eq!(four.block_of([1, 1]), 0);
        assert_eq!(four.block_of([2, 1]), 2);
        assert_eq!(four.block_of([3, 3]), 3);
    }

    #[test]
    fn test_group_iterators() {
        let four = GridSize::new(4).unwrap();
        assert_eq!(
            four.row_iter(2).collect::<Vec<_>>(),
            vec![[2, 0], [2, 1], [2, 2], [2, 3]],
        );
        assert_eq!(
            four.col_iter(1).collect::<Vec<_>>(),
            vec![[0, 1], [1, 1], [2, 1], [3, 1]],
        );
        assert_eq!(
            four.block_iter(3).collect::<Vec<_>>(),
            vec![[2, 2], [2, 3], [3, 2], [3, 3]],
        );
        let nine = GridSize::new(9).unwrap();
        assert_eq!(
            nine.block_iter(7).collect::<Vec<_>>(),
            vec![[6, 3], [6, 4], [6, 5], [7, 3], [7, 4], [7, 5], [8, 3], [8, 4], [8, 5]],
        );
    }

    #[test]
    fn test_from_rows_validation() {
        assert_eq!(
            Grid::from_rows(5, &vec![vec![0; 5]; 5]).unwrap_err(),
            InvalidGrid::UnsupportedSize(5),
        );
        assert_eq!(
            Grid::from_rows(4, &vec![vec![0; 4]; 3]).unwrap_err(),
            InvalidGrid::WrongRowCount { expected: 4, actual: 3 },
        );
        let mut rows = vec![vec![0; 4]; 4];
        rows[2] = vec![0; 5];
        assert_eq!(
            Grid::from_rows(4, &rows).unwrap_err(),
            InvalidGrid::WrongRowLength { row: 2, expected: 4, actual: 5 },
        );
        let mut rows = vec![vec![0; 4]; 4];
        rows[1][3] = 5;
        assert_eq!(
            Grid::from_rows(4, &rows).unwrap_err(),
            InvalidGrid::ValueOutOfRange { index: [1, 3], value: 5, max: 4 },
        );
    }

    #[test]
    fn test_from_rows_round_trip() {
        let rows = vec![
            vec![1, 0, 0, 4],
            vec![0, 0, 1, 0],
            vec![0, 1, 0, 0],
            vec![4, 0, 0, 1],
        ];
        let grid = Grid::from_rows(4, &rows).unwrap();
        assert_eq!(grid.get([0, 0]), Some(Val::new(1)));
        assert_eq!(grid.get([0, 1]), None);
        assert_eq!(grid.get([3, 0]), Some(Val::new(4)));
        assert_eq!(grid.to_rows(), rows);
        assert!(!grid.is_complete());
    }

    #[test]
    fn test_parse_display_round_trip() {
        let input = "1..4\n\
                     ..1.\n\
                     .1..\n\
                     4..1\n";
        let grid = Grid::parse(input).unwrap();
        assert_eq!(grid.size().n(), 4);
        assert_eq!(grid.get([0, 3]), Some(Val::new(4)));
        assert_eq!(grid.to_string(), input);
    }

    #[test]
    fn test_parse_sixteen_letters() {
        let mut line = String::new();
        for v in 1..=16u8 {
            line.push(if v <= 9 {
                (b'0' + v) as char
            } else {
                (b'A' + v - 10) as char
            });
        }
        let mut input = String::new();
        for _ in 0..16 {
            input.push_str(&line);
            input.push('\n');
        }
        let grid = Grid::parse(&input).unwrap();
        assert_eq!(grid.get([0, 9]), Some(Val::new(10)));
        assert_eq!(grid.get([5, 15]), Some(Val::new(16)));
        assert_eq!(grid.to_string(), input);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let input = "1..4\n\
                     ..x.\n\
                     .1..\n\
                     4..1\n";
        assert_eq!(
            Grid::parse(input).unwrap_err(),
            InvalidGrid::UnparsableCell { index: [1, 2], ch: 'x' },
        );
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_set_rejects_value_above_size() {
        let mut grid = Grid::new(GridSize::new(9).unwrap());
        grid.set([0, 0], Some(Val::new(20)));
    }

    #[test]
    fn test_set_accepts_max_value() {
        let mut grid = Grid::new(GridSize::new(9).unwrap());
        grid.set([0, 0], Some(Val::new(9)));
        assert_eq!(grid.to_string().lines().next(), Some("9........"));
    }

    #[test]
    fn test_serde_round_trip() {
        let grid = Grid::from_rows(4, &vec![
            vec![1, 0, 0, 4],
            vec![0, 0, 1, 0],
            vec![0, 1, 0, 0],
            vec![4, 0, 0, 1],
        ]).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        let back: Grid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let json = r#"{"size": 4, "rows": [[9, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]}"#;
        assert!(serde_json::from_str::<Grid>(json).is_err());
    }
}

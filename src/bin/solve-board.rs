use std::fs;
use color_eyre::eyre::{eyre, Result};
use sudoku_csp::grid::Grid;
use sudoku_csp::solver::{solve, SolveResult};

/// Reads a board from a file and prints its first solution (or the reason
/// there isn't one). JSON files are parsed as {"size": N, "rows": [[..]]};
/// anything else is treated as the one-character-per-cell text form.
fn main() -> Result<()> {
    color_eyre::install()?;
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| eyre!("usage: solve-board <board.json|board.txt>"))?;
    let contents = fs::read_to_string(&path)?;
    let grid: Grid = if path.ends_with(".json") {
        serde_json::from_str(&contents)?
    } else {
        Grid::parse(&contents)?
    };
    match solve(grid.size().n(), &grid.to_rows()) {
        SolveResult::Solved(solution) => println!("{}", solution),
        SolveResult::Infeasible => println!("no solution exists"),
        SolveResult::InvalidGrid(e) => return Err(eyre!("invalid board: {}", e)),
    }
    Ok(())
}

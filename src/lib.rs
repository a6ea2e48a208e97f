pub mod core;
pub mod grid;
pub mod model;
pub mod constraint;
pub mod distinct;
pub mod ranker;
pub mod solver;
pub mod debug;
pub mod boards;

pub use solver::{solve, solve_with_budget, Resolution, SolveResult};

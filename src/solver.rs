use std::fmt::Debug;
use crate::constraint::{Constraint, MultiConstraint};
use crate::core::{BranchPoint, CandidateGrid, ConstraintResult, Error, Index, Stateful, Val};
use crate::distinct::DistinctChecker;
use crate::grid::{Grid, InvalidGrid};
use crate::model::{check_solution, Board, CspModel};
use crate::ranker::{MrvRanker, Ranker};

/// The state of the DFS solver. The solver is either replaying givens,
/// advancing (ready to take a new action), backtracking (undoing actions),
/// solved, or exhausted (no more actions to take).
#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub enum SolverState {
    /// Replaying the fixed cells; the payload is the index of the next given.
    Initializing(usize),
    /// A given directly violated a constraint; the instance is infeasible.
    InitializationFailed,
    Advancing,
    Backtracking,
    Solved,
    Exhausted,
}

/// Per-step inspection hook. Debugging a failing search is much easier with
/// an injected observer than by instrumenting the whole solving process.
pub trait StepObserver<R: Ranker, C: Constraint> {
    fn after_step(&mut self, solver: &DfsSolver<R, C>);
}

const PUZZLE_ALREADY_DONE: Error = Error::new_const("Puzzle already done");
const NO_CHOICE: Error = Error::new_const("Decision point has no choice");
const NO_PENDING_DECISION: Error = Error::new_const("Advancing without a pending decision");

/// Depth-first search with constraint propagation, driven one step at a time.
///
/// Every step applies a move, replays a given, or backtracks. After each
/// mutation the candidate grid is rebuilt from the constraint and collapsed
/// through the ranker: singleton domains come back as forced moves and empty
/// domains as contradictions, so naked-single elimination runs to a fixed
/// point before any real guess is made. Guesses come from the ranker
/// (fewest-candidates-first) and are unwound through an explicit stack of
/// branch points, each remembering the values not yet tried.
///
/// Most callers want [`FindFirstSolution`]; this lower-level API exists for
/// observers, tests, and anything that needs to own the stepping loop.
pub struct DfsSolver<'a, R: Ranker, C: Constraint> {
    step: usize,
    board: &'a mut Board,
    ranker: &'a R,
    constraint: &'a mut C,
    givens: Vec<(Index, Val)>,
    check_result: ConstraintResult,
    next_decision: Option<BranchPoint>,
    stack: Vec<BranchPoint>,
    state: SolverState,
}

impl<'a, R: Ranker, C: Constraint> Debug for DfsSolver<'a, R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "State:\n{:?}Constraint:\n{:?}\n", self.board, self.constraint)
    }
}

impl<'a, R: Ranker, C: Constraint> DfsSolver<'a, R, C> {
    pub fn new(board: &'a mut Board, ranker: &'a R, constraint: &'a mut C) -> Self {
        let givens = board
            .size()
            .cell_iter()
            .filter_map(|i| board.get(i).map(|v| (i, v)))
            .collect();
        DfsSolver {
            step: 0,
            board,
            ranker,
            constraint,
            givens,
            check_result: ConstraintResult::Ok,
            next_decision: None,
            stack: Vec::new(),
            state: SolverState::Initializing(0),
        }
    }

    pub fn step_count(&self) -> usize {
        self.step
    }

    pub fn solver_state(&self) -> SolverState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        matches!(
            self.state,
            SolverState::InitializationFailed | SolverState::Solved | SolverState::Exhausted,
        )
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self.check_result, ConstraintResult::Contradiction(_))
    }

    pub fn constraint_result(&self) -> ConstraintResult {
        self.check_result.clone()
    }

    pub fn board(&self) -> &Board {
        self.board
    }

    /// The stack of branch points behind the current position.
    pub fn stack(&self) -> &[BranchPoint] {
        &self.stack
    }

    pub fn most_recent_action(&self) -> Option<(Index, Val)> {
        self.stack.last().and_then(|b| b.chosen())
    }

    fn check_and_rank(&mut self) {
        let mut grid = CandidateGrid::full(self.board.size().n());
        for index in self.board.size().cell_iter() {
            if let Some(v) = self.board.get(index) {
                grid.set_singleton(index, v);
            }
        }
        self.check_result = self.constraint.check(self.board, &mut grid);
        if self.check_result.is_ok() {
            self.check_result = self.ranker.to_constraint_result(&grid, self.board);
        }
        self.next_decision = match &self.check_result {
            ConstraintResult::Contradiction(_) => None,
            ConstraintResult::Certainty(d, a) => {
                Some(BranchPoint::unique(self.step + 1, *a, d.index, d.value))
            }
            ConstraintResult::Ok => Some(self.ranker.top(self.step + 1, &grid, self.board)),
        };
    }

    fn apply(&mut self, decision: BranchPoint) -> Result<(), Error> {
        let (i, v) = decision.chosen().ok_or(NO_CHOICE)?;
        self.board.apply(i, v)?;
        if let Err(e) = self.constraint.apply(i, v) {
            self.board.undo(i, v)?;
            return Err(e);
        }
        self.stack.push(decision);
        self.check_and_rank();
        self.state = if self.is_valid() {
            SolverState::Advancing
        } else {
            SolverState::Backtracking
        };
        Ok(())
    }

    fn unapply(&mut self, decision: &BranchPoint) -> Result<(), Error> {
        let (i, v) = decision.chosen().ok_or(NO_CHOICE)?;
        if let Err(e) = self.board.undo(i, v) {
            self.constraint.undo(i, v)?;
            return Err(e);
        }
        self.constraint.undo(i, v)
    }

    pub fn step(&mut self) -> Result<(), Error> {
        self.step += 1;
        match self.state {
            SolverState::Initializing(next_given) => {
                if next_given < self.givens.len() {
                    let (i, v) = self.givens[next_given];
                    // Givens are already on the board; only the constraint
                    // state needs to see them.
                    self.constraint.apply(i, v)?;
                    self.check_and_rank();
                    self.state = if self.is_valid() {
                        SolverState::Initializing(next_given + 1)
                    } else {
                        SolverState::InitializationFailed
                    };
                } else {
                    self.check_and_rank();
                    self.state = if self.is_valid() {
                        SolverState::Advancing
                    } else {
                        SolverState::InitializationFailed
                    };
                }
                Ok(())
            }
            SolverState::InitializationFailed
            | SolverState::Solved
            | SolverState::Exhausted => Err(PUZZLE_ALREADY_DONE),
            SolverState::Advancing => {
                let decision = self.next_decision.take().ok_or(NO_PENDING_DECISION)?;
                if decision.chosen().is_some() {
                    self.apply(decision)?;
                } else {
                    self.state = SolverState::Solved;
                }
                Ok(())
            }
            SolverState::Backtracking => {
                let mut decision = match self.stack.pop() {
                    Some(d) => d,
                    None => {
                        self.state = SolverState::Exhausted;
                        return Ok(());
                    }
                };
                self.unapply(&decision)?;
                match decision.advance() {
                    Some(_) => self.apply(decision),
                    None => Ok(()),
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.board.reset();
        self.constraint.reset();
        self.check_result = ConstraintResult::Ok;
        self.next_decision = None;
        self.stack.clear();
        self.state = SolverState::Initializing(0);
        self.step = 0;
    }
}

/// What a bounded search concluded. `Unknown` only ever comes out of a search
/// that ran into its step budget; an unbounded search always ends in
/// `Solved` or `Infeasible`.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Solved(Grid),
    Infeasible,
    Unknown,
}

/// Drives a [`DfsSolver`] to the first terminal state and verifies any
/// claimed solution before handing it back.
pub struct FindFirstSolution<'a, R: Ranker, C: Constraint> {
    solver: DfsSolver<'a, R, C>,
    max_steps: Option<usize>,
    observer: Option<&'a mut dyn StepObserver<R, C>>,
}

impl<'a, R: Ranker, C: Constraint> FindFirstSolution<'a, R, C> {
    pub fn new(
        board: &'a mut Board,
        ranker: &'a R,
        constraint: &'a mut C,
        observer: Option<&'a mut dyn StepObserver<R, C>>,
    ) -> Self {
        FindFirstSolution {
            solver: DfsSolver::new(board, ranker, constraint),
            max_steps: None,
            observer,
        }
    }

    /// Bound the search to at most `max_steps` solver steps; exhausting the
    /// budget yields `Resolution::Unknown`, never a wrong answer.
    pub fn with_budget(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn solver(&self) -> &DfsSolver<'a, R, C> {
        &self.solver
    }

    pub fn solve(&mut self) -> Result<Resolution, Error> {
        while !self.solver.is_done() {
            if let Some(max) = self.max_steps {
                if self.solver.step_count() >= max {
                    return Ok(Resolution::Unknown);
                }
            }
            self.solver.step()?;
            if let Some(observer) = &mut self.observer {
                observer.after_step(&self.solver);
            }
        }
        match self.solver.solver_state() {
            SolverState::Solved => {
                let grid = self.solver.board().grid().clone();
                // The propagation invariants already guarantee consistency;
                // this check is the correctness boundary for anything we
                // return as solved.
                check_solution(&grid)?;
                for (i, v) in &self.solver.givens {
                    if grid.get(*i) != Some(*v) {
                        return Err(Error::new(format!(
                            "solution dropped given {:?}={}", i, v,
                        )));
                    }
                }
                Ok(Resolution::Solved(grid))
            }
            _ => Ok(Resolution::Infeasible),
        }
    }
}

/// How a solve attempt ended, as seen by the caller: a complete consistent
/// grid, a proof of infeasibility, or an input that never reached the solver.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveResult {
    Solved(Grid),
    Infeasible,
    InvalidGrid(InvalidGrid),
}

/// Solve a puzzle given as raw rows of integers in [0, N] (0 = unknown),
/// N ∈ {4, 9, 16}. Deterministic: the same input always produces the same
/// grid.
pub fn solve(n: usize, rows: &[Vec<u32>]) -> SolveResult {
    match solve_with_budget(n, rows, None) {
        Ok(Resolution::Solved(grid)) => SolveResult::Solved(grid),
        Ok(Resolution::Infeasible) => SolveResult::Infeasible,
        // No budget, so the search can only end in a terminal state.
        Ok(Resolution::Unknown) => unreachable!("unbounded search ran out of budget"),
        Err(e) => SolveResult::InvalidGrid(e),
    }
}

/// Like [`solve`], but bounded: callers that need predictable latency pass a
/// step budget and treat `Resolution::Unknown` as "gave up", which is
/// deliberately distinct from `Infeasible`.
pub fn solve_with_budget(
    n: usize,
    rows: &[Vec<u32>],
    max_steps: Option<usize>,
) -> Result<Resolution, InvalidGrid> {
    let model = CspModel::build(n, rows)?;
    let mut board = model.board();
    let ranker = MrvRanker::new();
    let mut constraint = MultiConstraint::new(vec_box::vec_box![
        DistinctChecker::new(model.size()),
    ]);
    let mut finder = FindFirstSolution::new(&mut board, &ranker, &mut constraint, None);
    if let Some(max) = max_steps {
        finder = finder.with_budget(max);
    }
    match finder.solve() {
        Ok(resolution) => Ok(resolution),
        // A valid model can only end in Solved/Infeasible/Unknown; an Error
        // here is a defect in the solver itself, not a property of the input.
        Err(e) => panic!("solver invariant violated: {}", e),
    }
}

//! Observers for watching a solve in progress.

use crate::constraint::Constraint;
use crate::ranker::Ranker;
use crate::solver::{DfsSolver, StepObserver};

/// Observer that does nothing; useful as a default.
pub struct NullObserver;

impl<R: Ranker, C: Constraint> StepObserver<R, C> for NullObserver {
    fn after_step(&mut self, _: &DfsSolver<R, C>) {}
}

/// Prints a one-line trace of every step: the step number, the solver state,
/// and the most recent action. Handy for eyeballing why a search thrashes.
pub struct TraceObserver {
    every: usize,
}

impl TraceObserver {
    pub fn new() -> Self {
        TraceObserver { every: 1 }
    }

    /// Only print every nth step. Long searches are unreadable otherwise.
    pub fn sample(mut self, every: usize) -> Self {
        self.every = every.max(1);
        self
    }
}

impl Default for TraceObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Ranker, C: Constraint> StepObserver<R, C> for TraceObserver {
    fn after_step(&mut self, solver: &DfsSolver<R, C>) {
        let step = solver.step_count();
        if step % self.every != 0 {
            return;
        }
        match solver.most_recent_action() {
            Some((index, value)) => println!(
                "step {}: {:?} {:?}={} (depth {})",
                step,
                solver.solver_state(),
                index,
                value,
                solver.stack().len(),
            ),
            None => println!("step {}: {:?}", step, solver.solver_state()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::distinct::DistinctChecker;
    use crate::model::CspModel;
    use crate::ranker::MrvRanker;
    use crate::solver::{FindFirstSolution, Resolution};

    #[test]
    fn test_trace_observer_samples_a_solve() {
        let model = CspModel::build(4, &vec![
            vec![1, 0, 0, 4],
            vec![0, 0, 1, 0],
            vec![0, 1, 0, 0],
            vec![4, 0, 0, 1],
        ]).unwrap();
        let mut board = model.board();
        let ranker = MrvRanker::new();
        let mut constraint = DistinctChecker::new(model.size());
        let mut observer = TraceObserver::new().sample(3);
        let mut finder = FindFirstSolution::new(
            &mut board, &ranker, &mut constraint, Some(&mut observer));
        assert!(matches!(finder.solve().unwrap(), Resolution::Solved(_)));
    }

    #[test]
    fn test_trace_observer_zero_sample_is_clamped() {
        let model = CspModel::build(4, &vec![vec![0; 4]; 4]).unwrap();
        let mut board = model.board();
        let ranker = MrvRanker::new();
        let mut constraint = DistinctChecker::new(model.size());
        // sample(0) would divide by zero on every step if it weren't clamped.
        let mut observer = TraceObserver::new().sample(0);
        let mut finder = FindFirstSolution::new(
            &mut board, &ranker, &mut constraint, Some(&mut observer));
        assert!(matches!(finder.solve().unwrap(), Resolution::Solved(_)));
    }

    #[test]
    fn test_null_observer_is_inert() {
        let model = CspModel::build(4, &vec![vec![0; 4]; 4]).unwrap();
        let mut board = model.board();
        let ranker = MrvRanker::new();
        let mut constraint = DistinctChecker::new(model.size());
        let mut observer = NullObserver;
        let mut finder = FindFirstSolution::new(
            &mut board, &ranker, &mut constraint, Some(&mut observer));
        assert!(matches!(finder.solve().unwrap(), Resolution::Solved(_)));
    }
}

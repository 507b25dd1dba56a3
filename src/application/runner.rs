// Solve runner: orchestrates solvers and scores their routings
// Single Responsibility: run the configured solvers and evaluate each result

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::RunConfig;
use crate::domain::{
    evaluate_detailed, CostBreakdown, EvaluationError, Problem, RoutingSolver, Solution,
    SolverError, SolverKind,
};
use crate::solver::SolverFactory;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("solver failed: {0}")]
    Solver(#[from] SolverError),

    #[error("solution rejected: {source}")]
    Evaluation {
        #[source]
        source: EvaluationError,
        solution: Solution,
    },
}

impl RunError {
    /// The rejected routing, if the solver produced one.
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            RunError::Solver(_) => None,
            RunError::Evaluation { solution, .. } => Some(solution),
        }
    }
}

/// A routing together with its evaluated cost.
#[derive(Debug, Clone)]
pub struct Evaluated {
    pub solution: Solution,
    pub cost: CostBreakdown,
}

/// What one solver produced on one problem.
#[derive(Debug)]
pub struct RunOutcome {
    pub solver: SolverKind,
    pub elapsed: Duration,
    pub result: Result<Evaluated, RunError>,
}

impl RunOutcome {
    pub fn total_cost(&self) -> Option<f64> {
        self.result.as_ref().ok().map(|evaluated| evaluated.cost.total())
    }
}

pub struct SolveRunner {
    config: RunConfig,
}

impl SolveRunner {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Runs every configured solver in order.
    pub fn run(&self, problem: &Problem) -> Vec<RunOutcome> {
        info!(
            operations = problem.num_operations(),
            sub_operations = problem.num_sub_operations(),
            cities = problem.num_cities(),
            solvers = self.config.solvers.len(),
            "solving problem"
        );
        self.config
            .solvers
            .iter()
            .map(|&kind| self.run_one(kind, problem))
            .collect()
    }

    pub fn run_one(&self, kind: SolverKind, problem: &Problem) -> RunOutcome {
        let start_time = Instant::now();
        let result = SolverFactory::create(kind, &self.config)
            .map_err(RunError::from)
            .and_then(|solver| solve_and_evaluate(solver.as_ref(), problem));
        let elapsed = start_time.elapsed();

        match &result {
            Ok(evaluated) => info!(
                solver = %kind,
                cost = evaluated.cost.total(),
                processing = evaluated.cost.processing,
                logistics = evaluated.cost.logistics,
                elapsed_ms = elapsed.as_millis() as u64,
                "solver finished"
            ),
            Err(err) => warn!(solver = %kind, error = %err, "solver failed"),
        }

        RunOutcome {
            solver: kind,
            elapsed,
            result,
        }
    }
}

/// Runs `solver` and scores its routing with the reference evaluator.
pub fn solve_and_evaluate(
    solver: &dyn RoutingSolver,
    problem: &Problem,
) -> Result<Evaluated, RunError> {
    let solution = solver.solve(problem)?;
    match evaluate_detailed(problem, &solution) {
        Ok(cost) => Ok(Evaluated { solution, cost }),
        Err(source) => Err(RunError::Evaluation { source, solution }),
    }
}

/// Index of the cheapest successful outcome.
pub fn best_outcome(outcomes: &[RunOutcome]) -> Option<usize> {
    outcomes
        .iter()
        .enumerate()
        .filter_map(|(i, outcome)| outcome.total_cost().map(|cost| (i, cost)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::problem::fixtures;
    use crate::domain::BackendKind;

    #[test]
    fn runs_configured_solvers_in_order() {
        let config = RunConfig::new()
            .with_solvers(vec![SolverKind::Greedy, SolverKind::Dp, SolverKind::Mip])
            .with_backend(BackendKind::Microlp);
        let outcomes = SolveRunner::new(config).run(&fixtures::two_city_chain());

        let kinds: Vec<_> = outcomes.iter().map(|o| o.solver).collect();
        assert_eq!(kinds, vec![SolverKind::Greedy, SolverKind::Dp, SolverKind::Mip]);
        for outcome in &outcomes {
            assert_eq!(outcome.total_cost(), Some(4.0), "{}", outcome.solver);
        }
        assert_eq!(best_outcome(&outcomes), Some(0));
    }

    #[test]
    fn cost_breakdown_is_reported() {
        let runner = SolveRunner::new(RunConfig::new());
        let outcome = runner.run_one(SolverKind::Dp, &fixtures::two_city_chain());
        let evaluated = outcome.result.unwrap();
        assert_eq!(evaluated.cost.processing, 2.0);
        assert_eq!(evaluated.cost.logistics, 2.0);
    }

    struct Lazy;

    impl RoutingSolver for Lazy {
        fn solve(&self, _problem: &Problem) -> crate::domain::solver_service::Result<Solution> {
            Ok(Solution::new())
        }

        fn name(&self) -> &str {
            "lazy"
        }

        fn is_exact(&self) -> bool {
            false
        }
    }

    #[test]
    fn rejected_solution_is_kept_for_reporting() {
        let err = solve_and_evaluate(&Lazy, &fixtures::two_city_chain()).unwrap_err();
        assert!(matches!(
            err,
            RunError::Evaluation {
                source: EvaluationError::IncompleteSolution { .. },
                ..
            }
        ));
        assert_eq!(err.solution(), Some(&Solution::new()));
    }

    #[test]
    fn best_outcome_skips_failures() {
        let outcomes = vec![
            RunOutcome {
                solver: SolverKind::Random,
                elapsed: Duration::ZERO,
                result: Err(RunError::Solver(SolverError::ExecutionFailed("boom".into()))),
            },
            RunOutcome {
                solver: SolverKind::Greedy,
                elapsed: Duration::ZERO,
                result: Ok(Evaluated {
                    solution: Solution::new(),
                    cost: CostBreakdown {
                        processing: 3.0,
                        logistics: 1.0,
                    },
                }),
            },
        ];
        assert_eq!(best_outcome(&outcomes), Some(1));
        assert_eq!(best_outcome(&outcomes[..1]), None);
    }
}

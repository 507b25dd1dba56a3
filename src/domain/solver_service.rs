// Domain service interface for routing solvers
// Defines the contract that every routing strategy implements

use super::problem::Problem;
use super::solution::Solution;

/// Error types for the solver service
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("No feasible city for sub-operation '{sub_operation}' of '{operation}'")]
    NoFeasibleCity {
        operation: String,
        sub_operation: String,
    },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Routing strategy: assigns every sub-operation of every operation to a city.
///
/// Implementations never mutate the problem and keep no state between calls.
/// They are trusted to attempt a complete assignment, but feasibility and
/// completeness are only checked by [`crate::domain::evaluate`].
pub trait RoutingSolver: Send + Sync {
    fn solve(&self, problem: &Problem) -> Result<Solution>;

    /// Name of this strategy
    fn name(&self) -> &str;

    /// Whether the strategy guarantees a minimum-cost solution (given
    /// unlimited time)
    fn is_exact(&self) -> bool;
}

// Domain module: problem model, solutions, evaluation and service contracts

pub mod evaluator;
pub mod ids;
pub mod linear_model;
pub mod mip_backend;
pub mod problem;
pub mod solution;
pub mod solver_service;
pub mod value_objects;

pub use evaluator::{evaluate, evaluate_detailed, CostBreakdown, EvaluationError};
pub use ids::{CityId, OperationId, SubOperationId};
pub use linear_model::{Constraint, LinearModel, MipSolution, SolverStatistics, VarId};
pub use mip_backend::MipBackend;
pub use problem::{CostTables, Problem, ProblemError, SENTINEL_COST};
pub use solution::{OperationRoute, Solution};
pub use solver_service::{RoutingSolver, SolverError};
pub use value_objects::{BackendKind, ConstraintType, SolutionStatus, SolverKind};

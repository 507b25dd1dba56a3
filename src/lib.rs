// Domain layer: problem model, evaluation and service contracts
pub mod domain;

// Integer-programming backends behind the MipBackend trait
pub mod backend;

// Routing solvers: concrete implementations of RoutingSolver
pub mod solver;

// Run configuration (TOML)
pub mod config;

// Application layer: dataset mapping and solve orchestration
pub mod application;

// Infrastructure layer: logging and file access
pub mod infrastructure;

// Re-export commonly used types
pub use domain::{
    evaluate, evaluate_detailed, BackendKind, CityId, CostBreakdown, EvaluationError,
    OperationId, Problem, ProblemError, RoutingSolver, Solution, SolverError, SolverKind,
    SubOperationId,
};

pub use application::{dataset_to_problem, DatasetDto, DatasetError, SolveRunner};
pub use backend::BackendFactory;
pub use config::{ConfigError, RunConfig};
pub use solver::{
    DpSolver, GreedySolver, MipSolver, PerOperationMipSolver, RandomSolver, SolverFactory,
};

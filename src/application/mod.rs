// Application layer: use cases and orchestration on top of the domain

pub mod mappers;
pub mod runner;

pub use mappers::{
    dataset_to_problem, outcome_to_dto, problem_to_dataset, routes_to_solution, DatasetDto,
    DatasetError, DatasetRef, RoutesDto, SolverReportDto, DEFAULT_DISTANCES_COEF,
    EXAMPLE_INSTANCE,
};
pub use runner::{best_outcome, solve_and_evaluate, Evaluated, RunError, RunOutcome, SolveRunner};

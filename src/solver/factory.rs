use crate::backend::BackendFactory;
use crate::config::RunConfig;
use crate::domain::{
    solver_service::{Result, RoutingSolver},
    value_objects::SolverKind,
};
use crate::solver::{DpSolver, GreedySolver, MipSolver, PerOperationMipSolver, RandomSolver};

/// Factory for creating routing solvers based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create a solver of the requested kind
    pub fn create(kind: SolverKind, config: &RunConfig) -> Result<Box<dyn RoutingSolver>> {
        let solver: Box<dyn RoutingSolver> = match kind {
            SolverKind::Dp => Box::new(DpSolver::new()),
            SolverKind::Greedy => Box::new(GreedySolver::new()),
            SolverKind::Random => {
                let solver = RandomSolver::new();
                match config.random.seed {
                    Some(seed) => Box::new(solver.with_seed(seed)),
                    None => Box::new(solver),
                }
            }
            SolverKind::Mip => {
                let time_limit = config.mip.time_limit();
                let backend = BackendFactory::create_for(config.mip.backend, time_limit)?;
                Box::new(MipSolver::new(backend).with_time_limit(time_limit))
            }
            SolverKind::PerOperationMip => {
                let time_limit = config.mip.time_limit();
                let backend = BackendFactory::create_for(config.mip.backend, time_limit)?;
                Box::new(
                    PerOperationMipSolver::new(backend)
                        .with_time_limit(time_limit)
                        .with_parallel(config.mip.parallel),
                )
            }
        };
        Ok(solver)
    }
}

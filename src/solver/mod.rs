// Routing strategies: concrete implementations of RoutingSolver

pub mod dp_solver;
pub mod factory;
pub mod greedy_solver;
pub mod mip_solver;
pub mod random_solver;

pub use dp_solver::DpSolver;
pub use factory::SolverFactory;
pub use greedy_solver::GreedySolver;
pub use mip_solver::{MipSolver, PerOperationMipSolver};
pub use random_solver::RandomSolver;

/// Index and value of the first minimum; NaN entries never win.
pub(crate) fn argmin(values: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, &value) in values.iter().enumerate() {
        if value < best.1 {
            best = (i, value);
        }
    }
    if best.1 == f64::INFINITY {
        if let Some(&first) = values.first() {
            best = (0, first);
        }
    }
    best
}

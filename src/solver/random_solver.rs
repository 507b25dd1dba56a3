// Random solver: feasible-but-arbitrary baseline

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::domain::{
    ids::CityId,
    problem::Problem,
    solution::Solution,
    solver_service::{Result, RoutingSolver, SolverError},
};

/// Assigns each sub-operation to a uniformly chosen city with a finite
/// processing cost. Logistics costs are ignored, so the result may still use
/// a forbidden transition.
#[derive(Debug, Clone, Default)]
pub struct RandomSolver {
    seed: Option<u64>,
}

impl RandomSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the random seed for reproducible assignments.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Like [`RoutingSolver::solve`], drawing from an explicit random source.
    pub fn solve_with_rng<R: Rng + ?Sized>(
        &self,
        problem: &Problem,
        rng: &mut R,
    ) -> Result<Solution> {
        let mut solution = Solution::new();
        let mut available_cities: Vec<CityId> = Vec::with_capacity(problem.num_cities());

        for operation in problem.operation_ids() {
            for &sub_operation in problem.chain(operation) {
                available_cities.clear();
                available_cities.extend(
                    problem
                        .city_ids()
                        .filter(|&city| problem.processing_cost(sub_operation, city).is_finite()),
                );

                let city = available_cities.choose(rng).copied().ok_or_else(|| {
                    SolverError::NoFeasibleCity {
                        operation: problem.operation_label(operation).to_string(),
                        sub_operation: problem.sub_operation_label(sub_operation).to_string(),
                    }
                })?;
                solution.assign(operation, sub_operation, city);
            }
        }

        Ok(solution)
    }

    fn create_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

impl RoutingSolver for RandomSolver {
    fn solve(&self, problem: &Problem) -> Result<Solution> {
        self.solve_with_rng(problem, &mut self.create_rng())
    }

    fn name(&self) -> &str {
        "random"
    }

    fn is_exact(&self) -> bool {
        false
    }
}

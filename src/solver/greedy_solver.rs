// Greedy solver: one forward pass per operation, no backtracking

use super::argmin;
use crate::domain::{
    ids::CityId,
    problem::Problem,
    solution::{OperationRoute, Solution},
    solver_service::{Result, RoutingSolver},
};

/// Picks, for each sub-operation in order, the city with the lowest
/// processing cost plus the cost of getting there from the previous city.
///
/// Works on the raw costs, so a sub-operation with no finite option still
/// lands in the lowest-index city and the evaluator reports it.
pub struct GreedySolver;

impl GreedySolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GreedySolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingSolver for GreedySolver {
    fn solve(&self, problem: &Problem) -> Result<Solution> {
        let mut solution = Solution::new();
        let mut possible_costs = vec![0.0; problem.num_cities()];

        for operation in problem.operation_ids() {
            let mut route = OperationRoute::new();
            let mut cur_city: Option<CityId> = None;

            for &sub_operation in problem.chain(operation) {
                for (city, cost) in problem.city_ids().zip(possible_costs.iter_mut()) {
                    *cost = problem.processing_cost(sub_operation, city);
                    if let Some(prev) = cur_city {
                        *cost += problem.logistics_cost(prev, city);
                    }
                }
                let city = CityId::new(argmin(&possible_costs).0);
                route.insert(sub_operation, city);
                cur_city = Some(city);
            }

            solution.set_route(operation, route);
        }

        Ok(solution)
    }

    fn name(&self) -> &str {
        "greedy"
    }

    fn is_exact(&self) -> bool {
        false
    }
}

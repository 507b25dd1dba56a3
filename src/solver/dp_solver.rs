// Dynamic-programming solver
// Exact: each operation is a chain, and the cost of a city choice only
// depends on the choice for the next sub-operation

use ndarray::Array2;
use tracing::debug;

use super::argmin;
use crate::domain::{
    ids::{CityId, SubOperationId},
    problem::{CostTables, Problem},
    solution::{OperationRoute, Solution},
    solver_service::{Result, RoutingSolver},
};

/// Backward recurrence over each operation's chain of sub-operations,
/// `O(sub_operations * cities^2)` per operation.
pub struct DpSolver;

impl DpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingSolver for DpSolver {
    fn solve(&self, problem: &Problem) -> Result<Solution> {
        let tables = problem.cost_tables();
        let mut solution = Solution::new();

        for operation in problem.operation_ids() {
            let (route, cost) =
                solve_chain(&tables, problem.chain(operation), problem.num_cities());
            debug!(
                operation = problem.operation_label(operation),
                cost, "operation routed"
            );
            solution.set_route(operation, route);
        }

        Ok(solution)
    }

    fn name(&self) -> &str {
        "dynamic programming"
    }

    fn is_exact(&self) -> bool {
        true
    }
}

/// Minimum-cost route for one chain, with its (sentinel-sanitised) cost.
fn solve_chain(
    tables: &CostTables,
    chain: &[SubOperationId],
    num_cities: usize,
) -> (OperationRoute, f64) {
    let n = chain.len();
    let mut route = OperationRoute::new();
    if n == 0 || num_cities == 0 {
        return (route, 0.0);
    }

    // cost[[i, m]]: cheapest way to finish the chain from sub-operation i in city m
    let mut cost = Array2::<f64>::zeros((n, num_cities));
    let mut next_city = Array2::<usize>::zeros((n, num_cities));

    for m in 0..num_cities {
        cost[[n - 1, m]] = tables.processing[[chain[n - 1].index(), m]];
    }

    let mut candidates = vec![0.0; num_cities];
    for i in (0..n - 1).rev() {
        let sub = chain[i].index();
        for m in 0..num_cities {
            for (m_next, candidate) in candidates.iter_mut().enumerate() {
                *candidate = tables.processing[[sub, m]]
                    + tables.logistics[[m, m_next]]
                    + cost[[i + 1, m_next]];
            }
            let (best_next, best) = argmin(&candidates);
            cost[[i, m]] = best;
            next_city[[i, m]] = best_next;
        }
    }

    let first_costs: Vec<f64> = cost.row(0).to_vec();
    let (mut city, total) = argmin(&first_costs);
    for (i, sub) in chain.iter().enumerate() {
        route.insert(*sub, CityId::new(city));
        city = next_city[[i, city]];
    }

    (route, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        evaluator::evaluate,
        ids::OperationId,
        problem::fixtures::{interleaved, two_city_chain},
    };

    #[test]
    fn routes_the_two_city_chain_through_both_cities() {
        let problem = two_city_chain();
        let solution = DpSolver::new().solve(&problem).unwrap();
        let op = OperationId::new(0);
        assert_eq!(solution.city_of(op, SubOperationId::new(0)), Some(CityId::new(0)));
        assert_eq!(solution.city_of(op, SubOperationId::new(1)), Some(CityId::new(1)));
        assert_eq!(evaluate(&problem, &solution).unwrap(), 4.0);
    }

    #[test]
    fn avoids_forbidden_cities_and_routes() {
        let problem = interleaved();
        let solution = DpSolver::new().solve(&problem).unwrap();
        let cost = evaluate(&problem, &solution).unwrap();
        assert!(cost.is_finite());
        assert_ne!(
            solution.city_of(OperationId::new(1), SubOperationId::new(1)),
            Some(CityId::new(2))
        );
    }

    #[test]
    fn chain_cost_matches_evaluation() {
        let problem = interleaved();
        let tables = problem.cost_tables();
        let mut total = 0.0;
        for op in problem.operation_ids() {
            total += solve_chain(&tables, problem.chain(op), problem.num_cities()).1;
        }
        let solution = DpSolver::new().solve(&problem).unwrap();
        assert!((evaluate(&problem, &solution).unwrap() - total).abs() < 1e-9);
    }

    #[test]
    fn ties_prefer_the_lowest_city() {
        let tables = CostTables {
            processing: Array2::ones((2, 3)),
            logistics: Array2::zeros((3, 3)),
        };
        let chain = [SubOperationId::new(0), SubOperationId::new(1)];
        let (route, cost) = solve_chain(&tables, &chain, 3);
        assert_eq!(cost, 2.0);
        assert!(route.values().all(|&city| city == CityId::new(0)));
    }

    #[test]
    fn is_idempotent() {
        let problem = interleaved();
        let solver = DpSolver::new();
        assert_eq!(solver.solve(&problem).unwrap(), solver.solve(&problem).unwrap());
    }
}

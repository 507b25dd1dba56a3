// Cost evaluator: independent verification of any candidate solution
// Uses raw problem costs, so forbidden combinations surface as errors

use std::collections::BTreeSet;

use super::ids::{CityId, OperationId, SubOperationId};
use super::problem::Problem;
use super::solution::Solution;

/// Reasons a solution cannot be costed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("Unavailable operation for '{operation}': sub-operation '{sub_operation}' in city '{city}'")]
    InfeasibleAssignment {
        operation: String,
        sub_operation: String,
        city: String,
    },

    #[error("Not all sub-operations done for '{operation}': {missing:?}")]
    IncompleteSolution {
        operation: String,
        missing: Vec<String>,
    },

    #[error("Operation '{operation}' is not part of the problem")]
    UnknownOperation { operation: String },

    #[error("Sub-operation '{sub_operation}' does not belong to '{operation}'")]
    UnknownSubOperation {
        operation: String,
        sub_operation: String,
    },
}

pub type Result<T> = std::result::Result<T, EvaluationError>;

/// Cost of a solution split into its two components.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostBreakdown {
    pub processing: f64,
    pub logistics: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.processing + self.logistics
    }
}

/// Total cost of `solution`: processing cost of every assignment plus the
/// logistics cost between consecutive sub-operations of the same operation.
pub fn evaluate(problem: &Problem, solution: &Solution) -> Result<f64> {
    evaluate_detailed(problem, solution).map(|breakdown| breakdown.total())
}

/// Like [`evaluate`], keeping processing and logistics costs apart.
pub fn evaluate_detailed(problem: &Problem, solution: &Solution) -> Result<CostBreakdown> {
    let mut breakdown = CostBreakdown::default();

    for (operation, route) in solution.routes() {
        check_operation(problem, operation)?;
        let mut to_be_done: BTreeSet<SubOperationId> =
            problem.chain(operation).iter().copied().collect();
        let mut prev_city: Option<CityId> = None;

        for (&sub_operation, &city) in route {
            if !to_be_done.remove(&sub_operation) || city.index() >= problem.num_cities() {
                return Err(EvaluationError::UnknownSubOperation {
                    operation: problem.operation_label(operation).to_string(),
                    sub_operation: sub_label(problem, sub_operation),
                });
            }

            breakdown.processing += problem.processing_cost(sub_operation, city);
            if let Some(prev) = prev_city {
                breakdown.logistics += problem.logistics_cost(prev, city);
            }

            if !breakdown.total().is_finite() {
                return Err(EvaluationError::InfeasibleAssignment {
                    operation: problem.operation_label(operation).to_string(),
                    sub_operation: problem.sub_operation_label(sub_operation).to_string(),
                    city: problem.city_label(city).to_string(),
                });
            }
            prev_city = Some(city);
        }

        if !to_be_done.is_empty() {
            return Err(incomplete(problem, operation, to_be_done));
        }
    }

    // Operations with no recorded route at all
    if let Some(operation) = problem
        .operation_ids()
        .find(|&op| solution.route(op).is_none())
    {
        let missing = problem.chain(operation).iter().copied().collect();
        return Err(incomplete(problem, operation, missing));
    }

    Ok(breakdown)
}

fn check_operation(problem: &Problem, operation: OperationId) -> Result<()> {
    if operation.index() < problem.num_operations() {
        return Ok(());
    }
    Err(EvaluationError::UnknownOperation {
        operation: operation.to_string(),
    })
}

fn sub_label(problem: &Problem, sub_operation: SubOperationId) -> String {
    if sub_operation.index() < problem.num_sub_operations() {
        problem.sub_operation_label(sub_operation).to_string()
    } else {
        sub_operation.to_string()
    }
}

fn incomplete(
    problem: &Problem,
    operation: OperationId,
    missing: BTreeSet<SubOperationId>,
) -> EvaluationError {
    EvaluationError::IncompleteSolution {
        operation: problem.operation_label(operation).to_string(),
        missing: missing
            .into_iter()
            .map(|sub| problem.sub_operation_label(sub).to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::problem::fixtures::{interleaved, two_city_chain};
    use crate::domain::solution::OperationRoute;

    fn route(pairs: &[(usize, usize)]) -> OperationRoute {
        pairs
            .iter()
            .map(|&(sub, city)| (SubOperationId::new(sub), CityId::new(city)))
            .collect()
    }

    #[test]
    fn costs_every_path_of_the_two_city_chain() {
        let problem = two_city_chain();
        let op = OperationId::new(0);
        let cases = [
            ([0, 0], 6.0),
            ([0, 1], 4.0),
            ([1, 0], 12.0),
            ([1, 1], 6.0),
        ];
        for (cities, expected) in cases {
            let solution =
                Solution::new().with_route(op, route(&[(0, cities[0]), (1, cities[1])]));
            assert_eq!(evaluate(&problem, &solution).unwrap(), expected, "{cities:?}");
        }
    }

    #[test]
    fn breakdown_separates_components() {
        let problem = two_city_chain();
        let solution =
            Solution::new().with_route(OperationId::new(0), route(&[(0, 0), (1, 1)]));
        let breakdown = evaluate_detailed(&problem, &solution).unwrap();
        assert_eq!(breakdown.processing, 2.0);
        assert_eq!(breakdown.logistics, 2.0);
        assert_eq!(breakdown.total(), 4.0);
    }

    #[test]
    fn transitions_only_within_an_operation() {
        let problem = interleaved();
        let solution = Solution::new()
            .with_route(OperationId::new(0), route(&[(0, 0), (2, 0), (4, 0)]))
            .with_route(OperationId::new(1), route(&[(1, 1), (3, 1)]));
        // op0: 2 + 6 + 1 in city0, no transitions
        // op1: (1*4/2) + (2*3/2) in city1, no transitions
        assert_eq!(evaluate(&problem, &solution).unwrap(), 9.0 + 2.0 + 3.0);
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let problem = interleaved();
        let forward = Solution::new()
            .with_route(OperationId::new(0), route(&[(0, 0), (2, 1), (4, 2)]))
            .with_route(OperationId::new(1), route(&[(1, 0), (3, 1)]));

        let mut backward = Solution::new();
        for (op, sub, city) in [(1, 3, 1), (0, 4, 2), (1, 1, 0), (0, 2, 1), (0, 0, 0)] {
            backward.assign(
                OperationId::new(op),
                SubOperationId::new(sub),
                CityId::new(city),
            );
        }
        assert_eq!(
            evaluate(&problem, &forward).unwrap(),
            evaluate(&problem, &backward).unwrap()
        );
    }

    #[test]
    fn forbidden_city_is_infeasible() {
        let problem = interleaved();
        let solution = Solution::new()
            .with_route(OperationId::new(0), route(&[(0, 0), (2, 0), (4, 0)]))
            .with_route(OperationId::new(1), route(&[(1, 2), (3, 2)]));
        assert_eq!(
            evaluate(&problem, &solution).unwrap_err(),
            EvaluationError::InfeasibleAssignment {
                operation: "op1".into(),
                sub_operation: "sub1".into(),
                city: "city2".into(),
            }
        );
    }

    #[test]
    fn missing_route_between_cities_is_infeasible() {
        let problem = interleaved();
        let solution = Solution::new()
            .with_route(OperationId::new(0), route(&[(0, 0), (2, 2), (4, 2)]))
            .with_route(OperationId::new(1), route(&[(1, 0), (3, 0)]));
        let err = evaluate(&problem, &solution).unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::InfeasibleAssignment { ref sub_operation, ref city, .. }
                if sub_operation == "sub2" && city == "city2"
        ));
    }

    #[test]
    fn omitted_sub_operation_is_incomplete() {
        let problem = interleaved();
        let solution = Solution::new()
            .with_route(OperationId::new(0), route(&[(0, 0), (4, 0)]))
            .with_route(OperationId::new(1), route(&[(1, 0), (3, 0)]));
        assert_eq!(
            evaluate(&problem, &solution).unwrap_err(),
            EvaluationError::IncompleteSolution {
                operation: "op0".into(),
                missing: vec!["sub2".into()],
            }
        );
    }

    #[test]
    fn absent_operation_is_incomplete() {
        let problem = interleaved();
        let solution =
            Solution::new().with_route(OperationId::new(0), route(&[(0, 0), (2, 0), (4, 0)]));
        assert_eq!(
            evaluate(&problem, &solution).unwrap_err(),
            EvaluationError::IncompleteSolution {
                operation: "op1".into(),
                missing: vec!["sub1".into(), "sub3".into()],
            }
        );
        assert!(evaluate(&problem, &Solution::new()).is_err());
    }

    #[test]
    fn foreign_sub_operation_is_rejected() {
        let problem = interleaved();
        let solution = Solution::new()
            .with_route(OperationId::new(0), route(&[(0, 0), (1, 0), (2, 0), (4, 0)]))
            .with_route(OperationId::new(1), route(&[(3, 0)]));
        assert_eq!(
            evaluate(&problem, &solution).unwrap_err(),
            EvaluationError::UnknownSubOperation {
                operation: "op0".into(),
                sub_operation: "sub1".into(),
            }
        );
    }

    #[test]
    fn operation_outside_the_problem_is_rejected() {
        let problem = two_city_chain();
        let solution = Solution::new()
            .with_route(OperationId::new(0), route(&[(0, 0), (1, 1)]))
            .with_route(OperationId::new(3), route(&[]));
        assert_eq!(
            evaluate(&problem, &solution).unwrap_err(),
            EvaluationError::UnknownOperation {
                operation: "operation#3".into(),
            }
        );
    }
}

// Solution model: per-operation routing of sub-operations to cities

use std::collections::BTreeMap;

use super::ids::{CityId, OperationId, SubOperationId};
use super::problem::Problem;

/// City assignment for the sub-operations of one operation.
///
/// Keyed by sub-operation id, so iteration always follows the processing
/// order declared by the [`Problem`], never the insertion order.
pub type OperationRoute = BTreeMap<SubOperationId, CityId>;

/// Assignment of every operation's sub-operations to cities.
///
/// Completeness is not enforced here; [`crate::domain::evaluate`] checks it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    routes: BTreeMap<OperationId, OperationRoute>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `sub_operation` of `operation` is performed in `city`,
    /// replacing any earlier assignment.
    pub fn assign(&mut self, operation: OperationId, sub_operation: SubOperationId, city: CityId) {
        self.routes
            .entry(operation)
            .or_default()
            .insert(sub_operation, city);
    }

    /// Replaces the whole route of one operation.
    pub fn set_route(&mut self, operation: OperationId, route: OperationRoute) {
        self.routes.insert(operation, route);
    }

    pub fn with_route(mut self, operation: OperationId, route: OperationRoute) -> Self {
        self.set_route(operation, route);
        self
    }

    pub fn route(&self, operation: OperationId) -> Option<&OperationRoute> {
        self.routes.get(&operation)
    }

    pub fn city_of(&self, operation: OperationId, sub_operation: SubOperationId) -> Option<CityId> {
        self.routes
            .get(&operation)
            .and_then(|route| route.get(&sub_operation))
            .copied()
    }

    pub fn routes(&self) -> impl Iterator<Item = (OperationId, &OperationRoute)> {
        self.routes.iter().map(|(&op, route)| (op, route))
    }

    pub fn operations(&self) -> impl Iterator<Item = OperationId> + '_ {
        self.routes.keys().copied()
    }

    /// Number of operations with a recorded route.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Total number of recorded sub-operation assignments.
    pub fn num_assignments(&self) -> usize {
        self.routes.values().map(BTreeMap::len).sum()
    }

    /// Label-keyed view of the assignment, for output.
    pub fn to_labels(&self, problem: &Problem) -> BTreeMap<String, BTreeMap<String, String>> {
        self.routes
            .iter()
            .map(|(&op, route)| {
                let route = route
                    .iter()
                    .map(|(&sub, &city)| {
                        (
                            problem.sub_operation_label(sub).to_string(),
                            problem.city_label(city).to_string(),
                        )
                    })
                    .collect();
                (problem.operation_label(op).to_string(), route)
            })
            .collect()
    }
}

impl FromIterator<(OperationId, SubOperationId, CityId)> for Solution {
    fn from_iter<T: IntoIterator<Item = (OperationId, SubOperationId, CityId)>>(iter: T) -> Self {
        let mut solution = Solution::new();
        for (op, sub, city) in iter {
            solution.assign(op, sub, city);
        }
        solution
    }
}

// Problem model: one immutable routing instance
// Dense matrices indexed by typed ids, with label lookup tables for the edges

use std::collections::HashMap;

use ndarray::{Array1, Array2};

use super::ids::{CityId, OperationId, SubOperationId};

/// Finite stand-in for an infinite cost in the derived cost tables.
///
/// Forbidden combinations must stay comparable in the dynamic program and
/// representable in an integer program, so `+inf` (and `NaN` from `0 * inf`)
/// becomes this value instead.
pub const SENTINEL_COST: f64 = 4_294_967_296.0;

/// Errors raised while building a [`Problem`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProblemError {
    #[error("{axis} label '{label}' appears more than once")]
    DuplicateLabel { axis: &'static str, label: String },

    #[error("{matrix} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        matrix: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("productivity has {actual} entries, expected {expected}")]
    ProductivityLength { expected: usize, actual: usize },

    #[error("operations matrix entry for sub-operation '{sub_operation}' is {value}, expected 0 or 1")]
    NonBinaryMembership { sub_operation: String, value: u8 },

    #[error("sub-operation '{sub_operation}' belongs to {count} operations, expected exactly one")]
    Membership { sub_operation: String, count: usize },

    #[error("problem has sub-operations but no cities")]
    NoCities,

    #[error("operation '{0}' has no sub-operations")]
    EmptyOperation(String),

    #[error("{matrix}[{row}, {column}] = {value} is not a non-negative cost")]
    InvalidEntry {
        matrix: &'static str,
        row: String,
        column: String,
        value: f64,
    },

    #[error("productivity of city '{city}' is {value}, expected a finite positive number")]
    InvalidProductivity { city: String, value: f64 },

    #[error("distances coefficient {0} must be finite and non-negative")]
    InvalidDistancesCoef(f64),
}

pub type Result<T> = std::result::Result<T, ProblemError>;

/// A routing instance: which sub-operations make up each operation, what
/// each costs in each city, and what it costs to move between cities.
#[derive(Debug, Clone)]
pub struct Problem {
    operations: Vec<String>,
    sub_operations: Vec<String>,
    cities: Vec<String>,
    operations_matrix: Array2<u8>,
    distances_matrix: Array2<f64>,
    times_matrix: Array2<f64>,
    costs_matrix: Array2<f64>,
    productivity: Array1<f64>,
    distances_coef: f64,
    owner: Vec<OperationId>,
    chains: Vec<Vec<SubOperationId>>,
    chain_position: Vec<usize>,
    operation_index: HashMap<String, OperationId>,
    sub_operation_index: HashMap<String, SubOperationId>,
    city_index: HashMap<String, CityId>,
}

impl Problem {
    /// Builds and validates a problem instance.
    ///
    /// Rows of `operations_matrix`, `times_matrix` and `costs_matrix` follow
    /// `sub_operations`; the row order is the processing order within each
    /// operation.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        operations: Vec<String>,
        sub_operations: Vec<String>,
        cities: Vec<String>,
        operations_matrix: Array2<u8>,
        distances_matrix: Array2<f64>,
        times_matrix: Array2<f64>,
        costs_matrix: Array2<f64>,
        productivity: Array1<f64>,
        distances_coef: f64,
    ) -> Result<Self> {
        let operation_index = index_labels("operation", &operations, OperationId::new)?;
        let sub_operation_index =
            index_labels("sub-operation", &sub_operations, SubOperationId::new)?;
        let city_index = index_labels("city", &cities, CityId::new)?;

        let (n_sub, n_ops, n_cities) = (sub_operations.len(), operations.len(), cities.len());
        if n_cities == 0 && n_sub > 0 {
            return Err(ProblemError::NoCities);
        }
        check_shape("operations matrix", operations_matrix.dim(), (n_sub, n_ops))?;
        check_shape("distances matrix", distances_matrix.dim(), (n_cities, n_cities))?;
        check_shape("times matrix", times_matrix.dim(), (n_sub, n_cities))?;
        check_shape("costs matrix", costs_matrix.dim(), (n_sub, n_cities))?;
        if productivity.len() != n_cities {
            return Err(ProblemError::ProductivityLength {
                expected: n_cities,
                actual: productivity.len(),
            });
        }

        check_costs("distances matrix", &distances_matrix, &cities, &cities)?;
        check_costs("times matrix", &times_matrix, &sub_operations, &cities)?;
        check_costs("costs matrix", &costs_matrix, &sub_operations, &cities)?;

        for (city, &value) in cities.iter().zip(productivity.iter()) {
            if !(value.is_finite() && value > 0.0) {
                return Err(ProblemError::InvalidProductivity {
                    city: city.clone(),
                    value,
                });
            }
        }
        if !(distances_coef.is_finite() && distances_coef >= 0.0) {
            return Err(ProblemError::InvalidDistancesCoef(distances_coef));
        }

        let mut owner = Vec::with_capacity(n_sub);
        let mut chains = vec![Vec::new(); n_ops];
        let mut chain_position = Vec::with_capacity(n_sub);
        for (i, row) in operations_matrix.outer_iter().enumerate() {
            if let Some(&value) = row.iter().find(|&&v| v > 1) {
                return Err(ProblemError::NonBinaryMembership {
                    sub_operation: sub_operations[i].clone(),
                    value,
                });
            }
            let members: Vec<usize> = row
                .iter()
                .enumerate()
                .filter(|(_, &v)| v == 1)
                .map(|(k, _)| k)
                .collect();
            if members.len() != 1 {
                return Err(ProblemError::Membership {
                    sub_operation: sub_operations[i].clone(),
                    count: members.len(),
                });
            }
            let k = members[0];
            owner.push(OperationId::new(k));
            chain_position.push(chains[k].len());
            chains[k].push(SubOperationId::new(i));
        }
        if let Some(k) = chains.iter().position(Vec::is_empty) {
            return Err(ProblemError::EmptyOperation(operations[k].clone()));
        }

        Ok(Self {
            operations,
            sub_operations,
            cities,
            operations_matrix,
            distances_matrix,
            times_matrix,
            costs_matrix,
            productivity,
            distances_coef,
            owner,
            chains,
            chain_position,
            operation_index,
            sub_operation_index,
            city_index,
        })
    }

    pub fn num_operations(&self) -> usize {
        self.operations.len()
    }

    pub fn num_sub_operations(&self) -> usize {
        self.sub_operations.len()
    }

    pub fn num_cities(&self) -> usize {
        self.cities.len()
    }

    pub fn operation_ids(&self) -> impl Iterator<Item = OperationId> {
        (0..self.operations.len()).map(OperationId::new)
    }

    pub fn sub_operation_ids(&self) -> impl Iterator<Item = SubOperationId> {
        (0..self.sub_operations.len()).map(SubOperationId::new)
    }

    pub fn city_ids(&self) -> impl Iterator<Item = CityId> {
        (0..self.cities.len()).map(CityId::new)
    }

    pub fn operation_label(&self, operation: OperationId) -> &str {
        &self.operations[operation.index()]
    }

    pub fn sub_operation_label(&self, sub_operation: SubOperationId) -> &str {
        &self.sub_operations[sub_operation.index()]
    }

    pub fn city_label(&self, city: CityId) -> &str {
        &self.cities[city.index()]
    }

    pub fn operation_id(&self, label: &str) -> Option<OperationId> {
        self.operation_index.get(label).copied()
    }

    pub fn sub_operation_id(&self, label: &str) -> Option<SubOperationId> {
        self.sub_operation_index.get(label).copied()
    }

    pub fn city_id(&self, label: &str) -> Option<CityId> {
        self.city_index.get(label).copied()
    }

    /// The operation a sub-operation belongs to.
    pub fn operation_of(&self, sub_operation: SubOperationId) -> OperationId {
        self.owner[sub_operation.index()]
    }

    /// Sub-operations of one operation, in processing order.
    pub fn chain(&self, operation: OperationId) -> &[SubOperationId] {
        &self.chains[operation.index()]
    }

    /// The sub-operation processed right after `sub_operation` within the
    /// same operation, if any.
    pub fn next_in_operation(&self, sub_operation: SubOperationId) -> Option<SubOperationId> {
        let chain = self.chain(self.operation_of(sub_operation));
        chain
            .get(self.chain_position[sub_operation.index()] + 1)
            .copied()
    }

    pub fn operations_matrix(&self) -> &Array2<u8> {
        &self.operations_matrix
    }

    pub fn distances_matrix(&self) -> &Array2<f64> {
        &self.distances_matrix
    }

    pub fn times_matrix(&self) -> &Array2<f64> {
        &self.times_matrix
    }

    pub fn costs_matrix(&self) -> &Array2<f64> {
        &self.costs_matrix
    }

    pub fn productivity(&self) -> &Array1<f64> {
        &self.productivity
    }

    pub fn distances_coef(&self) -> f64 {
        self.distances_coef
    }

    /// Raw processing cost, `inf` for forbidden combinations.
    pub fn processing_cost(&self, sub_operation: SubOperationId, city: CityId) -> f64 {
        let (i, m) = (sub_operation.index(), city.index());
        self.costs_matrix[[i, m]] * self.times_matrix[[i, m]] / self.productivity[m]
    }

    /// Raw transition cost between two cities, `inf` when no route exists.
    pub fn logistics_cost(&self, from: CityId, to: CityId) -> f64 {
        self.distances_coef * self.distances_matrix[[from.index(), to.index()]]
    }

    /// Derived cost matrices with non-finite entries replaced by [`SENTINEL_COST`].
    pub fn cost_tables(&self) -> CostTables {
        let processing = Array2::from_shape_fn(
            (self.num_sub_operations(), self.num_cities()),
            |(i, m)| sanitize(self.processing_cost(SubOperationId::new(i), CityId::new(m))),
        );
        let logistics = Array2::from_shape_fn((self.num_cities(), self.num_cities()), |(a, b)| {
            sanitize(self.logistics_cost(CityId::new(a), CityId::new(b)))
        });
        CostTables {
            processing,
            logistics,
        }
    }
}

/// Processing and logistics costs with the sentinel substitution applied.
#[derive(Debug, Clone)]
pub struct CostTables {
    /// `[sub_operation, city]`
    pub processing: Array2<f64>,
    /// `[from_city, to_city]`
    pub logistics: Array2<f64>,
}

impl CostTables {
    pub fn processing(&self, sub_operation: SubOperationId, city: CityId) -> f64 {
        self.processing[[sub_operation.index(), city.index()]]
    }

    pub fn logistics(&self, from: CityId, to: CityId) -> f64 {
        self.logistics[[from.index(), to.index()]]
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        SENTINEL_COST
    }
}

fn index_labels<I>(
    axis: &'static str,
    labels: &[String],
    make: impl Fn(usize) -> I,
) -> Result<HashMap<String, I>> {
    let mut index = HashMap::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        if index.insert(label.clone(), make(i)).is_some() {
            return Err(ProblemError::DuplicateLabel {
                axis,
                label: label.clone(),
            });
        }
    }
    Ok(index)
}

fn check_shape(
    matrix: &'static str,
    actual: (usize, usize),
    expected: (usize, usize),
) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(ProblemError::ShapeMismatch {
            matrix,
            expected,
            actual,
        })
    }
}

fn check_costs(
    matrix: &'static str,
    values: &Array2<f64>,
    rows: &[String],
    columns: &[String],
) -> Result<()> {
    for ((r, c), &value) in values.indexed_iter() {
        // +inf marks a forbidden combination and is allowed
        if value.is_nan() || value < 0.0 {
            return Err(ProblemError::InvalidEntry {
                matrix,
                row: rows[r].clone(),
                column: columns[c].clone(),
                value,
            });
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use ndarray::{arr1, arr2, Array2};

    use super::fixtures::{interleaved, labels, two_city_chain};
    use super::*;

    #[test]
    fn chains_follow_row_order() {
        let problem = interleaved();
        let op0: Vec<usize> = problem
            .chain(OperationId::new(0))
            .iter()
            .map(|s| s.index())
            .collect();
        let op1: Vec<usize> = problem
            .chain(OperationId::new(1))
            .iter()
            .map(|s| s.index())
            .collect();
        assert_eq!(op0, vec![0, 2, 4]);
        assert_eq!(op1, vec![1, 3]);
        assert_eq!(
            problem.next_in_operation(SubOperationId::new(0)),
            Some(SubOperationId::new(2))
        );
        assert_eq!(problem.next_in_operation(SubOperationId::new(3)), None);
        assert_eq!(problem.operation_of(SubOperationId::new(3)), OperationId::new(1));
    }

    #[test]
    fn processing_cost_divides_by_productivity() {
        let problem = interleaved();
        // costs 1 * times 3 / productivity 2
        assert_eq!(
            problem.processing_cost(SubOperationId::new(0), CityId::new(1)),
            1.5
        );
        assert_eq!(problem.logistics_cost(CityId::new(0), CityId::new(1)), 2.0);
        assert!(problem
            .processing_cost(SubOperationId::new(1), CityId::new(2))
            .is_infinite());
    }

    #[test]
    fn cost_tables_replace_infinity_with_sentinel() {
        let tables = interleaved().cost_tables();
        assert_eq!(tables.processing(SubOperationId::new(1), CityId::new(2)), SENTINEL_COST);
        assert_eq!(tables.logistics(CityId::new(0), CityId::new(2)), SENTINEL_COST);
        assert_eq!(tables.logistics(CityId::new(2), CityId::new(0)), 1.5);
    }

    #[test]
    fn zero_cost_times_infinite_time_is_sanitized() {
        let problem = Problem::new(
            labels("op", 1),
            labels("sub", 1),
            labels("city", 1),
            arr2(&[[1]]),
            arr2(&[[0.0]]),
            arr2(&[[f64::INFINITY]]),
            arr2(&[[0.0]]),
            arr1(&[1.0]),
            1.0,
        )
        .unwrap();
        assert!(problem
            .processing_cost(SubOperationId::new(0), CityId::new(0))
            .is_nan());
        assert_eq!(problem.cost_tables().processing[[0, 0]], SENTINEL_COST);
    }

    #[test]
    fn label_lookup() {
        let problem = two_city_chain();
        assert_eq!(problem.city_id("city1"), Some(CityId::new(1)));
        assert_eq!(problem.sub_operation_id("sub0"), Some(SubOperationId::new(0)));
        assert_eq!(problem.operation_id("op0"), Some(OperationId::new(0)));
        assert_eq!(problem.city_id("nowhere"), None);
    }

    #[test]
    fn rejects_sub_operation_in_two_operations() {
        let err = Problem::new(
            labels("op", 2),
            labels("sub", 1),
            labels("city", 1),
            arr2(&[[1, 1]]),
            arr2(&[[0.0]]),
            arr2(&[[1.0]]),
            arr2(&[[1.0]]),
            arr1(&[1.0]),
            1.0,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ProblemError::Membership {
                sub_operation: "sub0".into(),
                count: 2
            }
        );
    }

    #[test]
    fn rejects_operation_without_sub_operations() {
        let err = Problem::new(
            labels("op", 2),
            labels("sub", 1),
            labels("city", 1),
            arr2(&[[1, 0]]),
            arr2(&[[0.0]]),
            arr2(&[[1.0]]),
            arr2(&[[1.0]]),
            arr1(&[1.0]),
            1.0,
        )
        .unwrap_err();
        assert_eq!(err, ProblemError::EmptyOperation("op1".into()));
    }

    #[test]
    fn rejects_bad_shapes_and_values() {
        let shape = Problem::new(
            labels("op", 1),
            labels("sub", 2),
            labels("city", 2),
            arr2(&[[1], [1]]),
            Array2::zeros((2, 2)),
            Array2::ones((2, 3)),
            Array2::ones((2, 2)),
            arr1(&[1.0, 1.0]),
            1.0,
        )
        .unwrap_err();
        assert!(matches!(
            shape,
            ProblemError::ShapeMismatch {
                matrix: "times matrix",
                ..
            }
        ));

        let productivity = Problem::new(
            labels("op", 1),
            labels("sub", 1),
            labels("city", 1),
            arr2(&[[1]]),
            arr2(&[[0.0]]),
            arr2(&[[1.0]]),
            arr2(&[[1.0]]),
            arr1(&[0.0]),
            1.0,
        )
        .unwrap_err();
        assert!(matches!(productivity, ProblemError::InvalidProductivity { .. }));

        let negative = Problem::new(
            labels("op", 1),
            labels("sub", 1),
            labels("city", 1),
            arr2(&[[1]]),
            arr2(&[[-1.0]]),
            arr2(&[[1.0]]),
            arr2(&[[1.0]]),
            arr1(&[1.0]),
            1.0,
        )
        .unwrap_err();
        assert!(matches!(
            negative,
            ProblemError::InvalidEntry {
                matrix: "distances matrix",
                ..
            }
        ));
    }

    #[test]
    fn rejects_duplicate_labels() {
        let err = Problem::new(
            labels("op", 1),
            vec!["a".into(), "a".into()],
            labels("city", 1),
            arr2(&[[1], [1]]),
            arr2(&[[0.0]]),
            arr2(&[[1.0], [1.0]]),
            arr2(&[[1.0], [1.0]]),
            arr1(&[1.0]),
            1.0,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ProblemError::DuplicateLabel {
                axis: "sub-operation",
                label: "a".into()
            }
        );
    }
}

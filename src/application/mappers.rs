// Mappers: convert between JSON DTOs and domain models
// Keeps serde types out of the domain layer

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::runner::RunOutcome;
use crate::domain::{Problem, ProblemError, Solution};

/// Distances coefficient used when neither the dataset nor the caller sets one.
pub const DEFAULT_DISTANCES_COEF: f64 = 0.3;

/// Label-keyed routes: operation -> sub-operation -> city.
pub type RoutesDto = BTreeMap<String, BTreeMap<String, String>>;

/// Errors raised while turning external data into domain models
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{matrix} row {row} has {actual} entries, expected {expected}")]
    RaggedMatrix {
        matrix: &'static str,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{matrix} has {actual} rows, expected {expected}")]
    RowCount {
        matrix: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("instance '{instance}' has {actual} {axis}, expected {expected}")]
    Dimensions {
        instance: String,
        axis: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(
        "invalid instance name '{0}', expected 'OPERATIONS,SUB_OPERATIONS,CITIES-NUMBER' or 'example'"
    )]
    InstanceName(String),

    #[error("unknown {axis} '{label}' in solution")]
    UnknownLabel { axis: &'static str, label: String },

    #[error(transparent)]
    Problem(#[from] ProblemError),
}

pub type Result<T> = std::result::Result<T, DatasetError>;

/// One problem instance as stored on disk.
///
/// Matrix cells are `null` where the cost is infinite (forbidden).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDto {
    #[serde(default)]
    pub name: String,
    pub operations: Vec<String>,
    pub sub_operations: Vec<String>,
    pub cities: Vec<String>,
    /// `[sub_operation][operation]`, 1 if the sub-operation belongs to the operation
    pub operations_matrix: Vec<Vec<u8>>,
    /// `[city][city]`
    pub distances: Vec<Vec<Option<f64>>>,
    /// `[sub_operation][city]`
    pub times: Vec<Vec<Option<f64>>>,
    /// `[sub_operation][city]`
    pub costs: Vec<Vec<Option<f64>>>,
    pub productivity: Vec<f64>,
    #[serde(default)]
    pub distances_coef: Option<f64>,
}

/// Name of the bundled worked instance.
pub const EXAMPLE_INSTANCE: &str = "example";

/// Named instance `"{operations},{sub_operations},{cities}-{number}"` with
/// its declared dimensions, or the `example` instance (5 operations,
/// 10 sub-operations, 10 cities).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetRef {
    pub number: usize,
    pub operations: usize,
    pub sub_operations: usize,
    pub cities: usize,
    pub example: bool,
}

impl DatasetRef {
    pub fn new(number: usize, operations: usize, sub_operations: usize, cities: usize) -> Self {
        Self {
            number,
            operations,
            sub_operations,
            cities,
            example: false,
        }
    }

    pub fn example() -> Self {
        Self {
            example: true,
            ..Self::new(0, 5, 10, 10)
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self)
    }

    /// Checks that a loaded instance has the declared dimensions.
    pub fn check(&self, problem: &Problem) -> Result<()> {
        let axes = [
            ("operations", self.operations, problem.num_operations()),
            ("sub-operations", self.sub_operations, problem.num_sub_operations()),
            ("cities", self.cities, problem.num_cities()),
        ];
        for (axis, expected, actual) in axes {
            if expected != actual {
                return Err(DatasetError::Dimensions {
                    instance: self.to_string(),
                    axis,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.example {
            return f.write_str(EXAMPLE_INSTANCE);
        }
        write!(
            f,
            "{},{},{}-{}",
            self.operations, self.sub_operations, self.cities, self.number
        )
    }
}

impl FromStr for DatasetRef {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim() == EXAMPLE_INSTANCE {
            return Ok(Self::example());
        }
        let invalid = || DatasetError::InstanceName(s.to_string());
        let (dims, number) = s.split_once('-').ok_or_else(invalid)?;
        let dims: Vec<usize> = dims
            .split(',')
            .map(|d| d.trim().parse::<usize>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| invalid())?;
        let number = number.trim().parse().map_err(|_| invalid())?;
        match dims[..] {
            [operations, sub_operations, cities] => {
                Ok(Self::new(number, operations, sub_operations, cities))
            }
            _ => Err(invalid()),
        }
    }
}

/// Builds a validated [`Problem`]; `coef_override` wins over the dataset's
/// own coefficient, which wins over [`DEFAULT_DISTANCES_COEF`].
pub fn dataset_to_problem(dataset: DatasetDto, coef_override: Option<f64>) -> Result<Problem> {
    let n_sub = dataset.sub_operations.len();
    let n_ops = dataset.operations.len();
    let n_cities = dataset.cities.len();

    let operations_matrix =
        to_array("operations matrix", &dataset.operations_matrix, n_sub, n_ops, |&v| v)?;
    let distances = to_array("distances matrix", &dataset.distances, n_cities, n_cities, or_inf)?;
    let times = to_array("times matrix", &dataset.times, n_sub, n_cities, or_inf)?;
    let costs = to_array("costs matrix", &dataset.costs, n_sub, n_cities, or_inf)?;
    let distances_coef = coef_override
        .or(dataset.distances_coef)
        .unwrap_or(DEFAULT_DISTANCES_COEF);

    Ok(Problem::new(
        dataset.operations,
        dataset.sub_operations,
        dataset.cities,
        operations_matrix,
        distances,
        times,
        costs,
        Array1::from(dataset.productivity),
        distances_coef,
    )?)
}

/// Converts a problem back into its storable form.
pub fn problem_to_dataset(problem: &Problem, name: impl Into<String>) -> DatasetDto {
    let finite = |v: &f64| v.is_finite().then_some(*v);
    let rows = |matrix: &Array2<f64>| -> Vec<Vec<Option<f64>>> {
        matrix
            .outer_iter()
            .map(|row| row.iter().map(finite).collect())
            .collect()
    };

    DatasetDto {
        name: name.into(),
        operations: problem
            .operation_ids()
            .map(|id| problem.operation_label(id).to_string())
            .collect(),
        sub_operations: problem
            .sub_operation_ids()
            .map(|id| problem.sub_operation_label(id).to_string())
            .collect(),
        cities: problem.city_ids().map(|id| problem.city_label(id).to_string()).collect(),
        operations_matrix: problem
            .operations_matrix()
            .outer_iter()
            .map(|row| row.to_vec())
            .collect(),
        distances: rows(problem.distances_matrix()),
        times: rows(problem.times_matrix()),
        costs: rows(problem.costs_matrix()),
        productivity: problem.productivity().to_vec(),
        distances_coef: Some(problem.distances_coef()),
    }
}

/// Resolves a label-keyed routing against `problem`.
pub fn routes_to_solution(problem: &Problem, routes: &RoutesDto) -> Result<Solution> {
    let unknown = |axis, label: &String| DatasetError::UnknownLabel {
        axis,
        label: label.clone(),
    };

    let mut solution = Solution::new();
    for (operation, route) in routes {
        let op = problem
            .operation_id(operation)
            .ok_or_else(|| unknown("operation", operation))?;
        // An empty route is still a recorded (incomplete) route
        solution.set_route(op, Default::default());
        for (sub_operation, city) in route {
            let sub = problem
                .sub_operation_id(sub_operation)
                .ok_or_else(|| unknown("sub-operation", sub_operation))?;
            let city = problem.city_id(city).ok_or_else(|| unknown("city", city))?;
            solution.assign(op, sub, city);
        }
    }
    Ok(solution)
}

/// Result of one solver run, as written to the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverReportDto {
    pub solver: String,
    pub elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logistics_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<RoutesDto>,
}

pub fn outcome_to_dto(problem: &Problem, outcome: &RunOutcome) -> SolverReportDto {
    let mut dto = SolverReportDto {
        solver: outcome.solver.to_string(),
        elapsed_ms: outcome.elapsed.as_secs_f64() * 1000.0,
        cost: None,
        processing_cost: None,
        logistics_cost: None,
        error: None,
        routes: None,
    };
    match &outcome.result {
        Ok(evaluated) => {
            dto.cost = Some(evaluated.cost.total());
            dto.processing_cost = Some(evaluated.cost.processing);
            dto.logistics_cost = Some(evaluated.cost.logistics);
            dto.routes = Some(evaluated.solution.to_labels(problem));
        }
        Err(err) => {
            dto.error = Some(err.to_string());
            dto.routes = err.solution().map(|solution| solution.to_labels(problem));
        }
    }
    dto
}

fn or_inf(value: &Option<f64>) -> f64 {
    value.unwrap_or(f64::INFINITY)
}

fn to_array<T, U: Clone + Default>(
    matrix: &'static str,
    rows: &[Vec<T>],
    n_rows: usize,
    n_columns: usize,
    convert: impl Fn(&T) -> U,
) -> Result<Array2<U>> {
    if rows.len() != n_rows {
        return Err(DatasetError::RowCount {
            matrix,
            expected: n_rows,
            actual: rows.len(),
        });
    }
    let mut array = Array2::default((n_rows, n_columns));
    for (r, row) in rows.iter().enumerate() {
        if row.len() != n_columns {
            return Err(DatasetError::RaggedMatrix {
                matrix,
                row: r,
                expected: n_columns,
                actual: row.len(),
            });
        }
        for (c, value) in row.iter().enumerate() {
            array[[r, c]] = convert(value);
        }
    }
    Ok(array)
}

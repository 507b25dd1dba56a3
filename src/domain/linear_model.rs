use std::time::Duration;

use ndarray::{Array, Dimension, ShapeBuilder};

use super::value_objects::{ConstraintType, SolutionStatus};

/// Handle of a binary decision variable inside a [`LinearModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Linear constraint over a sparse set of variables
#[derive(Debug, Clone)]
pub struct Constraint {
    pub constraint_type: ConstraintType,
    pub terms: Vec<(VarId, f64)>,
    pub bound: f64,
    pub name: String,
}

impl Constraint {
    pub fn new(constraint_type: ConstraintType, terms: Vec<(VarId, f64)>, bound: f64) -> Self {
        Self {
            constraint_type,
            terms,
            bound,
            name: String::new(),
        }
    }

    pub fn leq(terms: Vec<(VarId, f64)>, bound: f64) -> Self {
        Self::new(ConstraintType::LessThanOrEqual, terms, bound)
    }

    pub fn eq(terms: Vec<(VarId, f64)>, bound: f64) -> Self {
        Self::new(ConstraintType::Equal, terms, bound)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Name for diagnostics, falling back to the position in the model.
    pub fn label(&self, index: usize) -> String {
        if self.name.is_empty() {
            index.to_string()
        } else {
            format!("'{}'", self.name)
        }
    }
}

/// 0/1 integer program: binary variables, a linear objective to minimise,
/// and linear constraints
#[derive(Debug, Clone, Default)]
pub struct LinearModel {
    pub name: String,
    pub variable_names: Vec<String>,
    pub objective: Vec<f64>,
    pub constraints: Vec<Constraint>,
    pub time_limit: Option<Duration>,
}

impl LinearModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Adds a binary variable with a zero objective coefficient.
    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        let id = VarId(self.variable_names.len());
        self.variable_names.push(name.into());
        self.objective.push(0.0);
        id
    }

    /// Adds one binary variable per cell of `shape`, named after `name` and
    /// the cell index.
    pub fn add_var_tensor<Sh, D>(&mut self, name: &str, shape: Sh) -> Array<VarId, D>
    where
        Sh: ShapeBuilder<Dim = D>,
        D: Dimension,
    {
        Array::from_shape_fn(shape, |index| self.add_binary(format!("{}{:?}", name, index)))
    }

    pub fn add_objective_term(&mut self, var: VarId, coefficient: f64) {
        self.objective[var.0] += coefficient;
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn num_variables(&self) -> usize {
        self.variable_names.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Whether `values` satisfies every constraint within `tolerance`.
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        if values.len() != self.num_variables() {
            return false;
        }
        self.constraints.iter().all(|constraint| {
            let lhs: f64 = constraint
                .terms
                .iter()
                .map(|&(var, coeff)| coeff * values[var.0])
                .sum();
            match constraint.constraint_type {
                ConstraintType::LessThanOrEqual => lhs <= constraint.bound + tolerance,
                ConstraintType::Equal => (lhs - constraint.bound).abs() <= tolerance,
                ConstraintType::GreaterThanOrEqual => lhs >= constraint.bound - tolerance,
            }
        })
    }
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
}

impl SolverStatistics {
    pub fn for_model(model: &LinearModel, solve_time_ms: f64) -> Self {
        Self {
            solve_time_ms,
            num_variables: model.num_variables() as u32,
            num_constraints: model.num_constraints() as u32,
        }
    }
}

/// Outcome of solving a [`LinearModel`]
#[derive(Debug, Clone)]
pub struct MipSolution {
    pub status: SolutionStatus,
    pub objective_value: Option<f64>,
    pub variable_values: Vec<f64>,
    pub message: String,
    pub statistics: SolverStatistics,
}

impl MipSolution {
    /// A solve that produced no assignment.
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            objective_value: None,
            variable_values: Vec::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn optimal(value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            objective_value: Some(value),
            variable_values,
            message: "Optimal solution found".to_string(),
            statistics: SolverStatistics::default(),
        }
    }

    /// Best incumbent found before the time limit expired.
    pub fn time_limited(value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::TimeLimit,
            objective_value: Some(value),
            variable_values,
            message: "Time limit reached, returning incumbent".to_string(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn value(&self, var: VarId) -> Option<f64> {
        self.variable_values.get(var.0).copied()
    }

    pub fn has_incumbent(&self) -> bool {
        !self.variable_values.is_empty()
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

/// Objective value of `values` under `model`'s objective.
pub fn objective_value(model: &LinearModel, values: &[f64]) -> f64 {
    model
        .objective
        .iter()
        .zip(values)
        .map(|(coefficient, value)| coefficient * value)
        .sum()
}

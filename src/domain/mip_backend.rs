// Domain service interface for integer-programming backends
// Any engine that can minimise a 0/1 linear model plugs in here

use super::linear_model::{LinearModel, MipSolution};
use super::solver_service::{Result, SolverError};

/// External combinatorial solver capability.
///
/// Running out of time is not an error: the returned [`MipSolution`] carries
/// [`crate::domain::SolutionStatus::TimeLimit`] and the incumbent, if any.
pub trait MipBackend: Send + Sync {
    /// Solve a model, respecting `model.time_limit` where supported
    fn solve(&self, model: &LinearModel) -> Result<MipSolution>;

    /// Validate a model without solving it
    fn validate(&self, model: &LinearModel) -> Result<()> {
        let mut errors = Vec::new();
        let num_vars = model.num_variables();

        if num_vars == 0 {
            errors.push("Model must have at least one variable".to_string());
        }

        if model.objective.len() != num_vars {
            errors.push(format!(
                "Objective has {} coefficients but model has {} variables",
                model.objective.len(),
                num_vars
            ));
        }

        if let Some(i) = model.objective.iter().position(|c| !c.is_finite()) {
            errors.push(format!(
                "Objective coefficient of '{}' is not finite",
                model.variable_names[i]
            ));
        }

        for (i, constraint) in model.constraints.iter().enumerate() {
            let label = constraint.label(i);
            if !constraint.bound.is_finite() {
                errors.push(format!("Constraint {} has a non-finite bound", label));
            }
            for &(var, coeff) in &constraint.terms {
                if var.index() >= num_vars {
                    errors.push(format!(
                        "Constraint {} references variable {} but model has {} variables",
                        label,
                        var.index(),
                        num_vars
                    ));
                } else if !coeff.is_finite() {
                    errors.push(format!("Constraint {} has a non-finite coefficient", label));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidModel(errors.join("; ")))
        }
    }

    /// Get the name of this backend
    fn name(&self) -> &str;

    /// Whether `model.time_limit` is honoured
    fn supports_time_limit(&self) -> bool;
}

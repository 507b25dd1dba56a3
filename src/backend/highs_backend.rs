// HiGHS backend adapter
// Translates a domain LinearModel into a HiGHS RowProblem

use std::time::Instant;

use highs::{HighsModelStatus, RowProblem, Sense};
use tracing::{debug, warn};

use crate::domain::{
    linear_model::{objective_value, LinearModel, MipSolution, SolverStatistics},
    mip_backend::MipBackend,
    solver_service::{Result, SolverError},
    value_objects::{ConstraintType, SolutionStatus},
};

/// Tolerance used to accept a time-limited incumbent.
const FEASIBILITY_TOLERANCE: f64 = 1e-6;

pub struct HighsBackend;

impl HighsBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MipBackend for HighsBackend {
    fn solve(&self, model: &LinearModel) -> Result<MipSolution> {
        self.validate(model)?;

        let start_time = Instant::now();

        // Add variables first, then constraints
        let mut pb = RowProblem::default();
        let cols: Vec<_> = model
            .objective
            .iter()
            .map(|&obj_coeff| pb.add_integer_column(obj_coeff, 0.0..=1.0))
            .collect();

        for constraint in &model.constraints {
            let terms: Vec<_> = constraint
                .terms
                .iter()
                .filter(|(_, coeff)| *coeff != 0.0)
                .map(|&(var, coeff)| (cols[var.index()], coeff))
                .collect();

            match constraint.constraint_type {
                ConstraintType::LessThanOrEqual => {
                    pb.add_row(..=constraint.bound, &terms);
                }
                ConstraintType::Equal => {
                    pb.add_row(constraint.bound..=constraint.bound, &terms);
                }
                ConstraintType::GreaterThanOrEqual => {
                    pb.add_row(constraint.bound.., &terms);
                }
            }
        }

        let mut highs_model = pb.optimise(Sense::Minimise);
        highs_model.set_option("output_flag", false);
        if let Some(limit) = model.time_limit {
            highs_model.set_option("time_limit", limit.as_secs_f64());
        }

        debug!(
            model = %model.name,
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            "solving with HiGHS"
        );
        let solved = highs_model.solve();
        let statistics =
            SolverStatistics::for_model(model, start_time.elapsed().as_secs_f64() * 1000.0);

        match solved.status() {
            HighsModelStatus::Optimal => {
                let variable_values = solved.get_solution().columns().to_vec();
                let value = objective_value(model, &variable_values);
                Ok(MipSolution::optimal(value, variable_values).with_statistics(statistics))
            }
            HighsModelStatus::ReachedTimeLimit => {
                let variable_values = solved.get_solution().columns().to_vec();
                if model.is_satisfied_by(&variable_values, FEASIBILITY_TOLERANCE) {
                    let value = objective_value(model, &variable_values);
                    Ok(MipSolution::time_limited(value, variable_values)
                        .with_statistics(statistics))
                } else {
                    warn!(
                        model = %model.name,
                        "HiGHS stopped at the time limit without an incumbent"
                    );
                    Ok(MipSolution::new(
                        SolutionStatus::TimeLimit,
                        "Time limit reached without an incumbent",
                    )
                    .with_statistics(statistics))
                }
            }
            HighsModelStatus::Infeasible => Ok(MipSolution::new(
                SolutionStatus::Infeasible,
                "Model is infeasible: no assignment satisfies all constraints",
            )
            .with_statistics(statistics)),
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                Ok(MipSolution::new(
                    SolutionStatus::Unbounded,
                    "Model is unbounded: objective can be improved infinitely",
                )
                .with_statistics(statistics))
            }
            status => Err(SolverError::ExecutionFailed(format!(
                "HiGHS solver returned status: {:?}",
                status
            ))),
        }
    }

    fn name(&self) -> &str {
        "HiGHS"
    }

    fn supports_time_limit(&self) -> bool {
        true
    }
}

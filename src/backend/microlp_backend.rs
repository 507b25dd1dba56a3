// microlp backend adapter
// Pure-Rust branch and bound through good_lp; always compiled in

use std::time::Instant;

use good_lp::{
    solvers::microlp::microlp, ResolutionError, Solution as GoodLpSolutionTrait, SolverModel,
};
use tracing::{debug, warn};

use super::lp_builder::{add_constraints, build_variables};
use crate::domain::{
    linear_model::{objective_value, LinearModel, MipSolution, SolverStatistics},
    mip_backend::MipBackend,
    solver_service::{Result, SolverError},
    value_objects::SolutionStatus,
};

pub struct MicrolpBackend;

impl MicrolpBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MicrolpBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MipBackend for MicrolpBackend {
    fn solve(&self, model: &LinearModel) -> Result<MipSolution> {
        self.validate(model)?;

        if let Some(limit) = model.time_limit {
            warn!(
                model = %model.name,
                time_limit_secs = limit.as_secs_f64(),
                "microlp does not support time limits, solving to optimality"
            );
        }

        let start_time = Instant::now();
        let (vars, lp_variables, objective) = build_variables(model);
        let lp_model =
            add_constraints(vars.minimise(objective).using(microlp), model, &lp_variables);

        debug!(
            model = %model.name,
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            "solving with microlp"
        );
        let solution_result = lp_model.solve();
        let statistics =
            SolverStatistics::for_model(model, start_time.elapsed().as_secs_f64() * 1000.0);

        match solution_result {
            Ok(sol) => {
                let variable_values: Vec<f64> =
                    lp_variables.iter().map(|&var| sol.value(var)).collect();
                let value = objective_value(model, &variable_values);
                Ok(MipSolution::optimal(value, variable_values).with_statistics(statistics))
            }
            Err(ResolutionError::Infeasible) => Ok(MipSolution::new(
                SolutionStatus::Infeasible,
                "Model is infeasible: no assignment satisfies all constraints",
            )
            .with_statistics(statistics)),
            Err(ResolutionError::Unbounded) => Ok(MipSolution::new(
                SolutionStatus::Unbounded,
                "Model is unbounded: objective can be improved infinitely",
            )
            .with_statistics(statistics)),
            Err(e) => Err(SolverError::ExecutionFailed(format!("{:?}", e))),
        }
    }

    fn name(&self) -> &str {
        "microlp"
    }

    fn supports_time_limit(&self) -> bool {
        false
    }
}

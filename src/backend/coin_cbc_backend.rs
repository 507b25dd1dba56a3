// COIN-OR CBC backend adapter
// Drives CBC through good_lp; the time limit maps onto CBC's "seconds" parameter

use std::time::Instant;

use good_lp::{
    solvers::coin_cbc::coin_cbc, ResolutionError, Solution as GoodLpSolutionTrait, SolverModel,
};
use tracing::{debug, warn};

use super::lp_builder::{add_constraints, build_variables};
use crate::domain::{
    linear_model::{objective_value, LinearModel, MipSolution, SolverStatistics},
    mip_backend::MipBackend,
    solver_service::{Result, SolverError},
    value_objects::SolutionStatus,
};

pub struct CoinCbcBackend;

impl CoinCbcBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinCbcBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MipBackend for CoinCbcBackend {
    fn solve(&self, model: &LinearModel) -> Result<MipSolution> {
        self.validate(model)?;

        let start_time = Instant::now();
        let (vars, lp_variables, objective) = build_variables(model);
        let mut lp_model =
            add_constraints(vars.minimise(objective).using(coin_cbc), model, &lp_variables);
        lp_model.set_parameter("log", "0");
        if let Some(limit) = model.time_limit {
            lp_model.set_parameter("seconds", &limit.as_secs_f64().to_string());
        }

        debug!(
            model = %model.name,
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            "solving with CBC"
        );
        let solution_result = lp_model.solve();
        let elapsed = start_time.elapsed();
        let statistics = SolverStatistics::for_model(model, elapsed.as_secs_f64() * 1000.0);
        let out_of_time = model.time_limit.is_some_and(|limit| elapsed >= limit);

        match solution_result {
            Ok(sol) => {
                let variable_values: Vec<f64> =
                    lp_variables.iter().map(|&var| sol.value(var)).collect();
                let value = objective_value(model, &variable_values);
                let solution = if out_of_time {
                    MipSolution::time_limited(value, variable_values)
                } else {
                    MipSolution::optimal(value, variable_values)
                };
                Ok(solution.with_statistics(statistics))
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
            Err(e) if out_of_time => {
                warn!(
                    model = %model.name,
                    error = ?e,
                    "CBC stopped at the time limit without an incumbent"
                );
                Ok(MipSolution::new(
                    SolutionStatus::TimeLimit,
                    "Time limit reached without an incumbent",
                )
                .with_statistics(statistics))
            }
            Err(e) => Err(SolverError::ExecutionFailed(format!("{:?}", e))),
        }
    }

    fn name(&self) -> &str {
        "COIN-OR CBC"
    }

    fn supports_time_limit(&self) -> bool {
        true
    }
}

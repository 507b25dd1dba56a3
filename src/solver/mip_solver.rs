// Integer-programming solvers
// Both formulations are exact given unlimited time; the per-operation one
// solves one small model per operation instead of one joint model

use std::sync::Arc;
use std::time::Duration;

use ndarray::{Array2, Array3};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{
    ids::{CityId, OperationId, SubOperationId},
    linear_model::{Constraint, LinearModel, MipSolution, VarId},
    mip_backend::MipBackend,
    problem::{CostTables, Problem},
    solution::{OperationRoute, Solution},
    solver_service::{Result, RoutingSolver, SolverError},
};

/// A variable counts as selected once its value is closer to 1 than to 0.
pub const SELECTION_THRESHOLD: f64 = 0.5;

/// One joint model over all operations.
///
/// `gamma[i, k, m]` selects city `m` for sub-operation `i` under operation
/// `k`; `delta[m, m']` for each sub-operation linked to its successor in the
/// same operation charges the transition between the two chosen cities.
pub struct MipSolver {
    backend: Arc<dyn MipBackend>,
    time_limit: Option<Duration>,
}

impl MipSolver {
    pub fn new(backend: Arc<dyn MipBackend>) -> Self {
        Self {
            backend,
            time_limit: None,
        }
    }

    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }

    fn build_model(&self, problem: &Problem, tables: &CostTables) -> (LinearModel, Array3<VarId>) {
        let (n_sub, n_ops, n_cities) = (
            problem.num_sub_operations(),
            problem.num_operations(),
            problem.num_cities(),
        );
        let mut model = LinearModel::new("routing").with_time_limit(self.time_limit);
        let gamma = model.add_var_tensor("gamma", (n_sub, n_ops, n_cities));

        for ((i, _, m), &var) in gamma.indexed_iter() {
            model.add_objective_term(var, tables.processing[[i, m]]);
        }

        let operations_matrix = problem.operations_matrix();
        for i in 0..n_sub {
            for k in 0..n_ops {
                let terms = (0..n_cities).map(|m| (gamma[[i, k, m]], 1.0)).collect();
                model.add_constraint(
                    Constraint::eq(terms, f64::from(operations_matrix[[i, k]]))
                        .with_name(format!("assign[{},{}]", i, k)),
                );
            }
        }

        // Only a sub-operation's own operation can link it to a successor
        for sub in problem.sub_operation_ids() {
            let Some(next) = problem.next_in_operation(sub) else {
                continue;
            };
            let k = problem.operation_of(sub).index();
            let delta = model
                .add_var_tensor(&format!("delta[{},{}]", sub.index(), k), (n_cities, n_cities));
            link_successor(
                &mut model,
                tables,
                &delta,
                |m| gamma[[sub.index(), k, m]],
                |m| gamma[[next.index(), k, m]],
            );
        }

        (model, gamma)
    }
}

impl RoutingSolver for MipSolver {
    fn solve(&self, problem: &Problem) -> Result<Solution> {
        check_time_limit(self.backend.as_ref(), self.time_limit)?;
        let tables = problem.cost_tables();
        let (model, gamma) = self.build_model(problem, &tables);
        if model.num_variables() == 0 {
            return Ok(Solution::new());
        }
        info!(
            backend = self.backend.name(),
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            "solving joint routing model"
        );

        let outcome = self.backend.solve(&model)?;
        let mut solution = Solution::new();
        if !accept(&model, &outcome) {
            return Ok(solution);
        }

        for ((i, k, m), &var) in gamma.indexed_iter() {
            if is_selected(&outcome, var) {
                solution.assign(OperationId::new(k), SubOperationId::new(i), CityId::new(m));
            }
        }
        Ok(solution)
    }

    fn name(&self) -> &str {
        "integer programming"
    }

    fn is_exact(&self) -> bool {
        self.time_limit.is_none()
    }
}

/// One model per operation, mirroring the dynamic program's decomposition.
///
/// Operations never share variables, so they can be solved on separate
/// threads when `parallel` is set.
pub struct PerOperationMipSolver {
    backend: Arc<dyn MipBackend>,
    time_limit: Option<Duration>,
    parallel: bool,
}

impl PerOperationMipSolver {
    pub fn new(backend: Arc<dyn MipBackend>) -> Self {
        Self {
            backend,
            time_limit: None,
            parallel: false,
        }
    }

    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn solve_operation(
        &self,
        problem: &Problem,
        tables: &CostTables,
        operation: OperationId,
    ) -> Result<OperationRoute> {
        let chain = problem.chain(operation);
        let n_cities = problem.num_cities();
        let mut model = LinearModel::new(problem.operation_label(operation))
            .with_time_limit(self.time_limit);
        let gamma = model.add_var_tensor("gamma", (chain.len(), n_cities));

        for ((i, m), &var) in gamma.indexed_iter() {
            model.add_objective_term(var, tables.processing[[chain[i].index(), m]]);
        }
        for i in 0..chain.len() {
            let terms = (0..n_cities).map(|m| (gamma[[i, m]], 1.0)).collect();
            model.add_constraint(Constraint::eq(terms, 1.0).with_name(format!("assign[{}]", i)));
        }
        for i in 1..chain.len() {
            let delta = model.add_var_tensor(&format!("delta[{}]", i - 1), (n_cities, n_cities));
            link_successor(&mut model, tables, &delta, |m| gamma[[i - 1, m]], |m| gamma[[i, m]]);
        }

        let outcome = self.backend.solve(&model)?;
        let mut route = OperationRoute::new();
        if accept(&model, &outcome) {
            for ((i, m), &var) in gamma.indexed_iter() {
                if is_selected(&outcome, var) {
                    route.insert(chain[i], CityId::new(m));
                }
            }
        }
        Ok(route)
    }
}

impl RoutingSolver for PerOperationMipSolver {
    fn solve(&self, problem: &Problem) -> Result<Solution> {
        check_time_limit(self.backend.as_ref(), self.time_limit)?;
        let tables = problem.cost_tables();
        let operations: Vec<OperationId> = problem.operation_ids().collect();
        info!(
            backend = self.backend.name(),
            operations = operations.len(),
            parallel = self.parallel,
            "solving per-operation routing models"
        );

        let routes: Vec<OperationRoute> = if self.parallel {
            operations
                .par_iter()
                .map(|&op| self.solve_operation(problem, &tables, op))
                .collect::<Result<_>>()?
        } else {
            operations
                .iter()
                .map(|&op| self.solve_operation(problem, &tables, op))
                .collect::<Result<_>>()?
        };

        Ok(operations
            .into_iter()
            .zip(routes)
            .fold(Solution::new(), |solution, (op, route)| solution.with_route(op, route)))
    }

    fn name(&self) -> &str {
        "per-operation integer programming"
    }

    fn is_exact(&self) -> bool {
        self.time_limit.is_none()
    }
}

fn check_time_limit(backend: &dyn MipBackend, time_limit: Option<Duration>) -> Result<()> {
    if time_limit.is_some() && !backend.supports_time_limit() {
        return Err(SolverError::BackendUnavailable(format!(
            "{} cannot honour a time limit",
            backend.name()
        )));
    }
    Ok(())
}

/// Adds the transition cost between two consecutive sub-operations:
/// `gamma_from[m] + gamma_to[m'] - 1 <= delta[m, m']`, with `delta[m, m']`
/// charged the logistics cost from `m` to `m'`.
fn link_successor(
    model: &mut LinearModel,
    tables: &CostTables,
    delta: &Array2<VarId>,
    gamma_from: impl Fn(usize) -> VarId,
    gamma_to: impl Fn(usize) -> VarId,
) {
    for ((m, m_next), &var) in delta.indexed_iter() {
        model.add_objective_term(var, tables.logistics[[m, m_next]]);
        model.add_constraint(Constraint::leq(
            vec![(gamma_from(m), 1.0), (gamma_to(m_next), 1.0), (var, -1.0)],
            1.0,
        ));
    }
}

/// Whether the outcome carries values worth reading. Anything else leaves
/// the affected routes empty, which the evaluator reports as incomplete.
fn accept(model: &LinearModel, outcome: &MipSolution) -> bool {
    debug!(
        model = %model.name,
        status = %outcome.status,
        solve_time_ms = outcome.statistics.solve_time_ms,
        "model solved"
    );
    if !outcome.has_incumbent() {
        warn!(model = %model.name, status = %outcome.status, "{}", outcome.message);
        return false;
    }
    if !outcome.is_optimal() {
        warn!(
            model = %model.name,
            status = %outcome.status,
            "using a possibly suboptimal incumbent"
        );
    }
    true
}

fn is_selected(outcome: &MipSolution, var: VarId) -> bool {
    outcome
        .value(var)
        .is_some_and(|value| value >= SELECTION_THRESHOLD)
}

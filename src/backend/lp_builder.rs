// Translation of a domain LinearModel into a good_lp model
// Shared by every good_lp-driven backend

use good_lp::{
    variable, variables, Expression, ProblemVariables, SolverModel, Variable as GoodLpVariable,
};

use crate::domain::{linear_model::LinearModel, value_objects::ConstraintType};

/// Binary good_lp variables (one per model variable) and the objective.
pub(crate) fn build_variables(
    model: &LinearModel,
) -> (ProblemVariables, Vec<GoodLpVariable>, Expression) {
    let mut vars = variables!();
    let lp_variables: Vec<GoodLpVariable> = model
        .variable_names
        .iter()
        .map(|name| vars.add(variable().binary().name(name.as_str())))
        .collect();

    let mut objective: Expression = 0.into();
    for (i, &coeff) in model.objective.iter().enumerate() {
        if coeff != 0.0 {
            objective += coeff * lp_variables[i];
        }
    }

    (vars, lp_variables, objective)
}

/// Adds every model constraint to a good_lp solver model.
pub(crate) fn add_constraints<M: SolverModel>(
    mut lp_model: M,
    model: &LinearModel,
    lp_variables: &[GoodLpVariable],
) -> M {
    for constraint in &model.constraints {
        let mut lhs: Expression = 0.into();
        for &(var, coeff) in &constraint.terms {
            if coeff != 0.0 {
                lhs += coeff * lp_variables[var.index()];
            }
        }

        lp_model = match constraint.constraint_type {
            ConstraintType::LessThanOrEqual => lp_model.with(lhs.leq(constraint.bound)),
            ConstraintType::Equal => lp_model.with(lhs.eq(constraint.bound)),
            ConstraintType::GreaterThanOrEqual => lp_model.with(lhs.geq(constraint.bound)),
        };
    }
    lp_model
}

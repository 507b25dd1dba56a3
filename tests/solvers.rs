mod common;

use std::sync::Arc;

use common::{assert_close, generate, two_city_chain, InstanceShape};
use siteopt::backend::MicrolpBackend;
use siteopt::domain::{MipBackend, OperationId, SubOperationId};
use siteopt::{
    evaluate, CityId, DpSolver, EvaluationError, GreedySolver, MipSolver, PerOperationMipSolver,
    RandomSolver, RoutingSolver, Solution,
};

fn microlp() -> Arc<dyn MipBackend> {
    Arc::new(MicrolpBackend::new())
}

fn exact_solvers() -> Vec<Box<dyn RoutingSolver>> {
    vec![
        Box::new(DpSolver::new()),
        Box::new(MipSolver::new(microlp())),
        Box::new(PerOperationMipSolver::new(microlp())),
        Box::new(PerOperationMipSolver::new(microlp()).with_parallel(true)),
    ]
}

fn small_instances() -> Vec<siteopt::Problem> {
    let mut problems = Vec::new();
    for seed in 0..4 {
        problems.push(generate(InstanceShape::dense(2, 6, 3), seed));
        problems.push(generate(InstanceShape::sparse(3, 7, 4), 100 + seed));
    }
    problems
}

#[test]
fn worked_example_costs_four() {
    let problem = two_city_chain();
    let op = OperationId::new(0);
    for solver in exact_solvers() {
        let solution = solver.solve(&problem).unwrap();
        assert_eq!(evaluate(&problem, &solution).unwrap(), 4.0, "{}", solver.name());
        assert_eq!(solution.city_of(op, SubOperationId::new(0)), Some(CityId::new(0)));
        assert_eq!(solution.city_of(op, SubOperationId::new(1)), Some(CityId::new(1)));
    }
}

#[test]
fn exact_solvers_agree() {
    for problem in small_instances() {
        let dp = evaluate(&problem, &DpSolver::new().solve(&problem).unwrap()).unwrap();
        assert!(dp.is_finite());
        for solver in exact_solvers() {
            let cost = evaluate(&problem, &solver.solve(&problem).unwrap()).unwrap();
            assert_close(cost, dp);
        }
    }
}

#[test]
fn greedy_never_beats_dp() {
    for seed in 0..20 {
        let problem = generate(InstanceShape::sparse(3, 12, 5), seed);
        let dp = evaluate(&problem, &DpSolver::new().solve(&problem).unwrap()).unwrap();
        let greedy = GreedySolver::new().solve(&problem).unwrap();
        match evaluate(&problem, &greedy) {
            Ok(cost) => assert!(cost >= dp - 1e-9, "greedy {cost} < dp {dp}"),
            // A myopic pass can walk into a city with no way out
            Err(err) => assert!(
                matches!(err, EvaluationError::InfeasibleAssignment { .. }),
                "{err}"
            ),
        }
    }
}

#[test]
fn deterministic_solvers_cost_finite_on_dense_instances() {
    for seed in 0..10 {
        let problem = generate(InstanceShape::dense(4, 15, 6), seed);
        let solvers: [&dyn RoutingSolver; 2] = [&DpSolver::new(), &GreedySolver::new()];
        for solver in solvers {
            let cost = evaluate(&problem, &solver.solve(&problem).unwrap()).unwrap();
            assert!(cost.is_finite(), "{}", solver.name());
        }
    }
}

#[test]
fn deterministic_solvers_are_idempotent() {
    let problem = generate(InstanceShape::sparse(3, 7, 4), 7);
    for solver in exact_solvers()
        .into_iter()
        .chain([Box::new(GreedySolver::new()) as Box<dyn RoutingSolver>])
    {
        assert_eq!(
            solver.solve(&problem).unwrap(),
            solver.solve(&problem).unwrap(),
            "{}",
            solver.name()
        );
    }
}

#[test]
fn recorded_order_does_not_change_the_cost() {
    let problem = generate(InstanceShape::dense(2, 8, 3), 3);
    let solution = DpSolver::new().solve(&problem).unwrap();

    let mut triples: Vec<_> = solution
        .routes()
        .flat_map(|(op, route)| route.iter().map(move |(&sub, &city)| (op, sub, city)))
        .collect();
    triples.reverse();
    let reversed: Solution = triples.into_iter().collect();

    assert_eq!(
        evaluate(&problem, &reversed).unwrap(),
        evaluate(&problem, &solution).unwrap()
    );
}

#[test]
fn random_routes_cover_every_sub_operation_with_allowed_cities() {
    let problem = generate(InstanceShape::sparse(3, 10, 5), 11);
    let solution = RandomSolver::new().with_seed(5).solve(&problem).unwrap();
    assert_eq!(solution.num_assignments(), problem.num_sub_operations());
    for (operation, route) in solution.routes() {
        for (&sub, &city) in route {
            assert_eq!(problem.operation_of(sub), operation);
            assert!(problem.processing_cost(sub, city).is_finite());
        }
    }

    let dense = generate(InstanceShape::dense(3, 10, 5), 11);
    let dp = evaluate(&dense, &DpSolver::new().solve(&dense).unwrap()).unwrap();
    for seed in 0..5 {
        let solution = RandomSolver::new().with_seed(seed).solve(&dense).unwrap();
        assert!(evaluate(&dense, &solution).unwrap() >= dp - 1e-9);
    }
}

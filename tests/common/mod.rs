// Seeded instance generator shared by the integration tests

#![allow(dead_code)]

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use siteopt::Problem;

/// Shape of a generated instance.
#[derive(Debug, Clone, Copy)]
pub struct InstanceShape {
    pub operations: usize,
    pub sub_operations: usize,
    pub cities: usize,
    /// Chance that a processing time or an inter-city distance is infinite.
    /// City 0 always accepts every sub-operation, so every instance stays
    /// solvable by keeping an operation in one place.
    pub forbidden: f64,
}

impl InstanceShape {
    pub fn dense(operations: usize, sub_operations: usize, cities: usize) -> Self {
        Self {
            operations,
            sub_operations,
            cities,
            forbidden: 0.0,
        }
    }

    pub fn sparse(operations: usize, sub_operations: usize, cities: usize) -> Self {
        Self {
            forbidden: 0.3,
            ..Self::dense(operations, sub_operations, cities)
        }
    }
}

fn labels(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

pub fn generate(shape: InstanceShape, seed: u64) -> Problem {
    let mut rng = StdRng::seed_from_u64(seed);
    let InstanceShape {
        operations: n_ops,
        sub_operations: n_sub,
        cities: n_cities,
        forbidden,
    } = shape;
    assert!(n_sub >= n_ops, "every operation needs a sub-operation");

    // The first `n_ops` sub-operations seed one operation each
    let mut membership = Array2::<u8>::zeros((n_sub, n_ops));
    for i in 0..n_sub {
        let k = if i < n_ops { i } else { rng.random_range(0..n_ops) };
        membership[[i, k]] = 1;
    }

    let mut distances = Array2::<f64>::zeros((n_cities, n_cities));
    for a in 0..n_cities {
        for b in (a + 1)..n_cities {
            let d = if rng.random_bool(forbidden) {
                f64::INFINITY
            } else {
                rng.random_range(1.0..20.0)
            };
            distances[[a, b]] = d;
            distances[[b, a]] = d;
        }
    }

    let times = Array2::from_shape_fn((n_sub, n_cities), |(_, j)| {
        if j > 0 && rng.random_bool(forbidden) {
            f64::INFINITY
        } else {
            rng.random_range(1.0..10.0)
        }
    });
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let costs = Array2::from_shape_fn((n_sub, n_cities), |_| rng.random_range(0.5..3.0));
    let productivity = Array1::from_shape_fn(n_cities, |_| rng.random_range(0.5..2.0));

    Problem::new(
        labels("op", n_ops),
        labels("sub", n_sub),
        labels("city", n_cities),
        membership,
        distances,
        times,
        costs,
        productivity,
        0.3,
    )
    .expect("generated instance is valid")
}

/// The worked example: one operation, two sub-operations, two cities.
pub fn two_city_chain() -> Problem {
    Problem::new(
        labels("op", 1),
        labels("sub", 2),
        labels("city", 2),
        ndarray::arr2(&[[1], [1]]),
        ndarray::arr2(&[[0.0, 2.0], [2.0, 0.0]]),
        ndarray::arr2(&[[1.0, 5.0], [5.0, 1.0]]),
        Array2::ones((2, 2)),
        ndarray::arr1(&[1.0, 1.0]),
        1.0,
    )
    .expect("worked example is valid")
}

pub fn assert_close(a: f64, b: f64) {
    let scale = a.abs().max(b.abs()).max(1.0);
    assert!((a - b).abs() <= 1e-6 * scale, "{a} != {b}");
}

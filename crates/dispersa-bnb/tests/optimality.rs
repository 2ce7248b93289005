// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use dispersa_bnb::{
    bnb::{self, BnbSolver},
    branching::{BranchingStrategy, first_fail::FirstFailBuilder, input_order::InputOrderBuilder},
    monitor::no_op::NoOperationMonitor,
    parallel::ParallelSolver,
    result::SolverResult,
};
use dispersa_model::{
    bounds::{BoundSemantics, PairBounds},
    error::ConfigError,
    index::PointIndex,
    model::{DispersionModel, DispersionModelBuilder},
    space::MetricSpace,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

type IntegerType = i64;

/// Best objective over every ordered placement of distinct points.
fn brute_force(model: &DispersionModel<IntegerType>) -> Option<IntegerType> {
    fn recurse(
        model: &DispersionModel<IntegerType>,
        placement: &mut Vec<PointIndex>,
        best: &mut Option<IntegerType>,
    ) {
        if placement.len() == model.num_facilities() {
            if let Some(value) = model.evaluate(placement) {
                *best = Some(best.map_or(value, |b| b.max(value)));
            }
            return;
        }
        for point in (0..model.num_points()).map(PointIndex::new) {
            if placement.contains(&point) {
                continue;
            }
            placement.push(point);
            recurse(model, placement, best);
            placement.pop();
        }
    }

    let mut best = None;
    recurse(model, &mut Vec::with_capacity(model.num_facilities()), &mut best);
    best
}

fn grid_model(size: usize, p: usize) -> DispersionModel<IntegerType> {
    let space = MetricSpace::grid(size).unwrap();
    DispersionModelBuilder::from_space(&space, p).build().unwrap()
}

#[test]
fn test_three_by_three_two_facilities() {
    let model = grid_model(3, 2);
    let outcome = bnb::solve(&model);
    assert!(outcome.is_optimal());

    let solution = outcome.solution().unwrap();
    assert_eq!(solution.objective_value(), 4);
    // Only opposite corners are 4 apart on a 3x3 grid.
    let mut corners: Vec<usize> = solution.facilities().iter().map(|p| p.get()).collect();
    corners.sort_unstable();
    assert!(corners == vec![0, 8] || corners == vec![2, 6]);
}

#[test]
fn test_every_point_used() {
    let model = grid_model(2, 4);
    let outcome = bnb::solve(&model);
    assert!(outcome.is_optimal());
    let solution = outcome.solution().unwrap();
    assert_eq!(solution.objective_value(), 1);
    assert!(solution.is_distinct());
}

#[test]
fn test_too_many_facilities_is_a_config_error() {
    let space = MetricSpace::<IntegerType>::grid(2).unwrap();
    let err = DispersionModelBuilder::from_space(&space, 5).build().unwrap_err();
    assert_eq!(
        err,
        ConfigError::TooManyFacilities {
            requested: 5,
            available: 4
        }
    );
}

#[test]
fn test_builders_and_solvers_agree_on_grids() {
    for size in 2..=4 {
        for p in 1..=(size * size).min(5) {
            let model = grid_model(size, p);
            let expected = brute_force(&model);

            let mut solver = BnbSolver::preallocated(model.num_points(), p);
            let mut input_order = InputOrderBuilder::new();
            let a = solver.solve(&model, &mut input_order, NoOperationMonitor::new());
            let mut first_fail = FirstFailBuilder::preallocated(model.num_points(), p);
            let b = solver.solve(&model, &mut first_fail, NoOperationMonitor::new());
            let c = ParallelSolver::builder()
                .with_threads(2)
                .with_branching(BranchingStrategy::InputOrder)
                .build()
                .solve(&model);

            for outcome in [&a, &b, &c] {
                assert!(outcome.is_optimal(), "size {} p {}", size, p);
                assert_eq!(
                    outcome.solution().map(|s| s.objective_value()),
                    expected,
                    "size {} p {}",
                    size,
                    p
                );
            }
        }
    }
}

#[test]
fn test_seeded_bounds_match_brute_force() {
    let space = MetricSpace::<IntegerType>::grid(3).unwrap();
    for seed in 0..20u64 {
        for semantics in [BoundSemantics::Exclusive, BoundSemantics::Inclusive] {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let bounds = PairBounds::random(3, space.max_distance(), semantics, &mut rng).unwrap();
            let model = DispersionModelBuilder::from_space(&space, 3)
                .with_bounds(bounds)
                .build()
                .unwrap();

            let outcome = bnb::solve(&model);
            match brute_force(&model) {
                Some(best) => {
                    assert!(outcome.is_optimal(), "seed {} {}", seed, semantics);
                    let solution = outcome.solution().unwrap();
                    assert_eq!(solution.objective_value(), best, "seed {} {}", seed, semantics);
                    assert_eq!(model.evaluate(solution.facilities()), Some(best));
                }
                None => assert_eq!(outcome.result(), &SolverResult::Infeasible),
            }
        }
    }
}

fn point_set() -> impl Strategy<Value = (Vec<(i64, i64)>, usize)> {
    prop::collection::vec((0i64..6, 0i64..6), 2..=7)
        .prop_flat_map(|points| {
            let n = points.len();
            (Just(points), 1..=n.min(3))
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_optimum_matches_brute_force((points, p) in point_set()) {
        let space = MetricSpace::<IntegerType>::from_points(points).unwrap();
        let model = DispersionModelBuilder::from_space(&space, p).build().unwrap();

        let outcome = bnb::solve(&model);
        prop_assert!(outcome.is_optimal());
        let solution = outcome.solution().unwrap();
        prop_assert_eq!(Some(solution.objective_value()), brute_force(&model));
        prop_assert_eq!(model.evaluate(solution.facilities()), Some(solution.objective_value()));
    }

    #[test]
    fn prop_bounded_optimum_matches_brute_force(
        (points, p) in point_set(),
        seed in any::<u64>(),
        inclusive in any::<bool>(),
    ) {
        let space = MetricSpace::<IntegerType>::from_points(points).unwrap();
        let semantics = if inclusive { BoundSemantics::Inclusive } else { BoundSemantics::Exclusive };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let bounds = PairBounds::random(p, space.max_distance(), semantics, &mut rng);
        prop_assume!(bounds.is_ok());

        let model = DispersionModelBuilder::from_space(&space, p)
            .with_optional_bounds(bounds.ok())
            .build()
            .unwrap();

        let outcome = bnb::solve(&model);
        match brute_force(&model) {
            Some(best) => {
                prop_assert!(outcome.is_optimal());
                prop_assert_eq!(outcome.solution().map(|s| s.objective_value()), Some(best));
            }
            None => prop_assert_eq!(outcome.result(), &SolverResult::Infeasible),
        }
    }
}

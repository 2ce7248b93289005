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

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dispersa_bnb::{
    bnb::BnbSolver,
    branching::{first_fail::FirstFailBuilder, input_order::InputOrderBuilder},
    monitor::no_op::NoOperationMonitor,
};
use dispersa_model::{
    bounds::{BoundSemantics, PairBounds},
    model::{DispersionModel, DispersionModelBuilder},
    space::MetricSpace,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

const INSTANCES: [(usize, usize); 4] = [(3, 3), (4, 4), (5, 4), (5, 5)];

fn grid_model(size: usize, p: usize, seed: Option<u64>) -> DispersionModel<i64> {
    let space = MetricSpace::grid(size).unwrap_or_else(|e| panic!("grid {}: {}", size, e));
    let bounds = seed.map(|seed| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        PairBounds::random(p, space.max_distance(), BoundSemantics::Exclusive, &mut rng)
            .unwrap_or_else(|e| panic!("bounds for grid {}: {}", size, e))
    });
    DispersionModelBuilder::from_space(&space, p)
        .with_optional_bounds(bounds)
        .build()
        .unwrap_or_else(|e| panic!("model {}x{} p={}: {}", size, size, p, e))
}

fn bench_grids(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_benchmark");

    for (size, p) in INSTANCES {
        let model = grid_model(size, p, None);
        let label = format!("{}x{}-p{}", size, size, p);
        let mut solver = BnbSolver::preallocated(model.num_points(), p);

        group.throughput(Throughput::Elements(model.num_points() as u64));

        group.bench_with_input(BenchmarkId::new("first_fail", &label), &model, |b, model| {
            let mut builder = FirstFailBuilder::preallocated(model.num_points(), p);
            b.iter(|| {
                let outcome = solver.solve(
                    black_box(model),
                    &mut builder,
                    NoOperationMonitor::new(),
                );
                assert!(outcome.is_optimal());
            })
        });

        group.bench_with_input(BenchmarkId::new("input_order", &label), &model, |b, model| {
            let mut builder = InputOrderBuilder::preallocated(model.num_points());
            b.iter(|| {
                let outcome = solver.solve(
                    black_box(model),
                    &mut builder,
                    NoOperationMonitor::new(),
                );
                assert!(outcome.is_optimal());
            })
        });
    }

    group.finish();
}

fn bench_bounded_grids(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_grid_benchmark");

    for (size, p) in INSTANCES {
        let model = grid_model(size, p, Some(42));
        let label = format!("{}x{}-p{}", size, size, p);
        let mut solver = BnbSolver::preallocated(model.num_points(), p);
        let mut builder = FirstFailBuilder::preallocated(model.num_points(), p);

        group.bench_with_input(BenchmarkId::new("first_fail", &label), &model, |b, model| {
            b.iter(|| {
                let outcome = solver.solve(
                    black_box(model),
                    &mut builder,
                    NoOperationMonitor::new(),
                );
                black_box(outcome.solution().map(|s| s.objective_value()))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_grids, bench_bounded_grids);
criterion_main!(benches);

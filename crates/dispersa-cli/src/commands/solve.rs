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

use crate::{
    cli::SolveArgs,
    error::{CliError, Result},
    report,
};
use dispersa_bnb::{
    bnb::BnbSolver,
    branching::BranchingStrategy,
    monitor::{
        composite::CompositeTreeSearchMonitor, log::LogTreeSearchMonitor,
        time_limit::TimeLimitMonitor,
    },
    parallel::ParallelSolver,
    result::BnbSolverOutcome,
};
use dispersa_model::{
    bounds::{BoundSemantics, PairBounds},
    loading::PointSetLoader,
    model::{DispersionModel, DispersionModelBuilder},
    space::MetricSpace,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::{
    io::Write,
    time::{Duration, Instant},
};
use tracing::{debug, info};

type DistanceType = i64;

pub fn run(args: SolveArgs) -> Result<()> {
    let time_limit = parse_time_limit(args.time_limit)?;
    let space = load_space(&args)?;
    let bounds = generate_bounds(&args, &space)?;
    let model = DispersionModelBuilder::from_space(&space, args.facilities)
        .with_optional_bounds(bounds)
        .with_symmetry_breaking(!args.no_symmetry_breaking)
        .build()?;
    debug!("{}", model);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Some(size) = args.source.size {
        report::write_grid_points(&mut out, &space, size)?;
    }
    report::write_candidates(&mut out, &space)?;
    report::write_facility_variables(&mut out, &model)?;
    report::write_distance_matrix(&mut out, &space)?;
    if let Some(bounds) = model.bounds() {
        report::write_bounds(&mut out, bounds)?;
    }

    writeln!(out)?;
    writeln!(out, "CALL THE SOLVER...")?;
    out.flush()?;

    let strategy = BranchingStrategy::from(args.branching);
    let start_time = Instant::now();
    let outcome = solve_model(&model, strategy, args.threads, time_limit);
    let elapsed = start_time.elapsed();
    info!(result = %outcome, elapsed = ?elapsed, "solve finished");

    report::write_outcome(&mut out, &space, &outcome, elapsed)?;
    writeln!(out)?;
    write!(out, "{}", outcome.statistics())?;
    out.flush()?;

    Ok(())
}

fn parse_time_limit(seconds: Option<f64>) -> Result<Option<Duration>> {
    seconds
        .map(|s| {
            Duration::try_from_secs_f64(s)
                .map_err(|e| CliError::Argument(format!("time limit {}: {}", s, e)))
        })
        .transpose()
}

fn load_space(args: &SolveArgs) -> Result<MetricSpace<DistanceType>> {
    match (&args.source.size, &args.source.points) {
        (Some(size), _) => {
            info!(size, "building grid point set");
            Ok(MetricSpace::grid(*size)?)
        }
        (None, Some(path)) => {
            info!(path = %path.display(), "loading point set");
            PointSetLoader::new()
                .from_path(path)
                .map_err(|source| CliError::PointSet {
                    path: path.clone(),
                    source,
                })
        }
        (None, None) => Err(CliError::Argument(
            "either --size or --points is required".to_string(),
        )),
    }
}

fn generate_bounds(
    args: &SolveArgs,
    space: &MetricSpace<DistanceType>,
) -> Result<Option<PairBounds<DistanceType>>> {
    if !args.bounded {
        return Ok(None);
    }

    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    let semantics = if args.inclusive_bounds {
        BoundSemantics::Inclusive
    } else {
        BoundSemantics::Exclusive
    };
    info!(seed, %semantics, "drawing random pair bounds");

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let bounds = PairBounds::random(args.facilities, space.max_distance(), semantics, &mut rng)?;
    Ok(Some(bounds))
}

fn solve_model(
    model: &DispersionModel<DistanceType>,
    strategy: BranchingStrategy,
    threads: usize,
    time_limit: Option<Duration>,
) -> BnbSolverOutcome<DistanceType> {
    if threads > 1 {
        info!(threads, %strategy, "starting parallel search");
        return ParallelSolver::builder()
            .with_threads(threads)
            .with_branching(strategy)
            .with_optional_time_limit(time_limit)
            .build()
            .solve(model);
    }

    info!(%strategy, "starting sequential search");
    let mut monitor = CompositeTreeSearchMonitor::with_capacity(2);
    if let Some(limit) = time_limit {
        monitor.add_monitor(TimeLimitMonitor::new(limit));
    }
    monitor.add_monitor(LogTreeSearchMonitor::default());

    let mut solver = BnbSolver::preallocated(model.num_points(), model.num_facilities());
    let mut builder = strategy.builder();
    solver.solve(model, &mut builder, monitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{BranchingArg, PointSource};
    use std::path::PathBuf;

    fn args(size: usize, facilities: usize) -> SolveArgs {
        SolveArgs {
            source: PointSource {
                size: Some(size),
                points: None,
            },
            facilities,
            bounded: false,
            seed: None,
            inclusive_bounds: false,
            branching: BranchingArg::FirstFail,
            no_symmetry_breaking: false,
            time_limit: None,
            threads: 1,
        }
    }

    #[test]
    fn test_time_limit_parsing() {
        assert_eq!(parse_time_limit(None).unwrap(), None);
        assert_eq!(
            parse_time_limit(Some(1.5)).unwrap(),
            Some(Duration::from_millis(1500))
        );
        assert!(matches!(parse_time_limit(Some(-1.0)), Err(CliError::Argument(_))));
    }

    #[test]
    fn test_seeded_bounds_are_reproducible() {
        let space = MetricSpace::grid(4).unwrap();
        let mut a = args(4, 3);
        a.bounded = true;
        a.seed = Some(11);
        let first = generate_bounds(&a, &space).unwrap().unwrap();
        let second = generate_bounds(&a, &space).unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.semantics(), BoundSemantics::Exclusive);

        a.inclusive_bounds = true;
        let inclusive = generate_bounds(&a, &space).unwrap().unwrap();
        assert_eq!(inclusive.semantics(), BoundSemantics::Inclusive);
        assert!(generate_bounds(&args(4, 3), &space).unwrap().is_none());
    }

    #[test]
    fn test_bounds_need_a_large_enough_space() {
        let space = MetricSpace::grid(2).unwrap();
        let mut a = args(2, 2);
        a.bounded = true;
        a.seed = Some(0);
        assert!(matches!(generate_bounds(&a, &space), Err(CliError::Config(_))));
    }

    #[test]
    fn test_missing_point_file() {
        let mut a = args(3, 2);
        a.source = PointSource {
            size: None,
            points: Some(PathBuf::from("/nonexistent/points.txt")),
        };
        assert!(matches!(load_space(&a), Err(CliError::PointSet { .. })));
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let space = MetricSpace::grid(4).unwrap();
        let model = DispersionModelBuilder::from_space(&space, 4).build().unwrap();
        let sequential = solve_model(&model, BranchingStrategy::FirstFail, 1, None);
        let parallel = solve_model(&model, BranchingStrategy::InputOrder, 3, None);
        assert!(sequential.is_optimal());
        assert!(parallel.is_optimal());
        assert_eq!(
            sequential.solution().map(|s| s.objective_value()),
            parallel.solution().map(|s| s.objective_value())
        );
    }

    #[test]
    fn test_too_many_facilities_is_rejected() {
        let err = run(args(2, 5)).unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(dispersa_model::error::ConfigError::TooManyFacilities {
                requested: 5,
                available: 4,
            })
        ));
        assert_eq!(err.exit_code(), std::process::ExitCode::from(2));
    }
}

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

use clap::{Args, Parser, Subcommand, ValueEnum};
use dispersa_bnb::branching::BranchingStrategy;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Dispersa - places p facilities on candidate points so that the smallest pairwise Manhattan distance is as large as possible.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve a p-dispersion instance to optimality and print the report.
    Solve(SolveArgs),
}

/// Where the candidate points come from.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct PointSource {
    /// Side length of a square grid of candidate points.
    #[arg(short, long, value_name = "N")]
    pub size: Option<usize>,

    /// Path to a point set file (`N D` header followed by coordinates).
    #[arg(long, value_name = "PATH")]
    pub points: Option<PathBuf>,
}

/// Arguments for the `solve` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    #[command(flatten)]
    pub source: PointSource,

    /// Number of facilities to place.
    #[arg(short = 'p', long, value_name = "P")]
    pub facilities: usize,

    /// Draw random lower and upper distance bounds for every facility pair.
    #[arg(short, long)]
    pub bounded: bool,

    /// Seed for the bound generator. A random seed is used if omitted.
    #[arg(long, value_name = "SEED", requires = "bounded")]
    pub seed: Option<u64>,

    /// Treat bound ends as admissible distances (`lower <= d <= upper`).
    #[arg(long, requires = "bounded")]
    pub inclusive_bounds: bool,

    /// Variable selection heuristic.
    #[arg(long, value_enum, default_value_t = BranchingArg::FirstFail)]
    pub branching: BranchingArg,

    /// Do not order facility variables to break label symmetry.
    #[arg(long)]
    pub no_symmetry_breaking: bool,

    /// Wall-clock budget in seconds. The best placement so far is reported
    /// when it runs out.
    #[arg(short, long, value_name = "SECS")]
    pub time_limit: Option<f64>,

    /// Number of search threads. A single thread searches sequentially.
    #[arg(short = 'j', long, value_name = "NUM", default_value_t = 1)]
    pub threads: usize,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchingArg {
    /// Branch on facilities in index order.
    InputOrder,
    /// Branch on the facility with the smallest domain.
    FirstFail,
}

impl From<BranchingArg> for BranchingStrategy {
    fn from(arg: BranchingArg) -> Self {
        match arg {
            BranchingArg::InputOrder => BranchingStrategy::InputOrder,
            BranchingArg::FirstFail => BranchingStrategy::FirstFail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("dispersa").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_minimal_grid_invocation() {
        let cli = parse(&["solve", "--size", "5", "--facilities", "4"]).unwrap();
        let Commands::Solve(args) = cli.command;
        assert_eq!(args.source.size, Some(5));
        assert_eq!(args.source.points, None);
        assert_eq!(args.facilities, 4);
        assert!(!args.bounded);
        assert_eq!(args.branching, BranchingArg::FirstFail);
        assert_eq!(args.threads, 1);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_bounded_with_seed_and_options() {
        let cli = parse(&[
            "-vv",
            "solve",
            "-s",
            "3",
            "-p",
            "3",
            "--bounded",
            "--seed",
            "7",
            "--inclusive-bounds",
            "--branching",
            "input-order",
            "--time-limit",
            "2.5",
            "-j",
            "4",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Solve(args) = cli.command;
        assert!(args.bounded);
        assert_eq!(args.seed, Some(7));
        assert!(args.inclusive_bounds);
        assert_eq!(BranchingStrategy::from(args.branching), BranchingStrategy::InputOrder);
        assert_eq!(args.time_limit, Some(2.5));
        assert_eq!(args.threads, 4);
    }

    #[test]
    fn test_rejects_conflicting_sources() {
        assert!(parse(&["solve", "--size", "3", "--points", "a.txt", "-p", "2"]).is_err());
        assert!(parse(&["solve", "-p", "2"]).is_err());
    }

    #[test]
    fn test_seed_requires_bounded() {
        assert!(parse(&["solve", "--size", "3", "-p", "2", "--seed", "1"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(parse(&["-q", "-v", "solve", "--size", "3", "-p", "2"]).is_err());
    }
}

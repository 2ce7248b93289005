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

//! Plain-text report printed around a solve.
//!
//! Every function writes to any `io::Write`, so the report can be rendered
//! into a buffer as easily as onto stdout.

use dispersa_bnb::result::{BnbSolverOutcome, SolverResult, TerminationReason};
use dispersa_model::{
    bounds::PairBounds, model::DispersionModel, num::DistanceNumeric, space::MetricSpace,
};
use std::{io::Write, time::Duration};

/// Prints the points of a `size x size` grid, one grid row per line.
pub fn write_grid_points<T, W>(w: &mut W, space: &MetricSpace<T>, size: usize) -> std::io::Result<()>
where
    T: DistanceNumeric,
    W: Write,
{
    writeln!(w, "GRID POINTS:")?;
    for row in space.points().chunks(size.max(1)) {
        let line: Vec<String> = row.iter().map(ToString::to_string).collect();
        writeln!(w, "{}", line.join(" "))?;
    }
    writeln!(w)
}

pub fn write_candidates<T, W>(w: &mut W, space: &MetricSpace<T>) -> std::io::Result<()>
where
    T: DistanceNumeric,
    W: Write,
{
    writeln!(w, "CANDIDATE FACILITY LOCATIONS P ARE: {}", space.num_points())?;
    for (index, point) in space.points().iter().enumerate() {
        writeln!(w, "{:2}: {}", index, point)?;
    }
    Ok(())
}

pub fn write_facility_variables<T, W>(w: &mut W, model: &DispersionModel<T>) -> std::io::Result<()>
where
    T: DistanceNumeric,
    W: Write,
{
    writeln!(w)?;
    writeln!(w, "FACILITY VARIABLES F:")?;
    for variable in model.facility_variables() {
        writeln!(w, "{}", model.variable(variable))?;
    }
    Ok(())
}

pub fn write_distance_matrix<T, W>(w: &mut W, space: &MetricSpace<T>) -> std::io::Result<()>
where
    T: DistanceNumeric,
    W: Write,
{
    writeln!(w)?;
    writeln!(w, "DISTANCE MATRIX D (Manhattan distances):")?;
    write!(w, "{}", space.distances())
}

/// Prints both bound tables, tab separated, diagonal included.
pub fn write_bounds<T, W>(w: &mut W, bounds: &PairBounds<T>) -> std::io::Result<()>
where
    T: DistanceNumeric,
    W: Write,
{
    let p = bounds.num_facilities();

    writeln!(w)?;
    writeln!(w, "LOWER DISTANCE BOUNDS ({}):", bounds.semantics())?;
    for i in 0..p {
        write_row(w, bounds.lower_row(i))?;
    }

    writeln!(w)?;
    writeln!(w, "UPPER DISTANCE BOUNDS ({}):", bounds.semantics())?;
    for i in 0..p {
        write_row(w, bounds.upper_row(i))?;
    }
    Ok(())
}

fn write_row<T, W>(w: &mut W, row: &[T]) -> std::io::Result<()>
where
    T: DistanceNumeric,
    W: Write,
{
    for value in row {
        write!(w, "{}\t", value)?;
    }
    writeln!(w)
}

/// Prints the placement, or why there is none, followed by the elapsed time.
pub fn write_outcome<T, W>(
    w: &mut W,
    space: &MetricSpace<T>,
    outcome: &BnbSolverOutcome<T>,
    elapsed: Duration,
) -> std::io::Result<()>
where
    T: DistanceNumeric,
    W: Write,
{
    writeln!(w)?;
    match outcome.result() {
        SolverResult::Optimal(solution) | SolverResult::Feasible(solution) => {
            if matches!(outcome.result(), SolverResult::Optimal(_)) {
                writeln!(w, "OPTIMAL FACILITY LOCATIONS - FINAL SOLUTION:")?;
            } else {
                writeln!(w, "BEST FACILITY LOCATIONS FOUND (OPTIMALITY NOT PROVEN):")?;
            }
            for (facility, &point) in solution.facilities().iter().enumerate() {
                writeln!(w, "FACILITY {}: {}", facility, space.point(point))?;
            }
            writeln!(w, "MAXIMIZED DISTANCE: {}", solution.objective_value())?;
        }
        SolverResult::Infeasible | SolverResult::Unknown => {
            writeln!(w, "NO SOLUTION FOUND")?;
        }
    }
    if let TerminationReason::Aborted(reason) = outcome.termination_reason() {
        writeln!(w, "SEARCH STOPPED: {}", reason)?;
    }
    writeln!(w, "TIME TAKEN: {:.3} seconds", elapsed.as_secs_f64())
}

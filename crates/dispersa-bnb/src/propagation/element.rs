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
    propagation::{PropagationContext, PropagationResult, Propagator},
    state::SearchState,
};
use dispersa_model::{index::VariableIndex, num::DistanceNumeric, space::DistanceMatrix};
use fixedbitset::FixedBitSet;
use std::sync::Arc;

/// `result = table[row * n + col]` over a square lookup table.
///
/// One pass enumerates every `(a, b)` in `D(row) x D(col)` whose entry lies in
/// `D(result)` and marks `a`, `b` and the entry as supported. Everything left
/// unmarked is removed. Each kept value still has the tuple that marked it,
/// so a single pass reaches arc consistency for the three variables.
///
/// Removing from `row` and `col` is the reverse direction: a lower bound on a
/// pair distance prunes candidate points that have no partner far enough away.
#[derive(Debug, Clone)]
pub struct ElementPropagator {
    scope: [VariableIndex; 3],
    table: Arc<[usize]>,
    num_points: usize,
}

impl ElementPropagator {
    /// Creates the propagator over a table shared with sibling propagators.
    #[inline]
    pub fn new(
        row: VariableIndex,
        col: VariableIndex,
        result: VariableIndex,
        table: Arc<[usize]>,
        num_points: usize,
    ) -> Self {
        debug_assert_eq!(
            table.len(),
            num_points * num_points,
            "called `ElementPropagator::new` with a table that is not {}x{}",
            num_points,
            num_points
        );
        Self {
            scope: [row, col, result],
            table,
            num_points,
        }
    }

    /// Converts a distance matrix into the shared lookup table.
    pub fn table_from<T>(distances: &DistanceMatrix<T>) -> Arc<[usize]>
    where
        T: DistanceNumeric,
    {
        distances
            .as_slice()
            .iter()
            .map(|d| d.to_usize().unwrap_or(0))
            .collect()
    }

    #[inline]
    fn row(&self) -> VariableIndex {
        self.scope[0]
    }

    #[inline]
    fn col(&self) -> VariableIndex {
        self.scope[1]
    }

    #[inline]
    fn result(&self) -> VariableIndex {
        self.scope[2]
    }
}

impl Propagator for ElementPropagator {
    fn name(&self) -> &str {
        "Element"
    }

    fn scope(&self) -> &[VariableIndex] {
        &self.scope
    }

    fn propagate(&self, ctx: &mut PropagationContext<'_>) -> PropagationResult {
        let (row, col, result) = (self.row(), self.col(), self.result());
        let n = self.num_points;

        let mut row_support = FixedBitSet::with_capacity(n);
        let mut col_support = FixedBitSet::with_capacity(n);
        let mut result_support = FixedBitSet::with_capacity(ctx.domain(result).capacity());

        {
            let rows = ctx.domain(row);
            let cols = ctx.domain(col);
            let results = ctx.domain(result);
            for a in rows.iter() {
                let line = &self.table[a * n..(a + 1) * n];
                for b in cols.iter() {
                    let entry = line[b];
                    if results.contains(entry) {
                        row_support.insert(a);
                        col_support.insert(b);
                        result_support.insert(entry);
                    }
                }
            }
        }

        ctx.retain(row, |a| row_support.contains(a))?;
        ctx.retain(col, |b| col_support.contains(b))?;
        ctx.retain(result, |v| result_support.contains(v))?;
        Ok(())
    }

    fn is_satisfied(&self, state: &SearchState) -> bool {
        match (
            state.domain(self.row()).value(),
            state.domain(self.col()).value(),
            state.domain(self.result()).value(),
        ) {
            (Some(a), Some(b), Some(v)) => self.table[a * self.num_points + b] == v,
            _ => false,
        }
    }
}

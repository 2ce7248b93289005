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
    propagation::{Inconsistency, PropagationContext, PropagationResult, Propagator, fixed_values},
    state::SearchState,
};
use dispersa_model::index::VariableIndex;
use fixedbitset::FixedBitSet;

/// Pairwise distinctness over a set of variables.
///
/// Filtering runs in two stages until neither changes anything:
/// 1. Value elimination: a fixed variable's value is removed from every other
///    variable in the scope.
/// 2. Pigeonhole check: if the unfixed variables share fewer values than
///    there are unfixed variables, no distinct completion exists.
///
/// The pigeonhole check also proves infeasibility at the root when more
/// variables than values are posted.
#[derive(Debug, Clone)]
pub struct AllDifferentPropagator {
    variables: Vec<VariableIndex>,
}

impl AllDifferentPropagator {
    #[inline]
    pub fn new(variables: Vec<VariableIndex>) -> Self {
        Self { variables }
    }
}

impl Propagator for AllDifferentPropagator {
    fn name(&self) -> &str {
        "AllDifferent"
    }

    fn scope(&self) -> &[VariableIndex] {
        &self.variables
    }

    fn propagate(&self, ctx: &mut PropagationContext<'_>) -> PropagationResult {
        let mut processed = FixedBitSet::with_capacity(self.variables.len());

        loop {
            let mut changed = false;

            for (i, &x) in self.variables.iter().enumerate() {
                if processed.contains(i) {
                    continue;
                }
                let Some(value) = ctx.domain(x).value() else {
                    continue;
                };
                processed.insert(i);

                for (j, &y) in self.variables.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    if ctx.domain(y).contains(value) {
                        ctx.remove(y, value)?;
                        changed = true;
                    }
                }
            }

            if !changed {
                break;
            }
        }

        let mut union = FixedBitSet::new();
        let mut unfixed = 0usize;
        let mut witness = None;
        for &x in &self.variables {
            let domain = ctx.domain(x);
            if domain.is_fixed() {
                continue;
            }
            unfixed += 1;
            witness = Some(x);
            if union.len() < domain.capacity() {
                union.grow(domain.capacity());
            }
            union.union_with(domain.as_bitset());
        }

        if let Some(variable) = witness
            && union.count_ones(..) < unfixed
        {
            return Err(Inconsistency { variable });
        }

        Ok(())
    }

    fn is_satisfied(&self, state: &SearchState) -> bool {
        let Some(mut values) = fixed_values(state, &self.variables) else {
            return false;
        };
        values.sort_unstable();
        values.windows(2).all(|w| w[0] != w[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::test_support::Harness;
    use dispersa_model::{
        model::{DispersionModel, DispersionModelBuilder},
        space::MetricSpace,
    };

    fn model(size: usize, p: usize) -> DispersionModel<i64> {
        let space = MetricSpace::grid(size).unwrap();
        DispersionModelBuilder::from_space(&space, p)
            .with_symmetry_breaking(false)
            .build()
            .unwrap()
    }

    fn vars(n: usize) -> Vec<VariableIndex> {
        (0..n).map(VariableIndex::new).collect()
    }

    #[test]
    fn test_fixed_value_is_removed_from_others() {
        let m = model(2, 3);
        let mut h = Harness::new(&m);
        let prop = AllDifferentPropagator::new(vars(3));
        {
            let mut ctx = h.ctx();
            ctx.assign(VariableIndex::new(0), 2).unwrap();
            prop.propagate(&mut ctx).unwrap();
        }
        assert!(!h.state.domain(VariableIndex::new(1)).contains(2));
        assert!(!h.state.domain(VariableIndex::new(2)).contains(2));
    }

    #[test]
    fn test_chained_elimination() {
        let m = model(2, 3);
        let mut h = Harness::new(&m);
        let prop = AllDifferentPropagator::new(vars(3));
        {
            let mut ctx = h.ctx();
            ctx.assign(VariableIndex::new(0), 0).unwrap();
            ctx.retain(VariableIndex::new(1), |v| v <= 1).unwrap();
            ctx.retain(VariableIndex::new(2), |v| v <= 2).unwrap();
            prop.propagate(&mut ctx).unwrap();
        }
        assert_eq!(h.state.domain(VariableIndex::new(1)).value(), Some(1));
        assert_eq!(h.state.domain(VariableIndex::new(2)).value(), Some(2));
        assert!(prop.is_satisfied(&h.state));
    }

    #[test]
    fn test_pigeonhole_failure() {
        let m = model(2, 3);
        let mut h = Harness::new(&m);
        let prop = AllDifferentPropagator::new(vars(3));
        let mut ctx = h.ctx();
        for x in 0..3 {
            ctx.retain(VariableIndex::new(x), |v| v <= 1).unwrap();
        }
        assert!(prop.propagate(&mut ctx).is_err());
    }

    #[test]
    fn test_conflicting_fixed_values_fail() {
        let m = model(2, 2);
        let mut h = Harness::new(&m);
        let prop = AllDifferentPropagator::new(vars(2));
        let mut ctx = h.ctx();
        ctx.assign(VariableIndex::new(0), 3).unwrap();
        ctx.assign(VariableIndex::new(1), 3).unwrap();
        assert!(prop.propagate(&mut ctx).is_err());
    }

    #[test]
    fn test_is_satisfied_requires_fixed_scope() {
        let m = model(2, 2);
        let h = Harness::new(&m);
        let prop = AllDifferentPropagator::new(vars(2));
        assert!(!prop.is_satisfied(&h.state));
        assert_eq!(prop.scope().len(), 2);
    }
}

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
use dispersa_model::index::VariableIndex;

/// Bounds reasoning for `lhs + offset <= rhs`.
///
/// `max(lhs) <= max(rhs) - offset` and `min(rhs) >= min(lhs) + offset`. One
/// pass reaches the fixpoint because neither update moves the bound the other
/// one reads.
#[derive(Debug, Clone)]
pub struct LinearInequalityPropagator {
    scope: [VariableIndex; 2],
    offset: i64,
}

impl LinearInequalityPropagator {
    #[inline]
    pub fn new(lhs: VariableIndex, rhs: VariableIndex, offset: i64) -> Self {
        Self {
            scope: [lhs, rhs],
            offset,
        }
    }
}

impl Propagator for LinearInequalityPropagator {
    fn name(&self) -> &str {
        "LinearInequality"
    }

    fn scope(&self) -> &[VariableIndex] {
        &self.scope
    }

    fn propagate(&self, ctx: &mut PropagationContext<'_>) -> PropagationResult {
        let [lhs, rhs] = self.scope;

        let rhs_max = ctx.domain(rhs).max() as i64;
        let lhs_cap = rhs_max - self.offset;
        if lhs_cap < 0 {
            ctx.retain(lhs, |_| false)?;
        } else {
            ctx.remove_above(lhs, lhs_cap as usize)?;
        }

        let rhs_floor = ctx.domain(lhs).min() as i64 + self.offset;
        if rhs_floor > 0 {
            ctx.remove_below(rhs, rhs_floor as usize)?;
        }
        Ok(())
    }

    fn is_satisfied(&self, state: &SearchState) -> bool {
        let [lhs, rhs] = self.scope;
        match (state.domain(lhs).value(), state.domain(rhs).value()) {
            (Some(a), Some(b)) => a as i64 + self.offset <= b as i64,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::test_support::Harness;
    use dispersa_model::{model::DispersionModelBuilder, space::MetricSpace};

    fn harness() -> Harness {
        let space = MetricSpace::<i64>::grid(3).unwrap();
        let model = DispersionModelBuilder::from_space(&space, 2)
            .with_symmetry_breaking(false)
            .build()
            .unwrap();
        Harness::new(&model)
    }

    fn var(i: usize) -> VariableIndex {
        VariableIndex::new(i)
    }

    #[test]
    fn test_strict_order_between_facilities() {
        let mut h = harness();
        let prop = LinearInequalityPropagator::new(var(0), var(1), 1);
        prop.propagate(&mut h.ctx()).unwrap();
        assert_eq!(h.state.domain(var(0)).to_string(), "[0..7]");
        assert_eq!(h.state.domain(var(1)).to_string(), "[1..8]");
    }

    #[test]
    fn test_objective_capped_by_distance() {
        let mut h = harness();
        // B is variable 3, d_0_1 is variable 2
        let prop = LinearInequalityPropagator::new(var(3), var(2), 0);
        {
            let mut ctx = h.ctx();
            ctx.remove_above(var(2), 2).unwrap();
            prop.propagate(&mut ctx).unwrap();
        }
        assert_eq!(h.state.domain(var(3)).max(), 2);

        {
            let mut ctx = h.ctx();
            ctx.remove_below(var(3), 2).unwrap();
            prop.propagate(&mut ctx).unwrap();
        }
        assert_eq!(h.state.domain(var(2)).value(), Some(2));
        assert!(prop.is_satisfied(&h.state));
    }

    #[test]
    fn test_infeasible_order_fails() {
        let mut h = harness();
        let prop = LinearInequalityPropagator::new(var(0), var(1), 1);
        let mut ctx = h.ctx();
        ctx.assign(var(0), 5).unwrap();
        ctx.assign(var(1), 5).unwrap();
        assert!(prop.propagate(&mut ctx).is_err());
    }
}

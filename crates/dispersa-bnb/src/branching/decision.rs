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

use crate::state::SearchState;
use dispersa_model::{index::VariableIndex, model::DispersionModel, num::DistanceNumeric};
use std::iter::FusedIterator;

/// A branching decision: fix `variable` to `value`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decision {
    variable: VariableIndex,
    value: usize,
}

impl Decision {
    #[inline]
    pub fn new(variable: VariableIndex, value: usize) -> Self {
        Self { variable, value }
    }

    /// Returns the variable this decision fixes.
    #[inline]
    pub fn variable(&self) -> VariableIndex {
        self.variable
    }

    /// Returns the value the variable is fixed to.
    #[inline]
    pub fn value(&self) -> usize {
        self.value
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Decision({} = {})", self.variable, self.value)
    }
}

/// Produces the children of a search node.
///
/// A builder picks one unfixed facility variable and yields one decision per
/// value it may still take. The search stack is LIFO, so the decision yielded
/// last is explored first. Builders must yield nothing only when every
/// facility variable is fixed.
pub trait DecisionBuilder<T>
where
    T: DistanceNumeric,
{
    type DecisionIterator<'a>: Iterator<Item = Decision> + FusedIterator + 'a
    where
        Self: 'a,
        T: 'a;

    fn name(&self) -> &str;

    fn next_decision<'a>(
        &'a mut self,
        model: &'a DispersionModel<T>,
        state: &'a SearchState,
    ) -> Self::DecisionIterator<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_and_display() {
        let d = Decision::new(VariableIndex::new(2), 7);
        assert_eq!(d.variable(), VariableIndex::new(2));
        assert_eq!(d.value(), 7);
        assert_eq!(d.to_string(), "Decision(VariableIndex(2) = 7)");
    }

    #[test]
    fn test_ordering_is_by_variable_then_value() {
        let a = Decision::new(VariableIndex::new(0), 9);
        let b = Decision::new(VariableIndex::new(1), 0);
        let c = Decision::new(VariableIndex::new(1), 3);
        assert!(a < b);
        assert!(b < c);
    }
}

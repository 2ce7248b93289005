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
use dispersa_model::index::VariableIndex;

/// A single value removal that can be undone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TrailEntry {
    variable: VariableIndex,
    value: usize,
}

impl TrailEntry {
    #[inline]
    pub fn variable(&self) -> VariableIndex {
        self.variable
    }

    #[inline]
    pub fn value(&self) -> usize {
        self.value
    }
}

impl std::fmt::Display for TrailEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TrailEntry({}, value: {})", self.variable, self.value)
    }
}

/// Undo log for domain reductions.
///
/// Every removal made during search is appended to `entries`. `frames` marks
/// where each search level begins, so backtracking one level re-inserts the
/// removals of that level in reverse order and truncates the log. The cost
/// of a backtrack is linear in the number of removals it undoes.
#[derive(Clone, Debug, Default)]
pub struct SearchTrail {
    entries: Vec<TrailEntry>,
    frames: Vec<usize>,
}

impl SearchTrail {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a trail sized for a model with `num_variables` variables
    /// whose largest domain holds `max_domain_size` values.
    #[inline]
    pub fn preallocated(num_variables: usize, max_domain_size: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_variables.saturating_mul(max_domain_size)),
            frames: Vec::with_capacity(num_variables.saturating_add(1)),
        }
    }

    /// Ensures capacity for the given model size.
    #[inline]
    pub fn ensure_capacity(&mut self, num_variables: usize, max_domain_size: usize) {
        let entry_capacity = num_variables.saturating_mul(max_domain_size);
        let frame_capacity = num_variables.saturating_add(1);
        if self.entries.capacity() < entry_capacity {
            self.entries.reserve(entry_capacity - self.entries.len());
        }
        if self.frames.capacity() < frame_capacity {
            self.frames.reserve(frame_capacity - self.frames.len());
        }
    }

    /// Number of open frames.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.frames.is_empty()
    }

    /// Opens a new level. Removals from now on are undone by the next `backtrack`.
    #[inline]
    pub fn push_frame(&mut self) {
        self.frames.push(self.entries.len());
    }

    /// Removes `value` from the domain of `variable` and records it.
    ///
    /// Returns `true` if the value was present.
    #[inline]
    pub fn remove_value(
        &mut self,
        state: &mut SearchState,
        variable: VariableIndex,
        value: usize,
    ) -> bool {
        debug_assert!(
            !self.frames.is_empty(),
            "called `SearchTrail::remove_value` without an open frame"
        );
        let removed = state.domain_mut(variable).remove(value);
        if removed {
            self.entries.push(TrailEntry { variable, value });
        }
        removed
    }

    /// Undoes every removal of the innermost frame and closes it.
    ///
    /// Returns `false` if no frame was open.
    pub fn backtrack(&mut self, state: &mut SearchState) -> bool {
        let Some(start) = self.frames.pop() else {
            return false;
        };
        for entry in self.entries[start..].iter().rev() {
            state.domain_mut(entry.variable).restore(entry.value);
        }
        self.entries.truncate(start);
        true
    }

    /// Clears all entries and frames, keeping allocated capacity.
    #[inline]
    pub fn reset(&mut self) {
        self.entries.clear();
        self.frames.clear();
    }

    /// Returns the allocated memory in bytes.
    #[inline]
    pub fn allocated_memory_bytes(&self) -> usize {
        self.entries.capacity() * std::mem::size_of::<TrailEntry>()
            + self.frames.capacity() * std::mem::size_of::<usize>()
    }
}

impl std::fmt::Display for SearchTrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchTrail(entries: {}, frames: {})",
            self.entries.len(),
            self.frames.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispersa_model::{model::DispersionModelBuilder, space::MetricSpace};

    fn state() -> SearchState {
        let space = MetricSpace::<i64>::grid(2).unwrap();
        let model = DispersionModelBuilder::from_space(&space, 2).build().unwrap();
        SearchState::new(&model)
    }

    fn var(i: usize) -> VariableIndex {
        VariableIndex::new(i)
    }

    #[test]
    fn test_backtrack_restores_each_frame() {
        let mut s = state();
        let root = s.clone();
        let mut trail = SearchTrail::new();

        trail.push_frame();
        assert!(trail.remove_value(&mut s, var(0), 0));
        assert!(!trail.remove_value(&mut s, var(0), 0));
        let after_first = s.clone();

        trail.push_frame();
        assert!(trail.remove_value(&mut s, var(0), 1));
        assert!(trail.remove_value(&mut s, var(1), 3));
        assert_eq!(trail.num_entries(), 3);
        assert_eq!(trail.depth(), 2);

        assert!(trail.backtrack(&mut s));
        assert_eq!(s, after_first);
        assert_eq!(trail.num_entries(), 1);

        assert!(trail.backtrack(&mut s));
        assert_eq!(s, root);
        assert!(trail.is_empty());
        assert!(!trail.backtrack(&mut s));
    }

    #[test]
    fn test_backtrack_restores_emptied_domain() {
        let mut s = state();
        let root = s.clone();
        let mut trail = SearchTrail::new();
        trail.push_frame();
        for v in 0..4 {
            trail.remove_value(&mut s, var(1), v);
        }
        assert!(s.domain(var(1)).is_empty());
        trail.backtrack(&mut s);
        assert_eq!(s, root);
    }

    #[test]
    fn test_capacity_and_reset() {
        let mut trail = SearchTrail::preallocated(4, 9);
        assert!(trail.allocated_memory_bytes() > 0);
        let before = trail.allocated_memory_bytes();
        trail.ensure_capacity(2, 2);
        assert_eq!(trail.allocated_memory_bytes(), before);
        trail.ensure_capacity(40, 90);
        assert!(trail.allocated_memory_bytes() >= before);

        let mut s = state();
        trail.push_frame();
        trail.remove_value(&mut s, var(0), 2);
        trail.reset();
        assert!(trail.is_empty());
        assert_eq!(trail.to_string(), "SearchTrail(entries: 0, frames: 0)");
    }
}

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

//! Dispersa-BnB: constraint branch-and-bound for p-dispersion
//!
//! Solves a `dispersa_model::model::DispersionModel<T>` to proven optimality by
//! depth-first search over integer domains, with constraint propagation at
//! every node and an objective cut that tightens as better placements appear.
//!
//! Core flow
//! - Build a model with `dispersa_model`.
//! - Choose a `branching::DecisionBuilder` (or a `branching::BranchingStrategy`).
//! - Optionally add monitors, fixed assignments and a shared incumbent.
//! - Run `bnb::BnbSolver` directly, or `parallel::ParallelSolver` on threads.
//!
//! Design highlights
//! - Domains are bitsets; every removal is recorded on a frame-based trail and
//!   undone in LIFO order on backtrack.
//! - Propagators are woken through watch lists and run to a fixpoint.
//! - The objective cut `B >= best + 1` is applied before propagation, so a
//!   dominated subtree fails inside the fixpoint rather than after it.
//! - Deterministic for a fixed builder and a single thread.
//!
//! Module map
//! - `bnb`: the solver engine and its search session.
//! - `branching`: decision builders (input order, first fail).
//! - `domain`: bitset domains.
//! - `fixed`: fixed assignments for pinning facilities.
//! - `incumbent`: the thread-safe best-so-far.
//! - `monitor`: tree-search monitors (log, limits, composite).
//! - `parallel`: root splitting across worker threads.
//! - `propagation`: propagators and the fixpoint engine.
//! - `result`: solver outcomes with termination reasons.
//! - `stack`: the LIFO decision stack with per-level frames.
//! - `state`: the domains of the current node.
//! - `stats`: counters and timing.
//! - `trail`: undo log for domain changes.

pub mod bnb;
pub mod branching;
pub mod domain;
pub mod fixed;
pub mod incumbent;
pub mod monitor;
pub mod parallel;
pub mod propagation;
pub mod result;
pub mod stack;
pub mod state;
pub mod stats;
pub mod trail;

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

//! Dispersa-Model: data model for the p-dispersion problem
//!
//! This crate holds everything the search engine consumes but never mutates:
//! candidate point sets with their Manhattan distance matrix, optional pairwise
//! distance bounds, and the declarative constraint model built on top of them.
//!
//! Core flow
//! - Build a `space::MetricSpace<T>` from a square grid or explicit points
//!   (or load one with `loading::PointSetLoader`).
//! - Optionally generate `bounds::PairBounds<T>` from a seeded RNG.
//! - Assemble a `model::DispersionModel<T>` with `model::DispersionModelBuilder`.
//! - Hand the model to a solver; results come back as `solution::Solution<T>`.
//!
//! Design highlights
//! - Distances live in a flat row-major buffer, so `D[i][j]` is `D[i * n + j]`.
//! - The model is immutable once built; constraints are plain data.
//! - All validation happens at construction time and surfaces as `ConfigError`.
//!
//! Module map
//! - `bounds`: pairwise distance bounds and their strictness.
//! - `error`: configuration errors.
//! - `index`: typed indices for points, facilities and model variables.
//! - `loading`: text loader for point sets.
//! - `model`: the declarative dispersion model and its builder.
//! - `num`: numeric trait alias for distance types.
//! - `solution`: facility assignments with their objective.
//! - `space`: points, the distance matrix and the metric space.

pub mod bounds;
pub mod error;
pub mod index;
pub mod loading;
pub mod model;
pub mod num;
pub mod solution;
pub mod space;

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

//! Point set loader.
//!
//! Turns whitespace-delimited text into a validated `MetricSpace`. The format
//! is a header with the number of points and their dimension, followed by one
//! coordinate tuple per point:
//!
//! ```raw
//! N D
//! x_1_1 ... x_1_D
//! ...
//! x_N_1 ... x_N_D
//! ```
//!
//! Line breaks carry no meaning beyond separating tokens, and `#` starts a
//! comment that runs to the end of the line. Any `BufRead`, reader, file path
//! or string slice can serve as input.

use crate::{
    error::ConfigError,
    num::DistanceNumeric,
    space::{MetricSpace, Point},
};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};
use thiserror::Error;

/// Upper bound on the capacity reserved from header counts.
const MAX_PREALLOCATED: usize = 4096;

/// Errors raised while loading a point set.
#[derive(Debug, Error)]
pub enum PointSetLoaderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected end of input while parsing point set")]
    UnexpectedEof,
    #[error("could not parse token '{token}' as {type_name}")]
    Parse {
        token: String,
        type_name: &'static str,
    },
    #[error("point count and dimension must be positive integers")]
    InvalidDimensions,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Loader for point sets in the `N D` + coordinates format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointSetLoader;

impl PointSetLoader {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Loads a metric space from a type implementing `BufRead`.
    pub fn from_bufread<T, R>(&self, rdr: R) -> Result<MetricSpace<T>, PointSetLoaderError>
    where
        T: DistanceNumeric,
        R: BufRead,
    {
        let mut sc = Scanner::new(rdr);

        let n: usize = sc.next()?;
        let dimension: usize = sc.next()?;
        if n == 0 || dimension == 0 {
            return Err(PointSetLoaderError::InvalidDimensions);
        }

        // Header counts are untrusted until the rows actually arrive.
        let mut points = Vec::with_capacity(n.min(MAX_PREALLOCATED));
        let mut coordinates = Vec::with_capacity(dimension.min(MAX_PREALLOCATED));
        for _ in 0..n {
            coordinates.clear();
            for _ in 0..dimension {
                coordinates.push(sc.next::<i64>()?);
            }
            points.push(Point::new(coordinates.iter().copied()));
        }

        let space = MetricSpace::from_points(points)?;
        tracing::debug!(
            points = space.num_points(),
            dimension,
            "loaded point set"
        );
        Ok(space)
    }

    /// Loads a metric space from a file path.
    #[inline]
    pub fn from_path<T, P>(&self, path: P) -> Result<MetricSpace<T>, PointSetLoaderError>
    where
        T: DistanceNumeric,
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    /// Loads a metric space from a generic reader.
    #[inline]
    pub fn from_reader<T, R>(&self, r: R) -> Result<MetricSpace<T>, PointSetLoaderError>
    where
        T: DistanceNumeric,
        R: Read,
    {
        self.from_bufread(BufReader::new(r))
    }

    /// Loads a metric space from a string slice.
    #[inline]
    pub fn from_str<T>(&self, s: &str) -> Result<MetricSpace<T>, PointSetLoaderError>
    where
        T: DistanceNumeric,
    {
        self.from_bufread(s.as_bytes())
    }
}

/// Reads whitespace-delimited tokens line by line, skipping `#` comments.
struct Scanner<R> {
    rdr: R,
    buf: String,
    pos: usize,
}

impl<R: BufRead> Scanner<R> {
    #[inline]
    fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            pos: 0,
        }
    }

    /// Refills the line buffer. Returns `Ok(false)` on EOF.
    #[inline]
    fn fill_line(&mut self) -> Result<bool, PointSetLoaderError> {
        self.buf.clear();
        self.pos = 0;
        let n = self.rdr.read_line(&mut self.buf)?;
        Ok(n > 0)
    }

    fn next<T>(&mut self) -> Result<T, PointSetLoaderError>
    where
        T: FromStr,
    {
        loop {
            if self.pos >= self.buf.len() && !self.fill_line()? {
                return Err(PointSetLoaderError::UnexpectedEof);
            }

            let line = &self.buf[self.pos..];
            let content = match line.find('#') {
                Some(hash) => &line[..hash],
                None => line,
            };

            let Some(start) = content.find(|c: char| !c.is_whitespace()) else {
                self.pos = self.buf.len();
                continue;
            };
            let rest = &content[start..];
            let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let token = &rest[..len];

            let parsed = token.parse::<T>().map_err(|_| PointSetLoaderError::Parse {
                token: token.to_owned(),
                type_name: std::any::type_name::<T>(),
            });
            self.pos += start + len;
            return parsed;
        }
    }
}

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

use dispersa_model::{error::ConfigError, loading::PointSetLoaderError};
use std::{path::PathBuf, process::ExitCode};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to load point set '{path}': {source}", path = path.display())]
    PointSet {
        path: PathBuf,
        #[source]
        source: PointSetLoaderError,
    },

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code: 2 for rejected input, 1 for everything else.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Config(_) | CliError::PointSet { .. } | CliError::Argument(_) => {
                ExitCode::from(2)
            }
            CliError::Logging(_) | CliError::Io(_) => ExitCode::FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_exit_with_two() {
        let err = CliError::from(ConfigError::NoFacilities);
        assert_eq!(err.exit_code(), ExitCode::from(2));
        assert_eq!(
            err.to_string(),
            "Configuration error: number of facilities must be positive"
        );
    }

    #[test]
    fn test_point_set_error_names_the_file() {
        let err = CliError::PointSet {
            path: PathBuf::from("points.txt"),
            source: PointSetLoaderError::UnexpectedEof,
        };
        assert_eq!(err.exit_code(), ExitCode::from(2));
        assert!(err.to_string().contains("points.txt"));
    }

    #[test]
    fn test_io_error_is_a_failure() {
        let err = CliError::from(std::io::Error::other("broken pipe"));
        assert_eq!(err.exit_code(), ExitCode::FAILURE);
    }
}

// Copyright (c) The retest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by retest-runner.

use crate::testng::{ConfigFailurePolicy, ParallelMode};
use camino::Utf8PathBuf;
use retest_classfile::errors::ClassFileError;
use thiserror::Error;

/// An error that occurred while scanning a compiled test class for
/// dependent tests.
///
/// Scan errors are recoverable by design: expansion logs them and falls
/// back to retrying only the tests that actually failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClassScanError {
    /// Reading the compiled class from disk failed.
    #[error("failed to read compiled class `{path}`: {error}")]
    Read {
        /// Path to the compiled class.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The compiled class could not be parsed.
    #[error("failed to parse compiled class `{path}`: {error}")]
    Parse {
        /// Path to the compiled class.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: ClassFileError,
    },
}

/// Error returned while parsing a [`ParallelMode`] value from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized value for parallel mode: {input}\n(known values: {})",
    ParallelMode::variants().join(", "),
)]
pub struct ParallelModeParseError {
    input: String,
}

impl ParallelModeParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Error returned while parsing a [`ConfigFailurePolicy`] value from a
/// string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized value for configuration failure policy: {input}\n(known values: {})",
    ConfigFailurePolicy::variants().join(", "),
)]
pub struct ConfigFailurePolicyParseError {
    input: String,
}

impl ConfigFailurePolicyParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

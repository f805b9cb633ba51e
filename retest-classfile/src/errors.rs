// Copyright (c) The retest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by retest-classfile.

use thiserror::Error;

/// An error that occurred while parsing a compiled class.
///
/// Callers in the retry engine treat this as a recoverable condition:
/// a class that cannot be scanned contributes no dependency information,
/// and only the originally failed test is retried.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum ClassFileError {
    /// The input does not start with the class-file magic number.
    #[error("not a class file: expected magic 0xCAFEBABE, found {found:#010x}")]
    Magic {
        /// The first four bytes of the input, if present.
        found: u32,
    },

    /// The class-file structure could not be parsed.
    #[error("malformed class file at offset {offset}")]
    Malformed {
        /// Byte offset at which parsing failed.
        offset: usize,
    },
}

impl ClassFileError {
    pub(crate) fn magic(found: u32) -> Self {
        Self::Magic { found }
    }

    pub(crate) fn malformed(offset: usize) -> Self {
        Self::Malformed { offset }
    }
}

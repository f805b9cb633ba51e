// Copyright (c) The retest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural scanning of compiled JVM test classes for retest.
//!
//! TestNG lets a test method declare, by name, the methods it depends on.
//! When one of those methods fails, every test downstream of it is skipped,
//! so a retry that re-runs only the failed method would leave the skipped
//! tests unexecuted. This crate reads a compiled class without loading or
//! executing it and answers the one question the retry engine asks: which
//! methods in this class must re-run because a given method failed?
//!
//! The entry point is [`ClassDependencies`]: parse the raw bytes of a
//! `.class` file with [`ClassDependencies::parse`], then query transitive
//! dependents with [`ClassDependencies::dependents_of`].

mod dependencies;
pub mod errors;
mod parser;

#[cfg(any(test, feature = "internal-testing"))]
pub mod test_builder;

pub use dependencies::ClassDependencies;

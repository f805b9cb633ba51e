// Copyright (c) The retest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core retry-construction logic for retest.
//!
//! After a test run finishes with failures, the surrounding build step asks
//! this crate to construct the retry: discard pseudo-failures produced by
//! framework lifecycle machinery, expand the real failures with every test
//! that statically depends on them, and produce an inclusion filter plus a
//! mirrored copy of the original run configuration, so the retry differs
//! from the original in test selection and nothing else. Executing the
//! retry, counting attempts, and reconciling results stay with the caller.
//!
//! Framework-specific behavior lives behind
//! [`FrameworkStrategy`](strategy::FrameworkStrategy); TestNG support is in
//! [`testng`].

pub mod errors;
pub mod retry_filter;
pub mod strategy;
pub mod test_name;
pub mod testng;

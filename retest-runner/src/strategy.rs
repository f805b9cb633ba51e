// Copyright (c) The retest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The seam between the retry engine and individual test frameworks.
//!
//! Each supported framework implements [`FrameworkStrategy`]. Picking the
//! strategy that applies to a given run is the caller's concern; this crate
//! only defines the capabilities a strategy provides.

use crate::{
    retry_filter::RetryFilter,
    test_name::{TestDescriptor, TestName},
};
use camino::Utf8PathBuf;
use std::collections::HashSet;

/// Borrowed inputs describing the test run that just finished.
#[derive(Clone, Copy, Debug)]
pub struct TestExecutionSpec<'a, O> {
    /// Candidate directories holding the run's compiled test classes.
    pub test_classes_dirs: &'a [Utf8PathBuf],
    /// The original run's framework options.
    pub options: &'a O,
}

/// A fully configured retry run: what to select, and how to run it.
///
/// Handed back to the orchestration loop, which executes it and interprets
/// the results.
#[derive(Clone, Debug)]
pub struct RetryRun<O> {
    /// Inclusion filter selecting the tests to re-execute.
    pub filter: RetryFilter,
    /// Framework options mirrored from the original run.
    pub options: O,
}

/// One test framework's retry capabilities.
pub trait FrameworkStrategy {
    /// The framework's run-configuration surface.
    type Options;

    /// Removes failure records that are artifacts of the framework's
    /// lifecycle machinery rather than real test failures.
    ///
    /// Applied once per reported failing descriptor, before the failed set
    /// is expanded. A no-op when the set holds no such record.
    fn filter_synthetic_failures(
        &self,
        failed_tests: &mut HashSet<TestName>,
        descriptor: &TestDescriptor<'_>,
    );

    /// Builds the retry run for a set of failed tests.
    ///
    /// Expands the failures with every test that statically depends on
    /// them, converts the expansion into an inclusion filter, and mirrors
    /// the original run's options onto the retry's.
    fn build_retry_run(
        &self,
        spec: &TestExecutionSpec<'_, Self::Options>,
        failed_tests: &HashSet<TestName>,
    ) -> RetryRun<Self::Options>;
}

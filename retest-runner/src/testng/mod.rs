// Copyright (c) The retest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TestNG support: synthetic-failure filtering and retry-run construction.
//!
//! TestNG reports two things no other part of the engine has to deal with:
//! configuration-method failures surfaced as a pseudo-test named
//! [`LIFECYCLE_METHOD_NAME`], and data-driven invocations whose reported
//! name carries a parameter rendering. Both are normalized here while the
//! failed set is turned into a [`RetryRun`].

mod expansion;
mod options;

pub use options::{ConfigFailurePolicy, ParallelMode, TestNgOptions};

use crate::{
    retry_filter::RetryFilter,
    strategy::{FrameworkStrategy, RetryRun, TestExecutionSpec},
    test_name::{TestDescriptor, TestName},
};
use regex::Regex;
use std::{collections::HashSet, sync::LazyLock};

/// Method name under which TestNG surfaces a configuration-method failure,
/// as if a test by that name had run and failed.
pub const LIFECYCLE_METHOD_NAME: &str = "lifecycle";

/// Retry support for TestNG-based test runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct TestNgStrategy;

impl FrameworkStrategy for TestNgStrategy {
    type Options = TestNgOptions;

    fn filter_synthetic_failures(
        &self,
        failed_tests: &mut HashSet<TestName>,
        descriptor: &TestDescriptor<'_>,
    ) {
        // A setup or teardown failure is reported as a pseudo-test named for
        // the lifecycle phase; there is no such method to retry.
        failed_tests.remove(&TestName::new(descriptor.class_name, LIFECYCLE_METHOD_NAME));
    }

    fn build_retry_run(
        &self,
        spec: &TestExecutionSpec<'_, TestNgOptions>,
        failed_tests: &HashSet<TestName>,
    ) -> RetryRun<TestNgOptions> {
        let mut filter = RetryFilter::new();
        for retried_test in expansion::retries_with_dependents(spec, failed_tests) {
            match retried_test.method_name() {
                Some(method_name) if method_name != LIFECYCLE_METHOD_NAME => {
                    // The stripped rule retries every parameter permutation
                    // of the logical test; the reported name is kept as well
                    // in case the executing filter matches exactly.
                    filter.include_test(
                        retried_test.class_name(),
                        strip_parameter_suffix(method_name),
                    );
                    filter.include_test(retried_test.class_name(), method_name);
                }
                _ => filter.include_class(retried_test.class_name()),
            }
        }

        let mut options = TestNgOptions::default();
        options.mirror_from(spec.options);
        RetryRun { filter, options }
    }
}

static PARAMETER_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^)]+\](\([^)]+\))+$").expect("parameter suffix regex is valid")
});

/// Strips the parameter rendering TestNG appends to data-driven test names.
///
/// An invocation of `foo` with parameters renders as `foo[permutation](args)`,
/// with one or more of each trailing group; the bare logical name is what a
/// retry must select. Names without the rendering pass through unchanged,
/// and stripping twice equals stripping once.
fn strip_parameter_suffix(method_name: &str) -> &str {
    match PARAMETER_SUFFIX.find(method_name) {
        Some(suffix) => &method_name[..suffix.start()],
        None => method_name,
    }
}

// Copyright (c) The retest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expansion of failed tests into the set that must be retried.
//!
//! A failed test drags along every test in its class that statically
//! declares a dependency on it: those tests were skipped by the framework
//! when the dependency failed, so a retry of the failed method alone would
//! leave them unexecuted and the merged result incomplete.

use crate::{errors::ClassScanError, strategy::TestExecutionSpec, test_name::TestName};
use camino::{Utf8Path, Utf8PathBuf};
use retest_classfile::ClassDependencies;
use smol_str::SmolStr;
use std::collections::{BTreeSet, HashSet};
use tracing::warn;

/// Expands the failed set with every dependent test.
///
/// The result may contain duplicates when failed tests in one class share a
/// dependent; downstream filter insertion is idempotent, so they are left
/// in. Ordering carries no meaning.
pub(super) fn retries_with_dependents<O>(
    spec: &TestExecutionSpec<'_, O>,
    failed_tests: &HashSet<TestName>,
) -> Vec<TestName> {
    failed_tests
        .iter()
        .flat_map(|failed_test| expand_failed_test(spec.test_classes_dirs, failed_test))
        .collect()
}

fn expand_failed_test(test_classes_dirs: &[Utf8PathBuf], failed_test: &TestName) -> Vec<TestName> {
    let Some(method_name) = failed_test.method_name() else {
        return vec![TestName::class_level(failed_test.class_name())];
    };
    if method_name == super::LIFECYCLE_METHOD_NAME {
        // Configuration machinery failed; no single method can be blamed,
        // so the whole class is retried.
        return vec![TestName::class_level(failed_test.class_name())];
    }

    let mut retries = vec![failed_test.clone()];
    let Some(class_file) = find_class_file(test_classes_dirs, failed_test.class_name()) else {
        // No compiled artifact to scan; retry just the failed test.
        return retries;
    };
    match scan_dependents(&class_file, method_name) {
        Ok(dependents) => {
            retries.extend(
                dependents
                    .into_iter()
                    .map(|dependent| TestName::new(failed_test.class_name(), dependent)),
            );
        }
        Err(error) => {
            // Losing dependency information must not fail the build: an
            // under-scoped retry is recoverable, an aborted one is not.
            warn!(
                "unable to determine if class `{}` has dependent tests, retrying only the failed test: {error}",
                failed_test.class_name(),
            );
        }
    }
    retries
}

/// Probes the candidate directories for the class's compiled form. The
/// first hit wins.
fn find_class_file(test_classes_dirs: &[Utf8PathBuf], class_name: &str) -> Option<Utf8PathBuf> {
    let relative = format!("{}.class", class_name.replace('.', "/"));
    test_classes_dirs
        .iter()
        .map(|dir| dir.join(&relative))
        .find(|candidate| candidate.is_file())
}

fn scan_dependents(
    class_file: &Utf8Path,
    method_name: &str,
) -> Result<BTreeSet<SmolStr>, ClassScanError> {
    let bytes = std::fs::read(class_file).map_err(|error| ClassScanError::Read {
        path: class_file.to_owned(),
        error,
    })?;
    let dependencies = ClassDependencies::parse(&bytes).map_err(|error| ClassScanError::Parse {
        path: class_file.to_owned(),
        error,
    })?;
    Ok(dependencies.dependents_of(method_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;

    #[test]
    fn first_directory_with_the_class_wins() {
        let first = Utf8TempDir::new().unwrap();
        let second = Utf8TempDir::new().unwrap();
        let relative = "com/acme/PayTest.class";
        std::fs::create_dir_all(second.path().join("com/acme")).unwrap();
        std::fs::write(second.path().join(relative), b"irrelevant").unwrap();

        let dirs = vec![first.path().to_owned(), second.path().to_owned()];
        let found = find_class_file(&dirs, "com.acme.PayTest").unwrap();
        assert_eq!(found, second.path().join(relative));
    }

    #[test]
    fn missing_class_is_not_found() {
        let dir = Utf8TempDir::new().unwrap();
        let dirs = vec![dir.path().to_owned()];
        assert_eq!(find_class_file(&dirs, "com.acme.Absent"), None);
    }

    #[test]
    fn lifecycle_failures_expand_to_the_whole_class() {
        let expanded = expand_failed_test(&[], &TestName::class_level("com.acme.SuiteTest"));
        assert_eq!(expanded, [TestName::class_level("com.acme.SuiteTest")]);

        let expanded = expand_failed_test(
            &[],
            &TestName::new("com.acme.SuiteTest", super::super::LIFECYCLE_METHOD_NAME),
        );
        assert_eq!(expanded, [TestName::class_level("com.acme.SuiteTest")]);
    }

    #[test]
    fn unlocatable_class_expands_to_the_failed_test_alone() {
        let failed = TestName::new("com.acme.PayTest", "charge");
        assert_eq!(expand_failed_test(&[], &failed), [failed.clone()]);
    }
}

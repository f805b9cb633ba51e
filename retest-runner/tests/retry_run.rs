// Copyright (c) The retest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end retry construction over compiled classes on disk.

use camino::Utf8Path;
use camino_tempfile::Utf8TempDir;
use pretty_assertions::assert_eq;
use retest_classfile::test_builder::TestClassBuilder;
use retest_runner::{
    strategy::{FrameworkStrategy, TestExecutionSpec},
    test_name::{TestDescriptor, TestName},
    testng::{self, ConfigFailurePolicy, ParallelMode, TestNgOptions, TestNgStrategy},
};
use std::collections::HashSet;

fn write_class(dir: &Utf8Path, class_name: &str, bytes: &[u8]) {
    let path = dir.join(format!("{}.class", class_name.replace('.', "/")));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, bytes).unwrap();
}

fn included_tests(retry: &retest_runner::strategy::RetryRun<TestNgOptions>) -> Vec<(String, String)> {
    retry
        .filter
        .included_tests()
        .map(|(class_name, method_name)| (class_name.to_owned(), method_name.to_owned()))
        .collect()
}

#[test]
fn failures_without_dependents_retry_all_permutations() {
    let dir = Utf8TempDir::new().unwrap();
    let bytes = TestClassBuilder::new("com.acme.Pay")
        .plain_method("<init>")
        .method("testX", &[])
        .method("testY", &[])
        .build();
    write_class(dir.path(), "com.acme.Pay", &bytes);

    let options = TestNgOptions::default();
    let dirs = vec![dir.path().to_owned()];
    let spec = TestExecutionSpec {
        test_classes_dirs: &dirs,
        options: &options,
    };
    let failed = HashSet::from([
        TestName::new("com.acme.Pay", "testX"),
        TestName::new("com.acme.Pay", "testY[2](3)"),
    ]);
    let retry = TestNgStrategy.build_retry_run(&spec, &failed);

    assert_eq!(
        included_tests(&retry),
        [
            ("com.acme.Pay".to_owned(), "testX".to_owned()),
            ("com.acme.Pay".to_owned(), "testY".to_owned()),
            ("com.acme.Pay".to_owned(), "testY[2](3)".to_owned()),
        ]
    );
    assert_eq!(retry.filter.included_classes().count(), 0);
}

#[test]
fn dependent_tests_are_dragged_into_the_retry() {
    let empty = Utf8TempDir::new().unwrap();
    let dir = Utf8TempDir::new().unwrap();
    let bytes = TestClassBuilder::new("com.acme.CheckoutTest")
        .method("connect", &[])
        .method("login", &["connect"])
        .method("checkout", &["login"])
        .build();
    write_class(dir.path(), "com.acme.CheckoutTest", &bytes);

    let options = TestNgOptions::default();
    // The first directory has no compiled classes; probing moves on.
    let dirs = vec![empty.path().to_owned(), dir.path().to_owned()];
    let spec = TestExecutionSpec {
        test_classes_dirs: &dirs,
        options: &options,
    };
    let failed = HashSet::from([TestName::new("com.acme.CheckoutTest", "connect")]);
    let retry = TestNgStrategy.build_retry_run(&spec, &failed);

    assert_eq!(
        included_tests(&retry),
        [
            ("com.acme.CheckoutTest".to_owned(), "checkout".to_owned()),
            ("com.acme.CheckoutTest".to_owned(), "connect".to_owned()),
            ("com.acme.CheckoutTest".to_owned(), "login".to_owned()),
        ]
    );
}

#[test]
fn lifecycle_failure_retries_the_entire_class() {
    let options = TestNgOptions::default();
    let spec = TestExecutionSpec {
        test_classes_dirs: &[],
        options: &options,
    };
    let failed = HashSet::from([TestName::new("com.acme.Suite", testng::LIFECYCLE_METHOD_NAME)]);
    let retry = TestNgStrategy.build_retry_run(&spec, &failed);

    let classes: Vec<&str> = retry.filter.included_classes().collect();
    assert_eq!(classes, ["com.acme.Suite"]);
    assert_eq!(retry.filter.included_tests().count(), 0);
    assert!(retry.filter.matches("com.acme.Suite", "anyMethodAtAll"));
}

#[test]
fn corrupt_class_file_degrades_to_the_failed_test() {
    let dir = Utf8TempDir::new().unwrap();
    write_class(dir.path(), "com.acme.Broken", b"\xCA\xFE\xBA\xBEtruncated");

    let options = TestNgOptions::default();
    let dirs = vec![dir.path().to_owned()];
    let spec = TestExecutionSpec {
        test_classes_dirs: &dirs,
        options: &options,
    };
    let failed = HashSet::from([TestName::new("com.acme.Broken", "flaky")]);
    let retry = TestNgStrategy.build_retry_run(&spec, &failed);

    assert_eq!(
        included_tests(&retry),
        [("com.acme.Broken".to_owned(), "flaky".to_owned())]
    );
}

#[test]
fn synthetic_failures_never_reach_the_filter() {
    let options = TestNgOptions::default();
    let spec = TestExecutionSpec {
        test_classes_dirs: &[],
        options: &options,
    };
    let mut failed = HashSet::from([
        TestName::new("com.acme.Suite", testng::LIFECYCLE_METHOD_NAME),
        TestName::new("com.acme.Suite", "survives"),
    ]);
    let descriptor = TestDescriptor {
        class_name: "com.acme.Suite",
        method_name: Some(testng::LIFECYCLE_METHOD_NAME),
    };
    TestNgStrategy.filter_synthetic_failures(&mut failed, &descriptor);
    let retry = TestNgStrategy.build_retry_run(&spec, &failed);

    assert_eq!(retry.filter.included_classes().count(), 0);
    assert_eq!(
        included_tests(&retry),
        [("com.acme.Suite".to_owned(), "survives".to_owned())]
    );
}

#[test]
fn retry_options_mirror_the_original_run() {
    let options = TestNgOptions {
        output_directory: Some("build/reports/testng".into()),
        include_groups: ["smoke".to_owned()].into_iter().collect(),
        exclude_groups: ["slow".to_owned()].into_iter().collect(),
        config_failure_policy: ConfigFailurePolicy::Continue,
        listeners: ["com.acme.ReportListener".to_owned()].into_iter().collect(),
        parallel: Some(ParallelMode::Methods),
        thread_count: Some(8),
        use_default_listeners: true,
        preserve_order: true,
        group_by_instances: false,
        suite_name: "nightly".to_owned(),
        test_name: "checkout".to_owned(),
        suite_xml_files: vec!["suites/nightly.xml".into()],
        suite_xml: None,
    };
    let spec = TestExecutionSpec {
        test_classes_dirs: &[],
        options: &options,
    };
    let failed = HashSet::from([TestName::new("com.acme.PayTest", "charge")]);
    let retry = TestNgStrategy.build_retry_run(&spec, &failed);

    assert_eq!(retry.options, options);
}

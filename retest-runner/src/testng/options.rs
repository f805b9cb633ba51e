// Copyright (c) The retest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The TestNG run-configuration surface.

use crate::errors::{ConfigFailurePolicyParseError, ParallelModeParseError};
use camino::Utf8PathBuf;
use indexmap::IndexSet;
use std::{fmt, str::FromStr};

/// Observable configuration of one TestNG run.
///
/// The retry engine never builds one of these from scratch. The build layer
/// constructs both the original instance and a fresh one for the retry;
/// [`mirror_from`](Self::mirror_from) then copies the whole surface across,
/// so the retry differs from the original only in test selection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestNgOptions {
    /// Directory reports and listener output are written to.
    pub output_directory: Option<Utf8PathBuf>,
    /// Test groups to include, in declaration order.
    pub include_groups: IndexSet<String>,
    /// Test groups to exclude, in declaration order.
    pub exclude_groups: IndexSet<String>,
    /// What happens to tests whose configuration methods failed.
    pub config_failure_policy: ConfigFailurePolicy,
    /// Fully qualified listener class names, in declaration order.
    pub listeners: IndexSet<String>,
    /// Parallel execution mode, if any.
    pub parallel: Option<ParallelMode>,
    /// Worker threads for parallel execution; `None` leaves the framework
    /// default in place.
    pub thread_count: Option<usize>,
    /// Whether the framework's default reporting listeners run.
    pub use_default_listeners: bool,
    /// Whether declaration order within a class is honored.
    pub preserve_order: bool,
    /// Whether tests sharing a class instance run together.
    pub group_by_instances: bool,
    /// Suite name used in reports.
    pub suite_name: String,
    /// Test name used in reports.
    pub test_name: String,
    /// Suite definition files driving the run, if any.
    pub suite_xml_files: Vec<Utf8PathBuf>,
    /// Programmatically supplied suite definition, if any.
    pub suite_xml: Option<String>,
}

impl Default for TestNgOptions {
    fn default() -> Self {
        Self {
            output_directory: None,
            include_groups: IndexSet::new(),
            exclude_groups: IndexSet::new(),
            config_failure_policy: ConfigFailurePolicy::Skip,
            listeners: IndexSet::new(),
            parallel: None,
            thread_count: None,
            use_default_listeners: false,
            preserve_order: false,
            group_by_instances: false,
            suite_name: "Default suite".to_owned(),
            test_name: "Default test".to_owned(),
            suite_xml_files: Vec::new(),
            suite_xml: None,
        }
    }
}

impl TestNgOptions {
    /// Copies every option from `source` onto `self`.
    ///
    /// A flat, order-independent, field-by-field copy of the whole option
    /// surface: applying it twice leaves `self` equal to applying it once.
    pub fn mirror_from(&mut self, source: &TestNgOptions) {
        self.output_directory = source.output_directory.clone();
        self.include_groups = source.include_groups.clone();
        self.exclude_groups = source.exclude_groups.clone();
        self.config_failure_policy = source.config_failure_policy;
        self.listeners = source.listeners.clone();
        self.parallel = source.parallel;
        self.thread_count = source.thread_count;
        self.use_default_listeners = source.use_default_listeners;
        self.preserve_order = source.preserve_order;
        self.group_by_instances = source.group_by_instances;
        self.suite_name = source.suite_name.clone();
        self.test_name = source.test_name.clone();
        self.suite_xml_files = source.suite_xml_files.clone();
        self.suite_xml = source.suite_xml.clone();
    }
}

/// What TestNG does with tests whose configuration methods failed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ConfigFailurePolicy {
    /// Skip the tests downstream of the failed configuration method.
    ///
    /// This is the default.
    #[default]
    Skip,

    /// Run them anyway.
    Continue,
}

impl ConfigFailurePolicy {
    /// Returns string representations of all known variants.
    pub fn variants() -> &'static [&'static str] {
        &["skip", "continue"]
    }
}

impl FromStr for ConfigFailurePolicy {
    type Err = ConfigFailurePolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let val = match s {
            "skip" => ConfigFailurePolicy::Skip,
            "continue" => ConfigFailurePolicy::Continue,
            other => return Err(ConfigFailurePolicyParseError::new(other)),
        };
        Ok(val)
    }
}

impl fmt::Display for ConfigFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFailurePolicy::Skip => write!(f, "skip"),
            ConfigFailurePolicy::Continue => write!(f, "continue"),
        }
    }
}

/// How TestNG parallelizes execution within a run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParallelMode {
    /// Every test method runs in its own worker.
    Methods,
    /// Every `<test>` unit runs in its own worker.
    Tests,
    /// Every class runs in its own worker.
    Classes,
    /// Every class instance runs in its own worker.
    Instances,
}

impl ParallelMode {
    /// Returns string representations of all known variants.
    pub fn variants() -> &'static [&'static str] {
        &["methods", "tests", "classes", "instances"]
    }
}

impl FromStr for ParallelMode {
    type Err = ParallelModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let val = match s {
            "methods" => ParallelMode::Methods,
            "tests" => ParallelMode::Tests,
            "classes" => ParallelMode::Classes,
            "instances" => ParallelMode::Instances,
            other => return Err(ParallelModeParseError::new(other)),
        };
        Ok(val)
    }
}

impl fmt::Display for ParallelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParallelMode::Methods => write!(f, "methods"),
            ParallelMode::Tests => write!(f, "tests"),
            ParallelMode::Classes => write!(f, "classes"),
            ParallelMode::Instances => write!(f, "instances"),
        }
    }
}

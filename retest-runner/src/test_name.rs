// Copyright (c) The retest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test identities as reported by the test framework.

use smol_str::SmolStr;
use std::fmt;

/// The identity of a single test: its class, and the method within that
/// class if the failure is attributable to one.
///
/// A `TestName` without a method denotes a class-level entry, used when a
/// failure in framework lifecycle machinery forces every test in the class
/// to be retried. Identity is structural: two `TestName`s compare equal iff
/// both components do.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TestName {
    class_name: SmolStr,
    method_name: Option<SmolStr>,
}

impl TestName {
    /// Creates the identity of a single test method.
    pub fn new(class_name: impl Into<SmolStr>, method_name: impl Into<SmolStr>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: Some(method_name.into()),
        }
    }

    /// Creates a class-level identity, denoting every test in the class.
    pub fn class_level(class_name: impl Into<SmolStr>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: None,
        }
    }

    /// Returns the fully qualified class name.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the method name, or `None` for a class-level entry.
    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }
}

impl fmt::Display for TestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method_name {
            Some(method_name) => write!(f, "{}.{}", self.class_name, method_name),
            None => write!(f, "{}", self.class_name),
        }
    }
}

/// A borrowed view of one failure descriptor reported by the framework.
#[derive(Clone, Copy, Debug)]
pub struct TestDescriptor<'a> {
    /// Fully qualified name of the class the failure was reported under.
    pub class_name: &'a str,
    /// Reported method name, if the framework attributed one.
    pub method_name: Option<&'a str>,
}

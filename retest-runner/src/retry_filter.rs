// Copyright (c) The retest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The inclusion filter handed to a retry run.
//!
//! The main structure in this module is [`RetryFilter`], an accumulator of
//! class- and method-level inclusion rules. The retry run executes exactly
//! the union of what the rules match.

use smol_str::SmolStr;
use std::collections::BTreeSet;

/// Accumulates the tests a retry run should execute.
///
/// Two kinds of rules exist: whole-class rules, produced for lifecycle
/// failures, and exact class/method rules, produced for individual test
/// failures and their dependents. Storage is set-backed, so adding the same
/// rule repeatedly is idempotent; expansion is free to produce duplicates.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RetryFilter {
    classes: BTreeSet<SmolStr>,
    tests: BTreeSet<(SmolStr, SmolStr)>,
}

impl RetryFilter {
    /// Creates an empty filter, matching no tests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule matching every test in `class_name`.
    pub fn include_class(&mut self, class_name: impl Into<SmolStr>) {
        self.classes.insert(class_name.into());
    }

    /// Adds a rule matching one test method.
    pub fn include_test(&mut self, class_name: impl Into<SmolStr>, method_name: impl Into<SmolStr>) {
        self.tests.insert((class_name.into(), method_name.into()));
    }

    /// Returns true if the named test matches the accumulated rules.
    ///
    /// A whole-class rule matches any method of its class; method rules
    /// match exactly. Parameter permutations of a data-driven test match
    /// through the parameter-stripped rule their failure contributed.
    pub fn matches(&self, class_name: &str, method_name: &str) -> bool {
        self.classes.contains(class_name)
            || self
                .tests
                .contains(&(SmolStr::new(class_name), SmolStr::new(method_name)))
    }

    /// Returns the classes included wholesale, in sorted order.
    pub fn included_classes(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes.iter().map(SmolStr::as_str)
    }

    /// Returns the individual test rules, in sorted order.
    pub fn included_tests(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.tests
            .iter()
            .map(|(class_name, method_name)| (class_name.as_str(), method_name.as_str()))
    }

    /// Returns true if no rules have been added.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.tests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn repeated_insertion_is_idempotent() {
        let mut once = RetryFilter::new();
        once.include_class("com.acme.SuiteTest");
        once.include_test("com.acme.PayTest", "charge");

        let mut thrice = RetryFilter::new();
        for _ in 0..3 {
            thrice.include_class("com.acme.SuiteTest");
            thrice.include_test("com.acme.PayTest", "charge");
        }
        assert_eq!(once, thrice);
    }

    #[test]
    fn match_semantics() {
        let mut filter = RetryFilter::new();
        filter.include_class("com.acme.SuiteTest");
        filter.include_test("com.acme.PayTest", "charge");

        // Whole-class rules match any method of the class.
        assert!(filter.matches("com.acme.SuiteTest", "anything"));
        // Method rules match exactly.
        assert!(filter.matches("com.acme.PayTest", "charge"));
        assert!(!filter.matches("com.acme.PayTest", "refund"));
        assert!(!filter.matches("com.acme.Other", "charge"));
    }

    #[test]
    fn empty_filter_matches_nothing() {
        let filter = RetryFilter::new();
        assert!(filter.is_empty());
        assert!(!filter.matches("com.acme.PayTest", "charge"));
    }
}

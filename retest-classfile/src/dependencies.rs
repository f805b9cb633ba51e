// Copyright (c) The retest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dependency lookup over a scanned class.

use crate::{errors::ClassFileError, parser};
use smol_str::SmolStr;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Dependency metadata extracted from one compiled test class.
///
/// TestNG dependency declarations are method-level and by name, so the
/// metadata reduces to a reverse index: for each method, the methods that
/// declare a dependency on it. [`dependents_of`](Self::dependents_of)
/// answers the retry engine's query over that index.
#[derive(Clone, Debug, Default)]
pub struct ClassDependencies {
    /// Method name to the methods that directly declare a dependency on it.
    depended_on: HashMap<SmolStr, Vec<SmolStr>>,
}

impl ClassDependencies {
    /// Extracts dependency metadata from the raw bytes of a compiled class.
    ///
    /// The class is parsed structurally; nothing is loaded or executed.
    pub fn parse(bytes: &[u8]) -> Result<Self, ClassFileError> {
        let methods = parser::parse_class(bytes)?;
        let mut depended_on: HashMap<SmolStr, Vec<SmolStr>> = HashMap::new();
        for method in methods {
            for dependency in method.depends_on {
                depended_on
                    .entry(dependency)
                    .or_default()
                    .push(method.name.clone());
            }
        }
        Ok(Self { depended_on })
    }

    /// Returns every method whose declared dependency chain reaches
    /// `method_name`, directly or transitively.
    ///
    /// A method unknown to the class, or one nothing depends on, has no
    /// dependents. The queried method itself is only included if a
    /// declaration cycle leads back to it; cycles are invalid declarations
    /// but representable in bytecode, and the traversal terminates on them.
    pub fn dependents_of(&self, method_name: &str) -> BTreeSet<SmolStr> {
        let mut dependents = BTreeSet::new();
        let mut queue: VecDeque<&SmolStr> = self
            .depended_on
            .get(method_name)
            .into_iter()
            .flatten()
            .collect();
        while let Some(dependent) = queue.pop_front() {
            if dependents.insert(dependent.clone()) {
                queue.extend(self.depended_on.get(dependent.as_str()).into_iter().flatten());
            }
        }
        dependents
    }

    /// Returns true if no method in the class declares a dependency.
    pub fn is_empty(&self) -> bool {
        self.depended_on.is_empty()
    }
}

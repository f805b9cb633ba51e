// Copyright (c) The retest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A builder for synthetic compiled classes, used in tests.
//!
//! Emits a structurally valid class file containing annotated test methods,
//! without going through a Java toolchain. Not part of the public API; only
//! enabled by the `internal-testing` feature and this crate's own tests.

use std::collections::HashMap;

const TEST_ANNOTATION: &str = "Lorg/testng/annotations/Test;";

/// Builds the bytes of a compiled test class with `@Test`-annotated methods.
///
/// ```
/// use retest_classfile::{ClassDependencies, test_builder::TestClassBuilder};
///
/// let bytes = TestClassBuilder::new("com.example.LoginTest")
///     .method("connect", &[])
///     .method("login", &["connect"])
///     .build();
/// let deps = ClassDependencies::parse(&bytes).unwrap();
/// assert_eq!(deps.dependents_of("connect").len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct TestClassBuilder {
    class_name: String,
    methods: Vec<MethodSpec>,
    wide_constants: usize,
}

#[derive(Clone, Debug)]
struct MethodSpec {
    name: String,
    depends_on: Vec<String>,
    annotated: bool,
    extra_annotation: Option<String>,
}

impl TestClassBuilder {
    /// Starts a class with the given fully qualified name.
    pub fn new(class_name: &str) -> Self {
        Self {
            class_name: class_name.to_owned(),
            methods: Vec::new(),
            wide_constants: 0,
        }
    }

    /// Adds a `@Test` method that depends on the named methods.
    pub fn method(mut self, name: &str, depends_on: &[&str]) -> Self {
        self.methods.push(MethodSpec {
            name: name.to_owned(),
            depends_on: depends_on.iter().map(|&dep| dep.to_owned()).collect(),
            annotated: true,
            extra_annotation: None,
        });
        self
    }

    /// Adds a method with no annotations at all, such as a constructor.
    pub fn plain_method(mut self, name: &str) -> Self {
        self.methods.push(MethodSpec {
            name: name.to_owned(),
            depends_on: Vec::new(),
            annotated: false,
            extra_annotation: None,
        });
        self
    }

    /// Adds a `@Test` method that additionally carries an unrelated
    /// annotation with several element kinds, to exercise value framing.
    pub fn method_with_extra_annotation(
        mut self,
        name: &str,
        depends_on: &[&str],
        annotation_descriptor: &str,
    ) -> Self {
        self.methods.push(MethodSpec {
            name: name.to_owned(),
            depends_on: depends_on.iter().map(|&dep| dep.to_owned()).collect(),
            annotated: true,
            extra_annotation: Some(annotation_descriptor.to_owned()),
        });
        self
    }

    /// Inserts an 8-byte constant into the pool, shifting later entries to
    /// exercise the two-slot bookkeeping.
    pub fn wide_constant(mut self) -> Self {
        self.wide_constants += 1;
        self
    }

    /// Serializes the class.
    pub fn build(self) -> Vec<u8> {
        let mut pool = PoolBuilder::default();
        let this_class = pool.class(&self.class_name.replace('.', "/"));
        let super_class = pool.class("java/lang/Object");
        for _ in 0..self.wide_constants {
            pool.long(0x1CEB00DA);
        }
        let void_descriptor = pool.utf8("()V");

        let mut method_records = Vec::with_capacity(self.methods.len());
        for method in &self.methods {
            let mut record = Vec::new();
            record.extend_from_slice(&0x0001u16.to_be_bytes()); // ACC_PUBLIC
            record.extend_from_slice(&pool.utf8(&method.name).to_be_bytes());
            record.extend_from_slice(&void_descriptor.to_be_bytes());

            let mut annotations = Vec::new();
            if method.annotated {
                annotations.push(test_annotation(&mut pool, &method.depends_on));
            }
            if let Some(descriptor) = &method.extra_annotation {
                annotations.push(marker_annotation(&mut pool, descriptor));
            }

            if annotations.is_empty() {
                record.extend_from_slice(&0u16.to_be_bytes()); // attributes_count
            } else {
                let mut attribute = Vec::new();
                attribute.extend_from_slice(&(annotations.len() as u16).to_be_bytes());
                for annotation in &annotations {
                    attribute.extend_from_slice(annotation);
                }
                record.extend_from_slice(&1u16.to_be_bytes()); // attributes_count
                record.extend_from_slice(&pool.utf8("RuntimeVisibleAnnotations").to_be_bytes());
                record.extend_from_slice(&(attribute.len() as u32).to_be_bytes());
                record.extend_from_slice(&attribute);
            }
            method_records.push(record);
        }

        let mut out = Vec::new();
        out.extend_from_slice(&[0xCA, 0xFE, 0xBA, 0xBE]);
        out.extend_from_slice(&0u16.to_be_bytes()); // minor_version
        out.extend_from_slice(&52u16.to_be_bytes()); // major_version (Java 8)
        out.extend_from_slice(&pool.count().to_be_bytes());
        for entry in &pool.entries {
            out.extend_from_slice(entry);
        }
        out.extend_from_slice(&0x0021u16.to_be_bytes()); // ACC_PUBLIC | ACC_SUPER
        out.extend_from_slice(&this_class.to_be_bytes());
        out.extend_from_slice(&super_class.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // interfaces_count
        out.extend_from_slice(&0u16.to_be_bytes()); // fields_count
        out.extend_from_slice(&(method_records.len() as u16).to_be_bytes());
        for record in &method_records {
            out.extend_from_slice(record);
        }
        out.extend_from_slice(&0u16.to_be_bytes()); // class attributes_count
        out
    }
}

/// Serializes the `@Test` annotation, with a `dependsOnMethods` array when
/// dependencies were declared.
fn test_annotation(pool: &mut PoolBuilder, depends_on: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&pool.utf8(TEST_ANNOTATION).to_be_bytes());
    if depends_on.is_empty() {
        out.extend_from_slice(&0u16.to_be_bytes()); // num_element_value_pairs
        return out;
    }
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&pool.utf8("dependsOnMethods").to_be_bytes());
    out.push(b'[');
    out.extend_from_slice(&(depends_on.len() as u16).to_be_bytes());
    for dependency in depends_on {
        out.push(b's');
        out.extend_from_slice(&pool.utf8(dependency).to_be_bytes());
    }
    out
}

/// Serializes an unrelated annotation mixing string, primitive, enum, and
/// nested-annotation elements.
fn marker_annotation(pool: &mut PoolBuilder, descriptor: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&pool.utf8(descriptor).to_be_bytes());
    out.extend_from_slice(&4u16.to_be_bytes()); // num_element_value_pairs

    out.extend_from_slice(&pool.utf8("value").to_be_bytes());
    out.push(b's');
    out.extend_from_slice(&pool.utf8("marker").to_be_bytes());

    out.extend_from_slice(&pool.utf8("attempts").to_be_bytes());
    out.push(b'I');
    out.extend_from_slice(&pool.integer(7).to_be_bytes());

    out.extend_from_slice(&pool.utf8("severity").to_be_bytes());
    out.push(b'e');
    out.extend_from_slice(&pool.utf8("Lcom/example/Severity;").to_be_bytes());
    out.extend_from_slice(&pool.utf8("HIGH").to_be_bytes());

    out.extend_from_slice(&pool.utf8("nested").to_be_bytes());
    out.push(b'@');
    out.extend_from_slice(&pool.utf8("Lcom/example/Inner;").to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());

    out
}

/// Accumulates constant-pool entries, interning UTF-8 data.
#[derive(Clone, Debug, Default)]
struct PoolBuilder {
    entries: Vec<Vec<u8>>,
    slots: usize,
    utf8_indices: HashMap<String, u16>,
}

impl PoolBuilder {
    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(&index) = self.utf8_indices.get(value) {
            return index;
        }
        let mut entry = vec![1u8];
        entry.extend_from_slice(&(value.len() as u16).to_be_bytes());
        entry.extend_from_slice(value.as_bytes());
        let index = self.push(entry, 1);
        self.utf8_indices.insert(value.to_owned(), index);
        index
    }

    fn class(&mut self, binary_name: &str) -> u16 {
        let name_index = self.utf8(binary_name);
        let mut entry = vec![7u8];
        entry.extend_from_slice(&name_index.to_be_bytes());
        self.push(entry, 1)
    }

    fn integer(&mut self, value: i32) -> u16 {
        let mut entry = vec![3u8];
        entry.extend_from_slice(&value.to_be_bytes());
        self.push(entry, 1)
    }

    fn long(&mut self, value: i64) -> u16 {
        let mut entry = vec![5u8];
        entry.extend_from_slice(&value.to_be_bytes());
        self.push(entry, 2)
    }

    fn push(&mut self, entry: Vec<u8>, width: usize) -> u16 {
        let index = (self.slots + 1) as u16;
        self.entries.push(entry);
        self.slots += width;
        index
    }

    fn count(&self) -> u16 {
        (self.slots + 1) as u16
    }
}

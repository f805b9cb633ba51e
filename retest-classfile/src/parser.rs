// Copyright (c) The retest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural parsing of the class-file format.
//!
//! Only the pieces the dependency scan needs are materialized: the constant
//! pool's UTF-8 entries, and per-method `RuntimeVisibleAnnotations` data.
//! Everything else is consumed with correct framing and discarded. Nothing
//! in the class is resolved, loaded, or executed.

use crate::errors::ClassFileError;
use smol_str::SmolStr;
use winnow::{
    ModalResult, Parser,
    binary::{be_u16, be_u32, length_take, u8},
    combinator::{cut_err, fail},
    error::StrContext,
    token::{rest, take},
};

const CLASS_MAGIC: [u8; 4] = [0xCA, 0xFE, 0xBA, 0xBE];

/// Annotation descriptor marking a TestNG test method.
const TEST_ANNOTATION: &str = "Lorg/testng/annotations/Test;";
/// Annotation element listing the methods a test depends on.
const DEPENDS_ON_METHODS: &str = "dependsOnMethods";
/// Method attribute carrying runtime-visible annotations.
const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";

// Constant pool tags, per the class-file format.
const CONSTANT_UTF8: u8 = 1;
const CONSTANT_INTEGER: u8 = 3;
const CONSTANT_FLOAT: u8 = 4;
const CONSTANT_LONG: u8 = 5;
const CONSTANT_DOUBLE: u8 = 6;
const CONSTANT_CLASS: u8 = 7;
const CONSTANT_STRING: u8 = 8;
const CONSTANT_FIELDREF: u8 = 9;
const CONSTANT_METHODREF: u8 = 10;
const CONSTANT_INTERFACE_METHODREF: u8 = 11;
const CONSTANT_NAME_AND_TYPE: u8 = 12;
const CONSTANT_METHOD_HANDLE: u8 = 15;
const CONSTANT_METHOD_TYPE: u8 = 16;
const CONSTANT_DYNAMIC: u8 = 17;
const CONSTANT_INVOKE_DYNAMIC: u8 = 18;
const CONSTANT_MODULE: u8 = 19;
const CONSTANT_PACKAGE: u8 = 20;

/// One method of the scanned class, with the dependencies it declares.
#[derive(Clone, Debug)]
pub(crate) struct RawMethod {
    pub(crate) name: SmolStr,
    pub(crate) depends_on: Vec<SmolStr>,
}

/// Parses the methods of a compiled class out of its raw bytes.
pub(crate) fn parse_class(bytes: &[u8]) -> Result<Vec<RawMethod>, ClassFileError> {
    let Some(magic) = bytes.first_chunk::<4>() else {
        return Err(ClassFileError::malformed(bytes.len()));
    };
    if *magic != CLASS_MAGIC {
        return Err(ClassFileError::magic(u32::from_be_bytes(*magic)));
    }
    class_file
        .parse(&bytes[4..])
        .map_err(|error| ClassFileError::malformed(4 + error.offset()))
}

fn class_file(input: &mut &[u8]) -> ModalResult<Vec<RawMethod>> {
    // minor_version, major_version. Parsing is version-independent: the
    // structures we walk have been stable since the first format revision.
    (be_u16, be_u16).void().parse_next(input)?;

    let pool = constant_pool(input)?;

    // access_flags, this_class, super_class.
    (be_u16, be_u16, be_u16).void().parse_next(input)?;
    let interfaces_count = be_u16.parse_next(input)?;
    take(interfaces_count as usize * 2).void().parse_next(input)?;

    let fields_count = be_u16.parse_next(input)?;
    for _ in 0..fields_count {
        field_info(input)?;
    }

    let methods_count = be_u16.parse_next(input)?;
    let mut methods = Vec::with_capacity(methods_count as usize);
    for _ in 0..methods_count {
        methods.push(method_info(input, &pool)?);
    }

    // Class-level attributes follow; nothing in them concerns the scan.
    rest.void().parse_next(input)?;
    Ok(methods)
}

/// UTF-8 entries of the constant pool, indexed by slot.
///
/// Slot 0 is unused by the format. The trailing slot of an 8-byte constant
/// and every non-UTF-8 entry stay `None`.
struct ConstantPool {
    utf8_slots: Vec<Option<SmolStr>>,
}

impl ConstantPool {
    fn utf8(&self, index: u16) -> Option<&str> {
        self.utf8_slots.get(index as usize)?.as_deref()
    }
}

fn constant_pool(input: &mut &[u8]) -> ModalResult<ConstantPool> {
    let count = be_u16.parse_next(input)?;
    let mut utf8_slots: Vec<Option<SmolStr>> = vec![None; count as usize];
    let mut index = 1u16;
    while index < count {
        let tag = u8.parse_next(input)?;
        match tag {
            CONSTANT_UTF8 => {
                // The format's modified UTF-8 agrees with UTF-8 for the
                // characters legal in method names; anything else fails the
                // scan rather than producing a garbled name.
                let value = length_take(be_u16)
                    .try_map(std::str::from_utf8)
                    .parse_next(input)?;
                utf8_slots[index as usize] = Some(SmolStr::new(value));
            }
            CONSTANT_INTEGER | CONSTANT_FLOAT => take(4usize).void().parse_next(input)?,
            CONSTANT_LONG | CONSTANT_DOUBLE => {
                // 8-byte constants occupy two consecutive pool slots.
                take(8usize).void().parse_next(input)?;
                index += 1;
            }
            CONSTANT_CLASS | CONSTANT_STRING | CONSTANT_METHOD_TYPE | CONSTANT_MODULE
            | CONSTANT_PACKAGE => take(2usize).void().parse_next(input)?,
            CONSTANT_FIELDREF | CONSTANT_METHODREF | CONSTANT_INTERFACE_METHODREF
            | CONSTANT_NAME_AND_TYPE | CONSTANT_DYNAMIC | CONSTANT_INVOKE_DYNAMIC => {
                take(4usize).void().parse_next(input)?
            }
            CONSTANT_METHOD_HANDLE => take(3usize).void().parse_next(input)?,
            _ => cut_err(fail.context(StrContext::Label("constant pool tag"))).parse_next(input)?,
        }
        index += 1;
    }
    Ok(ConstantPool { utf8_slots })
}

fn field_info(input: &mut &[u8]) -> ModalResult<()> {
    // access_flags, name_index, descriptor_index.
    (be_u16, be_u16, be_u16).void().parse_next(input)?;
    let attributes_count = be_u16.parse_next(input)?;
    for _ in 0..attributes_count {
        be_u16.void().parse_next(input)?;
        length_take(be_u32).void().parse_next(input)?;
    }
    Ok(())
}

fn method_info(input: &mut &[u8], pool: &ConstantPool) -> ModalResult<RawMethod> {
    // access_flags.
    be_u16.void().parse_next(input)?;
    let name_index = be_u16.parse_next(input)?;
    let name = SmolStr::new(pool_utf8(input, pool, name_index)?);
    // descriptor_index.
    be_u16.void().parse_next(input)?;

    let attributes_count = be_u16.parse_next(input)?;
    let mut depends_on = Vec::new();
    for _ in 0..attributes_count {
        let attr_name_index = be_u16.parse_next(input)?;
        let attr_bytes = length_take(be_u32).parse_next(input)?;
        if pool.utf8(attr_name_index) == Some(RUNTIME_VISIBLE_ANNOTATIONS) {
            let mut attr_input = attr_bytes;
            depends_on.extend(annotations(&mut attr_input, pool)?);
        }
    }
    Ok(RawMethod { name, depends_on })
}

/// Parses a `RuntimeVisibleAnnotations` attribute body, returning the
/// `dependsOnMethods` entries of the method's `@Test` annotation.
fn annotations(input: &mut &[u8], pool: &ConstantPool) -> ModalResult<Vec<SmolStr>> {
    let num_annotations = be_u16.parse_next(input)?;
    let mut depends_on = Vec::new();
    for _ in 0..num_annotations {
        depends_on.extend(annotation(input, pool)?);
    }
    Ok(depends_on)
}

fn annotation(input: &mut &[u8], pool: &ConstantPool) -> ModalResult<Vec<SmolStr>> {
    let type_index = be_u16.parse_next(input)?;
    let is_test = pool.utf8(type_index) == Some(TEST_ANNOTATION);
    let num_pairs = be_u16.parse_next(input)?;
    let mut depends_on = Vec::new();
    for _ in 0..num_pairs {
        let element_name_index = be_u16.parse_next(input)?;
        let values = element_value(input, pool)?;
        if is_test && pool.utf8(element_name_index) == Some(DEPENDS_ON_METHODS) {
            depends_on.extend(values);
        }
    }
    Ok(depends_on)
}

/// Parses one `element_value`, returning the string constants it contains.
///
/// Every tag must be consumed with correct framing even when the value is
/// irrelevant; otherwise unrelated annotation payloads would derail the walk
/// through the attribute.
fn element_value(input: &mut &[u8], pool: &ConstantPool) -> ModalResult<Vec<SmolStr>> {
    let tag = u8.parse_next(input)?;
    match tag {
        b's' => {
            let index = be_u16.parse_next(input)?;
            let value = pool_utf8(input, pool, index)?;
            Ok(vec![SmolStr::new(value)])
        }
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b'c' => {
            be_u16.void().parse_next(input)?;
            Ok(Vec::new())
        }
        b'e' => {
            // type_name_index, const_name_index.
            (be_u16, be_u16).void().parse_next(input)?;
            Ok(Vec::new())
        }
        b'@' => {
            // Nested annotation; its elements are not ours.
            annotation(input, pool)?;
            Ok(Vec::new())
        }
        b'[' => {
            let num_values = be_u16.parse_next(input)?;
            let mut values = Vec::new();
            for _ in 0..num_values {
                values.extend(element_value(input, pool)?);
            }
            Ok(values)
        }
        _ => cut_err(fail.context(StrContext::Label("element value tag"))).parse_next(input),
    }
}

fn pool_utf8<'pool>(
    input: &mut &[u8],
    pool: &'pool ConstantPool,
    index: u16,
) -> ModalResult<&'pool str> {
    match pool.utf8(index) {
        Some(value) => Ok(value),
        None => cut_err(fail.context(StrContext::Label("constant pool UTF-8 index"))).parse_next(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_builder::TestClassBuilder;

    #[test]
    fn empty_input_is_malformed() {
        assert!(matches!(
            parse_class(&[]),
            Err(ClassFileError::Malformed { offset: 0 })
        ));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let err = parse_class(b"PK\x03\x04rest-of-an-archive").unwrap_err();
        assert!(matches!(err, ClassFileError::Magic { found: 0x504B0304 }));
    }

    #[test]
    fn truncated_class_is_malformed() {
        let bytes = TestClassBuilder::new("com.example.Truncated")
            .method("first", &[])
            .method("second", &["first"])
            .build();
        let err = parse_class(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, ClassFileError::Malformed { .. }));
    }

    #[test]
    fn unknown_constant_tag_is_malformed() {
        // magic, version 52.0, constant_pool_count = 2, then a bogus tag.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&CLASS_MAGIC);
        bytes.extend_from_slice(&[0, 0, 0, 52]);
        bytes.extend_from_slice(&2u16.to_be_bytes());
        bytes.push(99);
        let err = parse_class(&bytes).unwrap_err();
        assert!(matches!(err, ClassFileError::Malformed { .. }));
    }

    #[test]
    fn method_names_survive_parsing() {
        let bytes = TestClassBuilder::new("com.example.Names")
            .plain_method("<init>")
            .method("checkout", &[])
            .build();
        let methods = parse_class(&bytes).unwrap();
        let names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["<init>", "checkout"]);
    }
}

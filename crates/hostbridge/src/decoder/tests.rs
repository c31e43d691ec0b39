// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::host::{Heap, Key, ObjectHandle};
use serde::Deserialize;
use std::collections::HashMap;

fn decode_on<T: DeserializeOwned>(heap: &Heap, root: ObjectHandle) -> Result<T, DecodingError> {
    Decoder::new(heap, "type", root).decode()
}

fn set(heap: &Heap, target: ObjectHandle, key: &str, value: Value<ObjectHandle>) {
    heap.set(target, &Key::from(key), value).unwrap();
}

#[derive(Debug, Deserialize, PartialEq)]
struct Sample {
    flag: bool,
    small: i8,
    big: i64,
    ratio: f32,
    letter: char,
    name: String,
    maybe: Option<i32>,
    #[serde(default)]
    defaulted: u16,
}

#[derive(Debug, Deserialize, PartialEq, Eq, Hash)]
enum Level {
    Low,
    High,
}

#[test]
fn test_scalars_are_narrowed() {
    let heap = Heap::new();
    let root = heap.create_object().unwrap();
    set(&heap, root, "flag", Value::Boolean(true));
    set(&heap, root, "small", Value::Integer(300));
    set(&heap, root, "big", Value::Double(1e18));
    set(&heap, root, "ratio", Value::Double(0.25));
    set(&heap, root, "letter", Value::Integer('q' as i32));
    set(&heap, root, "name", Value::String("n".into()));
    set(&heap, root, "maybe", Value::Double(12.0));

    let sample: Sample = decode_on(&heap, root).unwrap();
    assert_eq!(
        sample,
        Sample {
            flag: true,
            small: 300i32 as i8,
            big: 1_000_000_000_000_000_000,
            ratio: 0.25,
            letter: 'q',
            name: "n".into(),
            maybe: Some(12),
            defaulted: 0,
        }
    );
    // Decode never releases the caller's root.
    assert_eq!(heap.reference_count(), 1);
    heap.release(root);
}

#[test]
fn test_absent_and_null_both_read_as_none() {
    #[derive(Debug, Deserialize)]
    struct Opt {
        a: Option<String>,
        b: Option<String>,
        c: Option<()>,
    }

    let heap = Heap::new();
    let root = heap.create_object().unwrap();
    heap.set_null(root, &"a".into()).unwrap();
    heap.set_undefined(root, &"c".into()).unwrap();

    let mut decoder = Decoder::new(&heap, "type", root);
    assert!(decoder.decode_not_null_mark(&Slot::Root).unwrap());
    decoder
        .begin_structure(
            &Slot::Root,
            &Descriptor::declared("Opt", SerialKind::Struct, &["a", "b", "c"]),
        )
        .unwrap();
    let mark = |name: &str| decoder.decode_not_null_mark(&Slot::Key(name.into())).unwrap();
    assert!(!mark("a"));
    assert!(!mark("b"));
    assert!(mark("c"));
    drop(decoder);

    let opt: Opt = decode_on(&heap, root).unwrap();
    assert_eq!(opt.a, None);
    assert_eq!(opt.b, None);
    // A present undefined is "present".
    assert_eq!(opt.c, Some(()));
    heap.release(root);
}

#[test]
fn test_missing_required_field() {
    let heap = Heap::new();
    let root = heap.create_object().unwrap();
    set(&heap, root, "flag", Value::Boolean(false));
    let err = decode_on::<Sample>(&heap, root).unwrap_err();
    assert_eq!(err, DecodingError::MissingField("small".into()));
    assert_eq!(heap.reference_count(), 1);
    heap.release(root);
}

#[test]
fn test_wrong_type_is_reported() {
    #[derive(Debug, Deserialize)]
    struct One {
        #[allow(dead_code)]
        value: i32,
    }

    let heap = Heap::new();
    let root = heap.create_object().unwrap();
    set(&heap, root, "value", Value::String("7".into()));
    let err = decode_on::<One>(&heap, root).unwrap_err();
    assert_eq!(
        err,
        DecodingError::UnexpectedType {
            expected: "i32",
            found: ValueType::String,
            at: "value".into(),
        }
    );
    heap.release(root);
}

#[test]
fn test_unknown_enum_value() {
    #[derive(Debug, Deserialize)]
    struct Holder {
        #[allow(dead_code)]
        level: Level,
    }

    let heap = Heap::new();
    let root = heap.create_object().unwrap();
    set(&heap, root, "level", Value::String("Medium".into()));
    let err = decode_on::<Holder>(&heap, root).unwrap_err();
    assert_eq!(
        err.to_string(),
        "enum of type Level has unknown value Medium"
    );
    assert_eq!(heap.reference_count(), 1);
    assert_eq!(heap.stale_releases(), 0);
    heap.release(root);
}

#[test]
fn test_list_leniency_for_wrong_shapes() {
    #[derive(Debug, Deserialize)]
    struct Lists {
        undefined: Vec<i32>,
        scalar: Vec<i32>,
        object: Vec<i32>,
        #[serde(default)]
        absent: Vec<i32>,
    }

    let heap = Heap::new();
    let root = heap.create_object().unwrap();
    let nested = heap.create_object().unwrap();
    heap.set_undefined(root, &"undefined".into()).unwrap();
    set(&heap, root, "scalar", Value::String("nope".into()));
    set(&heap, root, "object", Value::Object(nested));
    heap.release(nested);

    let lists: Lists = decode_on(&heap, root).unwrap();
    assert!(lists.undefined.is_empty());
    assert!(lists.scalar.is_empty());
    assert!(lists.object.is_empty());
    assert!(lists.absent.is_empty());
    assert_eq!(heap.reference_count(), 1);
    assert_eq!(heap.stale_releases(), 0);
    heap.release(root);
}

#[test]
fn test_map_reads_keys_in_host_order() {
    let heap = Heap::new();
    let root = heap.create_object().unwrap();
    set(&heap, root, "b", Value::Integer(2));
    set(&heap, root, "a", Value::Integer(1));

    let map: indexmap::IndexMap<String, u8> = decode_on(&heap, root).unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);

    let levels = heap.create_object().unwrap();
    set(&heap, levels, "Low", Value::Boolean(true));
    let by_level: HashMap<Level, bool> = decode_on(&heap, levels).unwrap();
    assert_eq!(by_level.get(&Level::Low), Some(&true));

    set(&heap, levels, "Mid", Value::Boolean(false));
    let err = decode_on::<HashMap<Level, bool>>(&heap, levels).unwrap_err();
    assert!(matches!(err, DecodingError::UnknownEnumValue { .. }));

    let err = decode_on::<HashMap<i32, bool>>(&heap, levels).unwrap_err();
    assert_eq!(err, DecodingError::InvalidKeyType("i32"));

    heap.release(root);
    heap.release(levels);
    assert_eq!(heap.reference_count(), 0);
}

#[test]
fn test_undefined_map_reads_as_empty() {
    #[derive(Debug, Deserialize)]
    struct Holder {
        map: HashMap<String, i32>,
    }

    let heap = Heap::new();
    let root = heap.create_object().unwrap();
    heap.set_undefined(root, &"map".into()).unwrap();
    let holder: Holder = decode_on(&heap, root).unwrap();
    assert!(holder.map.is_empty());

    heap.set_null(root, &"map".into()).unwrap();
    let err = decode_on::<Holder>(&heap, root).unwrap_err();
    assert!(matches!(err, DecodingError::UnexpectedType { found: ValueType::Null, .. }));
    assert_eq!(heap.reference_count(), 1);
    heap.release(root);
}

#[test]
fn test_root_must_be_structure() {
    let heap = Heap::new();
    let root = heap.create_object().unwrap();
    assert_eq!(
        decode_on::<i32>(&heap, root).unwrap_err(),
        DecodingError::NotAStructure("i32")
    );
    assert_eq!(
        decode_on::<()>(&heap, root).unwrap_err(),
        DecodingError::NotAStructure("unit")
    );
    heap.release(root);
}

#[test]
fn test_invalid_char() {
    #[derive(Debug, Deserialize)]
    struct C {
        #[allow(dead_code)]
        c: char,
    }

    let heap = Heap::new();
    let root = heap.create_object().unwrap();
    set(&heap, root, "c", Value::Integer(0xD800));
    assert_eq!(
        decode_on::<C>(&heap, root).unwrap_err(),
        DecodingError::InvalidChar(0xD800)
    );
    heap.release(root);
}

#[test]
fn test_failure_in_nested_frame_releases_sources() {
    #[derive(Debug, Deserialize)]
    struct Outer {
        #[allow(dead_code)]
        rows: Vec<Row>,
    }
    #[derive(Debug, Deserialize)]
    struct Row {
        #[allow(dead_code)]
        id: u32,
    }

    let heap = Heap::new();
    let root = heap.create_object().unwrap();
    let rows = heap.create_array().unwrap();
    let good = heap.create_object().unwrap();
    let bad = heap.create_object().unwrap();
    set(&heap, good, "id", Value::Integer(1));
    set(&heap, bad, "id", Value::Boolean(true));
    heap.push(rows, Value::Object(good)).unwrap();
    heap.push(rows, Value::Object(bad)).unwrap();
    set(&heap, root, "rows", Value::Array(rows));
    for handle in [rows, good, bad] {
        heap.release(handle);
    }

    let err = decode_on::<Outer>(&heap, root).unwrap_err();
    assert!(matches!(err, DecodingError::UnexpectedType { expected: "u32", .. }));
    assert_eq!(heap.reference_count(), 1);
    assert_eq!(heap.stale_releases(), 0);
    heap.release(root);
}

#[test]
fn test_self_describing_targets() {
    let heap = Heap::new();
    let root = heap.create_object().unwrap();
    let list = heap.create_array().unwrap();
    heap.push(list, Value::Integer(1)).unwrap();
    heap.push(list, Value::Null).unwrap();
    set(&heap, root, "list", Value::Array(list));
    set(&heap, root, "text", Value::String("t".into()));
    set(&heap, root, "num", Value::Double(1.5));
    heap.release(list);

    let value: serde_json::Value = decode_on(&heap, root).unwrap();
    assert_eq!(
        value,
        serde_json::json!({ "list": [1, null], "text": "t", "num": 1.5 })
    );
    assert_eq!(heap.reference_count(), 1);
    heap.release(root);
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Tagged unions: discriminator injection on encode, dispatch on decode.

use hostbridge::{
    Configuration, DecodingError, EncodingError, Heap, HostBridge, HostRuntime, Key, Value,
};
use serde::{Deserialize, Serialize};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
enum Sealed {
    One { value: String },
    Two { count: i32 },
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Payload {
    value: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
enum Wrapped {
    #[serde(rename = "wrapped.one")]
    One(Payload),
    Empty,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Holder {
    sealed: Sealed,
    others: Vec<Sealed>,
}

#[test]
fn test_variant_one_encodes_with_type_field() {
    init_logging();
    let heap = Heap::new();
    let bridge = HostBridge::new(&heap, Configuration::default()).unwrap();

    let root = bridge
        .to_host(&Sealed::One {
            value: "x".into(),
        })
        .unwrap();
    assert_eq!(heap.reference_count(), 1);
    assert_eq!(heap.keys(root.handle()).unwrap(), vec!["type", "value"]);
    assert_eq!(
        heap.get(root.handle(), &Key::from("type")).unwrap(),
        Some(Value::String("One".into()))
    );
    assert_eq!(
        heap.get(root.handle(), &Key::from("value")).unwrap(),
        Some(Value::String("x".into()))
    );

    let decoded: Sealed = bridge.from_host(root.handle()).unwrap();
    assert_eq!(
        decoded,
        Sealed::One {
            value: "x".into()
        }
    );
    // The filtered copy is gone, the caller's root is untouched.
    assert_eq!(heap.reference_count(), 1);
    assert_eq!(heap.keys(root.handle()).unwrap(), vec!["type", "value"]);
}

#[test]
fn test_nested_unions_round_trip() {
    init_logging();
    let heap = Heap::new();
    let bridge = HostBridge::new(&heap, Configuration::default()).unwrap();
    let holder = Holder {
        sealed: Sealed::Two { count: 3 },
        others: vec![
            Sealed::One {
                value: "a".into(),
            },
            Sealed::Two { count: -1 },
        ],
    };
    let root = bridge.to_host(&holder).unwrap();
    let decoded: Holder = bridge.from_host(root.handle()).unwrap();
    assert_eq!(decoded, holder);
    drop(root);
    assert_eq!(heap.reference_count(), 0);
    assert_eq!(heap.stale_releases(), 0);
}

#[test]
fn test_newtype_variant_and_renamed_serial_name() {
    let heap = Heap::new();
    let bridge = HostBridge::new(&heap, Configuration::default()).unwrap();
    let value = vec![
        Wrapped::One(Payload {
            value: "p".into(),
        }),
        Wrapped::Empty,
    ];
    let root = bridge.to_host(&value).unwrap();

    let Some(Value::Object(first)) = heap.get(root.handle(), &Key::Index(0)).unwrap() else {
        panic!("expected object");
    };
    assert_eq!(
        heap.get(first, &Key::from("type")).unwrap(),
        Some(Value::String("wrapped.one".into()))
    );
    heap.release(first);
    assert_eq!(
        heap.get(root.handle(), &Key::Index(1)).unwrap(),
        Some(Value::String("Empty".into()))
    );

    let decoded: Vec<Wrapped> = bridge.from_host(root.handle()).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(heap.reference_count(), 1);
}

#[test]
fn test_missing_discriminator() {
    let heap = Heap::new();
    let bridge = HostBridge::new(&heap, Configuration::default()).unwrap();
    let root = heap.create_object().unwrap();
    heap.set(root, &Key::from("value"), Value::String("x".into()))
        .unwrap();

    let err = bridge.from_host::<Sealed>(root).unwrap_err();
    assert_eq!(
        err,
        DecodingError::MissingDiscriminator {
            type_name: "Sealed".into(),
            discriminator: "type".into(),
        }
    );

    // A non-string discriminator counts as missing.
    let tag = heap.create_object().unwrap();
    heap.set(root, &Key::from("type"), Value::Object(tag)).unwrap();
    heap.release(tag);
    let err = bridge.from_host::<Sealed>(root).unwrap_err();
    assert!(matches!(err, DecodingError::MissingDiscriminator { .. }));

    assert_eq!(heap.reference_count(), 1);
    assert_eq!(heap.stale_releases(), 0);
    heap.release(root);
}

#[test]
fn test_unknown_discriminator_names_the_string() {
    let heap = Heap::new();
    let bridge = HostBridge::new(&heap, Configuration::default()).unwrap();
    let root = heap.create_object().unwrap();
    heap.set(root, &Key::from("type"), Value::String("Three".into()))
        .unwrap();

    let err = bridge.from_host::<Sealed>(root).unwrap_err();
    assert_eq!(
        err,
        DecodingError::UnknownVariant {
            type_name: "Sealed".into(),
            tag: "Three".into(),
        }
    );
    assert!(err.to_string().contains("'Three'"));
    assert_eq!(heap.reference_count(), 1);
    heap.release(root);
}

#[test]
fn test_failure_inside_variant_releases_copy() {
    let heap = Heap::new();
    let bridge = HostBridge::new(&heap, Configuration::default()).unwrap();
    let root = heap.create_object().unwrap();
    let inner = heap.create_object().unwrap();
    heap.set(inner, &Key::from("type"), Value::String("Two".into()))
        .unwrap();
    heap.set(inner, &Key::from("count"), Value::String("many".into()))
        .unwrap();
    heap.set(root, &Key::from("sealed"), Value::Object(inner)).unwrap();
    heap.release(inner);

    let err = bridge.from_host::<Holder>(root).unwrap_err();
    assert!(matches!(err, DecodingError::UnexpectedType { expected: "i32", .. }));
    assert_eq!(heap.reference_count(), 1);
    assert_eq!(heap.stale_releases(), 0);
    heap.release(root);
}

#[test]
fn test_discriminator_collision_with_custom_name() {
    #[derive(Serialize)]
    enum Clash {
        A { kind: i32 },
    }

    let heap = Heap::new();
    let config = Configuration::default().with_class_discriminator("kind");
    let bridge = HostBridge::new(&heap, config).unwrap();
    let err = bridge.to_host(&Clash::A { kind: 1 }).unwrap_err();
    assert_eq!(
        err,
        EncodingError::DiscriminatorCollision {
            variant: "A".into(),
            discriminator: "kind".into(),
        }
    );
    assert_eq!(heap.reference_count(), 0);
}

#[test]
fn test_empty_discriminator_rejected_by_free_functions() {
    let heap = Heap::new();
    let config = Configuration::default().with_class_discriminator("");

    let err = hostbridge::encode(&heap, &config, &Sealed::Two { count: 1 }).unwrap_err();
    assert!(matches!(err, EncodingError::InvalidConfiguration(_)));
    assert_eq!(heap.reference_count(), 0);

    let root = heap.create_object().unwrap();
    heap.set(root, &Key::from(""), Value::String("Two".into()))
        .unwrap();
    let err = hostbridge::decode::<_, Sealed>(&heap, &config, root).unwrap_err();
    assert!(matches!(err, DecodingError::InvalidConfiguration(_)));
    assert_eq!(heap.reference_count(), 1);
    assert_eq!(heap.stale_releases(), 0);
    heap.release(root);
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Exact values written and read back
#![allow(clippy::unreadable_literal)] // Large test constants

//! Field access on top-level and nested objects.

mod common;

use chrono::{DateTime, Utc};
use common::{TestInnerObject, TestObject, TestOuterObject};
use portable::{
    BinaryObject, Decimal, Error, PortableMarshaller, Record, TypeTag, Value,
};
use uuid::Uuid;

/// Check every field of `object` against `expected`, by name.
fn check_fields(object: &BinaryObject, expected: &TestObject) {
    assert_eq!(object.value_as::<i8>("fByte").expect("fByte"), Some(1));
    assert_eq!(object.value_as::<bool>("fBool").expect("fBool"), Some(true));
    assert_eq!(object.value_as::<i16>("fShort").expect("fShort"), Some(2));
    assert_eq!(object.value_as::<char>("fChar").expect("fChar"), Some('\u{3}'));
    assert_eq!(object.value_as::<i32>("fInt").expect("fInt"), Some(4));
    assert_eq!(object.value_as::<i64>("fLong").expect("fLong"), Some(5));
    assert_eq!(object.value_as::<f32>("fFloat").expect("fFloat"), Some(6.6));
    assert_eq!(object.value_as::<f64>("fDouble").expect("fDouble"), Some(7.7));
    assert_eq!(
        object.value_as::<String>("fString").expect("fString"),
        Some("8".to_owned())
    );
    assert_eq!(
        object.value_as::<DateTime<Utc>>("fDate").expect("fDate"),
        Some(expected.f_date)
    );
    assert_eq!(
        object.value_as::<DateTime<Utc>>("fTimestamp").expect("fTimestamp"),
        Some(expected.f_timestamp)
    );
    assert_eq!(
        object.value_as::<Uuid>("fUuid").expect("fUuid"),
        Some(expected.f_uuid)
    );
    assert_eq!(
        object.value_as::<Decimal>("fDecimal").expect("fDecimal"),
        Some(Decimal::from(9))
    );
    assert_eq!(
        object.value_as::<Vec<u8>>("fBytes").expect("fBytes"),
        Some(vec![0xDE, 0xAD, 0xBE, 0xEF])
    );

    let inner = object.field("fObj").expect("fObj").expect("fObj present");
    assert_eq!(inner.value_as::<i32>("val").expect("val"), Some(10));
    assert_eq!(
        inner.deserialize_as::<TestInnerObject>().expect("inner"),
        TestInnerObject { val: 10 }
    );

    assert!(object.exists("fNull").expect("fNull exists"));
    assert_eq!(object.value("fNull").expect("fNull value"), None);

    assert!(!object.exists("fMissing").expect("fMissing exists"));
    assert_eq!(object.value("fMissing").expect("fMissing value"), None);
    assert_eq!(object.field("fMissing").expect("fMissing field"), None);

    check_fields_by_descriptor(object, expected);
}

/// Same checks through descriptors bound to `object`'s type.
fn check_fields_by_descriptor(object: &BinaryObject, expected: &TestObject) {
    let int = object.field_descriptor("fInt");
    assert!(int.exists(object).expect("fInt exists"));
    assert_eq!(int.value_as::<i32>(object).expect("fInt"), Some(4));

    let string = object.field_descriptor("fString");
    assert_eq!(
        string.value(object).expect("fString"),
        Some(Value::String("8".into()))
    );

    let uuid = object.field_descriptor("fUuid");
    assert_eq!(uuid.value_as::<Uuid>(object).expect("fUuid"), Some(expected.f_uuid));

    let timestamp = object.field_descriptor("fTimestamp");
    assert_eq!(
        timestamp.value_as::<DateTime<Utc>>(object).expect("fTimestamp"),
        Some(expected.f_timestamp)
    );

    let inner = object
        .field_descriptor("fObj")
        .field(object)
        .expect("fObj")
        .expect("fObj present");
    let val = inner.field_descriptor("val");
    assert_eq!(val.value_as::<i32>(&inner).expect("val"), Some(10));

    let null = object.field_descriptor("fNull");
    assert!(null.exists(object).expect("fNull exists"));
    assert_eq!(null.value(object).expect("fNull value"), None);

    let missing = object.field_descriptor("fMissing");
    assert!(!missing.exists(object).expect("fMissing exists"));
    assert_eq!(missing.value(object).expect("fMissing value"), None);
    assert_eq!(missing.field(object).expect("fMissing field"), None);

    // Second pass is served from each descriptor's slot cache.
    assert_eq!(int.value_as::<i32>(object).expect("fInt again"), Some(4));
    assert!(!missing.exists(object).expect("fMissing again"));
    assert_eq!(int.stats().misses, 1);
    assert_eq!(missing.stats().misses, 1);
}

#[test]
fn test_every_field_top_level() {
    let marshaller = PortableMarshaller::new();
    let expected = TestObject::sample();
    let object = marshaller.marshal(&expected).expect("marshal");

    check_fields(&object, &expected);
}

#[test]
fn test_every_field_nested() {
    let marshaller = PortableMarshaller::new();
    let expected = TestObject::sample();
    let outer = marshaller
        .marshal(&TestOuterObject {
            f_inner: Some(expected.clone()),
        })
        .expect("marshal");

    let inner = outer.field("fInner").expect("fInner").expect("present");
    check_fields(&inner, &expected);

    // The nested object is byte-identical to a top-level marshal.
    assert_eq!(inner, marshaller.marshal(&expected).expect("marshal"));
}

#[test]
fn test_fields_after_crossing_a_buffer_boundary() {
    // Received bytes go through full validation before any access.
    let writer_side = PortableMarshaller::new();
    let reader_side = PortableMarshaller::new();
    let expected = TestObject::sample();
    let bytes = writer_side.marshal(&expected).expect("marshal").bytes().to_vec();

    let object = reader_side.to_binary(bytes).expect("valid buffer");
    check_fields(&object, &expected);
}

#[test]
fn test_typed_roundtrip() {
    let marshaller = PortableMarshaller::new();
    let expected = TestOuterObject {
        f_inner: Some(TestObject::sample()),
    };
    let bytes = marshaller.marshal(&expected).expect("marshal").bytes().to_vec();

    let back: TestOuterObject = marshaller.unmarshal(bytes).expect("unmarshal");
    assert_eq!(back, expected);
}

#[test]
fn test_null_nested_object() {
    let marshaller = PortableMarshaller::new();
    let outer = marshaller
        .marshal(&TestOuterObject { f_inner: None })
        .expect("marshal");

    assert!(outer.exists("fInner").expect("exists"));
    assert_eq!(outer.field("fInner").expect("field"), None);
}

#[test]
fn test_value_dispatches_on_stored_tag() {
    let marshaller = PortableMarshaller::new();
    let object = marshaller.marshal(&TestObject::sample()).expect("marshal");

    // Untyped access returns whatever was stored.
    let value = object.value("fShort").expect("value").expect("present");
    assert_eq!(value.type_tag(), TypeTag::Short);
    assert_eq!(value, Value::Short(2));

    // Typed access checks compatibility.
    let err = object.value_as::<String>("fInt").expect_err("mismatch");
    assert!(matches!(
        err,
        Error::FieldTypeMismatch {
            expected: "String",
            found: "Int",
            ..
        }
    ));
}

#[test]
fn test_deserialize_to_record() {
    let marshaller = PortableMarshaller::new();
    let object = marshaller
        .marshal(&TestInnerObject { val: 10 })
        .expect("marshal");

    let record = object.deserialize().expect("deserialize");
    assert_eq!(record, Record::new("TestInnerObject").with("val", 10i32));
}

#[test]
fn test_record_roundtrip_preserves_nulls_and_nesting() {
    let marshaller = PortableMarshaller::new();
    let inner = marshaller
        .marshal(&TestInnerObject { val: 1 })
        .expect("inner");
    let record = Record::new("Dyn")
        .with("name", "dynamic")
        .with("inner", inner)
        .with("gone", Value::Null)
        .with("amount", Decimal::new(-12345, 2));

    let object = marshaller.marshal_record(&record).expect("marshal");
    assert_eq!(object.deserialize().expect("deserialize"), record);
}

#[test]
fn test_names_are_case_insensitive() {
    let marshaller = PortableMarshaller::new();
    let object = marshaller.marshal(&TestObject::sample()).expect("marshal");
    assert_eq!(object.value_as::<i32>("FINT").expect("FINT"), Some(4));
    assert_eq!(object.type_name().as_deref(), Some("TestObject"));
}

#[test]
fn test_timestamp_keeps_nanoseconds() {
    let marshaller = PortableMarshaller::new();
    let instant = DateTime::from_timestamp(1_700_000_000, 123_456_789).expect("instant");
    let before_epoch = DateTime::from_timestamp(-1, 999_999_999).expect("instant");

    let mut writer = marshaller.writer("Times");
    writer
        .write("ts", instant)
        .expect("ts")
        .write("date", Value::date(instant))
        .expect("date")
        .write("old", before_epoch)
        .expect("old");
    let object = writer.finish().expect("finish");

    assert_eq!(object.value("ts").expect("ts"), Some(Value::Timestamp(instant)));
    assert_eq!(
        object
            .value_as::<DateTime<Utc>>("date")
            .expect("date")
            .map(|d| d.timestamp_subsec_nanos()),
        Some(123_000_000)
    );
    assert_eq!(
        object.value_as::<DateTime<Utc>>("old").expect("old"),
        Some(before_epoch)
    );
}

#[test]
fn test_one_descriptor_serves_top_level_and_nested_objects() {
    let marshaller = PortableMarshaller::new();
    let expected = TestObject::sample();
    let top = marshaller.marshal(&expected).expect("top");
    let outer = marshaller
        .marshal(&TestOuterObject {
            f_inner: Some(expected),
        })
        .expect("outer");
    let nested = outer.field("fInner").expect("fInner").expect("present");

    let int = marshaller.field_descriptor("TestObject", "fInt");
    let null = marshaller.field_descriptor("TestObject", "fNull");
    let missing = marshaller.field_descriptor("TestObject", "fMissing");
    for object in [&top, &nested, &top, &nested] {
        assert_eq!(int.value_as::<i32>(object).expect("fInt"), Some(4));
        assert!(null.exists(object).expect("fNull"));
        assert_eq!(null.value(object).expect("fNull"), None);
        assert!(!missing.exists(object).expect("fMissing"));
    }
    assert_eq!(int.cached_schemas(), 1, "nested and top-level share a schema");
    assert_eq!(int.stats().misses, 1);
    assert!(matches!(
        int.value(&outer),
        Err(Error::DescriptorTypeMismatch { .. })
    ));
}

#[test]
fn test_sub_millisecond_date_is_truncated_on_write() {
    let marshaller = PortableMarshaller::new();
    let instant = DateTime::from_timestamp(1_700_000_000, 123_456_789).expect("instant");

    let mut writer = marshaller.writer("Dates");
    writer.write("raw", Value::Date(instant)).expect("raw");
    let object = writer.finish().expect("finish");

    let stored = object.value("raw").expect("raw").expect("present");
    assert_eq!(stored, Value::date(instant));
    assert_eq!(
        stored.as_datetime().map(|d| d.timestamp_subsec_nanos()),
        Some(123_000_000)
    );

    // What was written is what is read back.
    let record = Record::new("Dates").with("raw", Value::Date(instant));
    let back = marshaller
        .marshal_record(&record)
        .expect("marshal")
        .deserialize()
        .expect("deserialize");
    assert_eq!(back.get("raw"), Some(&stored));
    let again = marshaller.marshal_record(&back).expect("again");
    assert_eq!(again.deserialize().expect("again"), back);
}

#[test]
fn test_randomized_int_fields() {
    let marshaller = PortableMarshaller::new();
    for _ in 0..64 {
        let values: Vec<i64> = (0..fastrand::usize(1..20)).map(|_| fastrand::i64(..)).collect();
        let mut writer = marshaller.writer("Random");
        for (i, v) in values.iter().enumerate() {
            writer.write(&format!("f{}", i), *v).expect("write");
        }
        let object = writer.finish().expect("finish");

        let copy = marshaller.to_binary(object.bytes().to_vec()).expect("copy");
        for (i, v) in values.iter().enumerate() {
            assert_eq!(copy.value_as::<i64>(&format!("f{}", i)).expect("read"), Some(*v));
        }
        assert!(!copy.exists(&format!("f{}", values.len())).expect("exists"));
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared fixture types for the integration tests.

#![allow(dead_code)] // Each test binary uses a different subset

use chrono::{DateTime, SubsecRound, Utc};
use portable::{BinaryObject, Decimal, ObjectWriter, Portable, Result, Value};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct TestInnerObject {
    pub val: i32,
}

impl Portable for TestInnerObject {
    const TYPE_NAME: &'static str = "TestInnerObject";

    fn write_portable(&self, writer: &mut ObjectWriter) -> Result<()> {
        writer.write("val", self.val)?;
        Ok(())
    }

    fn read_portable(object: &BinaryObject) -> Result<Self> {
        Ok(Self {
            val: object.value_as("val")?.unwrap_or_default(),
        })
    }
}

/// One field of every supported kind, plus an explicit null.
#[derive(Debug, Clone, PartialEq)]
pub struct TestObject {
    pub f_byte: i8,
    pub f_bool: bool,
    pub f_short: i16,
    pub f_char: char,
    pub f_int: i32,
    pub f_long: i64,
    pub f_float: f32,
    pub f_double: f64,
    pub f_string: String,
    pub f_date: DateTime<Utc>,
    pub f_timestamp: DateTime<Utc>,
    pub f_uuid: Uuid,
    pub f_decimal: Decimal,
    pub f_bytes: Vec<u8>,
    pub f_obj: Option<TestInnerObject>,
    pub f_null: Option<String>,
}

impl TestObject {
    pub fn sample() -> Self {
        let now = Utc::now();
        Self {
            f_byte: 1,
            f_bool: true,
            f_short: 2,
            f_char: '\u{3}',
            f_int: 4,
            f_long: 5,
            f_float: 6.6,
            f_double: 7.7,
            f_string: "8".to_owned(),
            f_date: now.trunc_subsecs(3),
            f_timestamp: now,
            f_uuid: Uuid::new_v4(),
            f_decimal: Decimal::from(9),
            f_bytes: vec![0xDE, 0xAD, 0xBE, 0xEF],
            f_obj: Some(TestInnerObject { val: 10 }),
            f_null: None,
        }
    }
}

impl Portable for TestObject {
    const TYPE_NAME: &'static str = "TestObject";

    fn write_portable(&self, writer: &mut ObjectWriter) -> Result<()> {
        writer
            .write("fByte", self.f_byte)?
            .write("fBool", self.f_bool)?
            .write("fShort", self.f_short)?
            .write("fChar", self.f_char)?
            .write("fInt", self.f_int)?
            .write("fLong", self.f_long)?
            .write("fFloat", self.f_float)?
            .write("fDouble", self.f_double)?
            .write("fString", self.f_string.as_str())?
            .write("fDate", Value::date(self.f_date))?
            .write("fTimestamp", self.f_timestamp)?
            .write("fUuid", self.f_uuid)?
            .write("fDecimal", self.f_decimal)?
            .write("fBytes", self.f_bytes.as_slice())?;
        match &self.f_obj {
            Some(inner) => writer.write_object("fObj", inner)?,
            None => writer.write_null("fObj")?,
        };
        writer.write("fNull", self.f_null.clone())?;
        Ok(())
    }

    fn read_portable(object: &BinaryObject) -> Result<Self> {
        Ok(Self {
            f_byte: object.value_as("fByte")?.unwrap_or_default(),
            f_bool: object.value_as("fBool")?.unwrap_or_default(),
            f_short: object.value_as("fShort")?.unwrap_or_default(),
            f_char: object.value_as("fChar")?.unwrap_or_default(),
            f_int: object.value_as("fInt")?.unwrap_or_default(),
            f_long: object.value_as("fLong")?.unwrap_or_default(),
            f_float: object.value_as("fFloat")?.unwrap_or_default(),
            f_double: object.value_as("fDouble")?.unwrap_or_default(),
            f_string: object.value_as("fString")?.unwrap_or_default(),
            f_date: object.value_as("fDate")?.unwrap_or_default(),
            f_timestamp: object.value_as("fTimestamp")?.unwrap_or_default(),
            f_uuid: object.value_as("fUuid")?.unwrap_or_default(),
            f_decimal: object
                .value_as("fDecimal")?
                .unwrap_or(Decimal::new(0, 0)),
            f_bytes: object.value_as("fBytes")?.unwrap_or_default(),
            f_obj: object
                .field("fObj")?
                .map(|inner| inner.deserialize_as::<TestInnerObject>())
                .transpose()?,
            f_null: object.value_as("fNull")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestOuterObject {
    pub f_inner: Option<TestObject>,
}

impl Portable for TestOuterObject {
    const TYPE_NAME: &'static str = "TestOuterObject";

    fn write_portable(&self, writer: &mut ObjectWriter) -> Result<()> {
        match &self.f_inner {
            Some(inner) => writer.write_object("fInner", inner)?,
            None => writer.write_null("fInner")?,
        };
        Ok(())
    }

    fn read_portable(object: &BinaryObject) -> Result<Self> {
        Ok(Self {
            f_inner: object
                .field("fInner")?
                .map(|inner| inner.deserialize_as::<TestObject>())
                .transpose()?,
        })
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field offset resolution and lazy value decoding.
//!
//! Resolution tries the cached schema of `(type, schema id)` first and
//! verifies the answer against the footer in O(1); any disagreement falls
//! back to a linear footer scan, which is always correct.

use crate::config::HEADER_LEN;
use crate::error::{Error, Result};
use crate::object::BinaryObject;
use crate::schema::Schema;
use crate::ser::Cursor;
use crate::tag::TypeTag;
use crate::value::{Decimal, Value};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Linear footer scan: `(slot, offset)` of `field_id`.
pub(crate) fn scan_footer(object: &BinaryObject, field_id: u32) -> Result<Option<(usize, usize)>> {
    for slot in 0..object.field_count() {
        let (id, offset) = object.footer_entry(slot)?;
        if id == field_id {
            return Ok(Some((slot, offset)));
        }
    }
    Ok(None)
}

/// Whether the first and last footer ids are `first` and `last`.
///
/// Checks a cached "field absent" answer before trusting it.
pub(crate) fn footer_ends_match(object: &BinaryObject, first: u32, last: u32) -> Result<bool> {
    let count = object.field_count();
    if count == 0 {
        return Ok(false);
    }
    Ok(object.footer_entry(0)?.0 == first && object.footer_entry(count - 1)?.0 == last)
}

/// Offset of `field_id` relative to the object start, through the shared
/// schema cache.
pub(crate) fn resolve_offset(object: &BinaryObject, field_id: u32) -> Result<Option<usize>> {
    let count = object.field_count();
    if count == 0 {
        return Ok(None);
    }

    let schemas = object.context().schemas();
    let (type_id, schema_id) = (object.type_id(), object.schema_id());

    if let Some(schema) = schemas.get(type_id, schema_id) {
        if schema.len() == count {
            match schema.order(field_id) {
                None => {
                    let ids = schema.field_ids();
                    if footer_ends_match(object, ids[0], ids[ids.len() - 1])? {
                        return Ok(None);
                    }
                }
                Some(slot) => {
                    let (id, offset) = object.footer_entry(slot)?;
                    if id == field_id {
                        return Ok(Some(offset));
                    }
                }
            }
        }
        log::warn!(
            "[resolver] cached schema {:#010x} of type {:#010x} does not match footer, scanning",
            schema_id,
            type_id
        );
        return Ok(scan_footer(object, field_id)?.map(|(_, offset)| offset));
    }

    let schema = Schema::new(object.field_ids()?);
    let slot = schema.order(field_id);
    if schema.id() == schema_id {
        schemas.insert(type_id, schema);
    } else {
        log::warn!(
            "[resolver] header schema id {:#010x} differs from footer layout {:#010x} (type {:#010x})",
            schema_id,
            schema.id(),
            type_id
        );
    }
    match slot {
        Some(slot) => Ok(Some(object.footer_entry(slot)?.1)),
        None => Ok(None),
    }
}

/// Build an instant from epoch milliseconds plus extra nanoseconds.
fn instant(millis: i64, nanos: u32) -> Option<DateTime<Utc>> {
    let secs = millis.div_euclid(1000);
    let sub_millis = millis.rem_euclid(1000) as u32;
    DateTime::from_timestamp(secs, sub_millis * 1_000_000 + nanos)
}

/// Decode the value stored at `offset` (relative to the object start).
///
/// Dispatches on the stored tag only. Reads are confined to the object's
/// field region.
pub(crate) fn decode_value_at(object: &BinaryObject, offset: usize) -> Result<Value> {
    let footer_offset = object.footer_offset();
    if offset < HEADER_LEN || offset >= footer_offset {
        return Err(Error::corrupt(
            object.start() + offset,
            format!(
                "field offset {} outside field region [{}, {})",
                offset, HEADER_LEN, footer_offset
            ),
        ));
    }

    let data = object.data();
    let region = &data[..object.start() + footer_offset];
    let pos = object.start() + offset;
    let mut cursor = Cursor::at(region, pos);

    let raw_tag = cursor.read_u8()?;
    let tag = TypeTag::from_u8(raw_tag)
        .ok_or_else(|| Error::corrupt(pos, format!("unknown value tag {}", raw_tag)))?;

    let value = match tag {
        TypeTag::Byte => Value::Byte(cursor.read_u8()? as i8),
        TypeTag::Bool => match cursor.read_u8()? {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            other => {
                return Err(Error::corrupt(
                    pos + 1,
                    format!("invalid boolean byte {}", other),
                ))
            }
        },
        TypeTag::Short => Value::Short(cursor.read_i16_le()?),
        TypeTag::Char => {
            let raw = cursor.read_u32_le()?;
            Value::Char(char::from_u32(raw).ok_or_else(|| {
                Error::corrupt(pos + 1, format!("invalid char scalar {:#x}", raw))
            })?)
        }
        TypeTag::Int => Value::Int(cursor.read_i32_le()?),
        TypeTag::Long => Value::Long(cursor.read_i64_le()?),
        TypeTag::Float => Value::Float(cursor.read_f32_le()?),
        TypeTag::Double => Value::Double(cursor.read_f64_le()?),
        TypeTag::String => {
            let bytes = cursor.read_len_prefixed()?;
            let text = std::str::from_utf8(bytes)
                .map_err(|e| Error::corrupt(pos + 5, format!("invalid UTF-8: {}", e)))?;
            Value::String(text.to_owned())
        }
        TypeTag::Uuid => {
            let mut bytes = [0u8; 16];
            bytes.copy_from_slice(cursor.read_bytes(16)?);
            Value::Uuid(Uuid::from_bytes(bytes))
        }
        TypeTag::Date => {
            let millis = cursor.read_i64_le()?;
            Value::Date(
                instant(millis, 0)
                    .ok_or_else(|| Error::corrupt(pos + 1, "date out of range"))?,
            )
        }
        TypeTag::Timestamp => {
            let millis = cursor.read_i64_le()?;
            let nanos = cursor.read_i32_le()?;
            let nanos = u32::try_from(nanos)
                .ok()
                .filter(|n| *n < 1_000_000)
                .ok_or_else(|| {
                    Error::corrupt(pos + 9, format!("invalid nanosecond part {}", nanos))
                })?;
            Value::Timestamp(
                instant(millis, nanos)
                    .ok_or_else(|| Error::corrupt(pos + 1, "timestamp out of range"))?,
            )
        }
        TypeTag::Decimal => {
            let scale = cursor.read_i32_le()?;
            let bytes = cursor.read_len_prefixed()?;
            Value::Decimal(Decimal::from_be_bytes(scale, bytes).ok_or_else(|| {
                Error::corrupt(
                    pos + 5,
                    format!("decimal magnitude of {} bytes unsupported", bytes.len()),
                )
            })?)
        }
        TypeTag::ByteArray => Value::ByteArray(cursor.read_len_prefixed()?.to_vec()),
        TypeTag::Null => Value::Null,
        TypeTag::Object => Value::Object(object.nested_at(pos, region.len())?),
    };
    Ok(value)
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reusable field accessor with a per-schema resolution cache.
//!
//! A descriptor remembers, for each schema id it has met, the footer slot of
//! its field (or that the field is absent). Byte offsets are not cached:
//! they move between instances of one schema when a variable-length field
//! comes first, while the slot does not.

use crate::error::{Error, Result};
use crate::object::{non_null, object_field, BinaryObject};
use crate::resolver;
use crate::schema::LookupStats;
use crate::value::{convert, FromValue, Value};
use dashmap::DashMap;
use parking_lot::RwLock;

/// Footer slot of the field in one schema, with enough of the layout to
/// check a cached absence against the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CachedSlot {
    slot: Option<u32>,
    field_count: u32,
    first_id: u32,
    last_id: u32,
}

/// Accessor for one field of one type.
///
/// `Send + Sync`; one descriptor can serve objects of many schema versions
/// from many threads.
///
/// # Example
///
/// ```rust
/// use portable::PortableMarshaller;
///
/// # fn main() -> portable::Result<()> {
/// let marshaller = PortableMarshaller::new();
/// let price = marshaller.field_descriptor("Order", "price");
///
/// for qty in 1..=3i32 {
///     let mut writer = marshaller.writer("Order");
///     writer.write("qty", qty)?.write("price", 9.5f64)?;
///     let order = writer.finish()?;
///     assert_eq!(price.value_as::<f64>(&order)?, Some(9.5));
/// }
/// assert_eq!(price.stats().hits, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FieldDescriptor {
    type_id: u32,
    field_id: u32,
    name: String,
    cache: DashMap<u32, CachedSlot>,
    stats: RwLock<LookupStats>,
}

impl FieldDescriptor {
    pub(crate) fn new(type_id: u32, field_id: u32, name: &str) -> Self {
        Self {
            type_id,
            field_id,
            name: name.to_owned(),
            cache: DashMap::new(),
            stats: RwLock::new(LookupStats::default()),
        }
    }

    pub fn type_id(&self) -> u32 {
        self.type_id
    }

    pub fn field_id(&self) -> u32 {
        self.field_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Offset of the field in `object` (relative to the object start).
    pub fn resolve_offset(&self, object: &BinaryObject) -> Result<Option<usize>> {
        if object.type_id() != self.type_id {
            return Err(Error::DescriptorTypeMismatch {
                expected: self.type_id,
                actual: object.type_id(),
            });
        }

        let count = object.field_count();
        if count == 0 {
            return Ok(None);
        }
        let schema_id = object.schema_id();

        let cached = self.cache.get(&schema_id).map(|entry| *entry.value());
        if let Some(cached) = cached {
            if cached.field_count as usize == count {
                match cached.slot {
                    None => {
                        if resolver::footer_ends_match(object, cached.first_id, cached.last_id)? {
                            self.stats.write().record_hit();
                            return Ok(None);
                        }
                    }
                    Some(slot) => {
                        let (id, offset) = object.footer_entry(slot as usize)?;
                        if id == self.field_id {
                            self.stats.write().record_hit();
                            return Ok(Some(offset));
                        }
                    }
                }
            }
            // Schema id collision: answer by scanning, keep the cached entry.
            log::warn!(
                "[descriptor] '{}': schema {:#010x} does not match cached layout, scanning",
                self.name,
                schema_id
            );
            self.stats.write().record_miss();
            return Ok(resolver::scan_footer(object, self.field_id)?.map(|(_, offset)| offset));
        }

        self.stats.write().record_miss();
        let found = resolver::scan_footer(object, self.field_id)?;
        let (first_id, _) = object.footer_entry(0)?;
        let (last_id, _) = object.footer_entry(count - 1)?;
        self.cache.insert(
            schema_id,
            CachedSlot {
                slot: found.map(|(slot, _)| slot as u32),
                field_count: count as u32,
                first_id,
                last_id,
            },
        );
        Ok(found.map(|(_, offset)| offset))
    }

    pub fn exists(&self, object: &BinaryObject) -> Result<bool> {
        Ok(self.resolve_offset(object)?.is_some())
    }

    /// Value of the field; `None` when missing or null.
    pub fn value(&self, object: &BinaryObject) -> Result<Option<Value>> {
        match self.resolve_offset(object)? {
            Some(offset) => Ok(non_null(resolver::decode_value_at(object, offset)?)),
            None => Ok(None),
        }
    }

    pub fn value_as<T: FromValue>(&self, object: &BinaryObject) -> Result<Option<T>> {
        self.value(object)?
            .map(|v| convert(&self.name, v))
            .transpose()
    }

    /// Nested object stored in the field.
    pub fn field(&self, object: &BinaryObject) -> Result<Option<BinaryObject>> {
        object_field(&self.name, self.value(object)?)
    }

    /// Number of schema ids with a cached resolution.
    pub fn cached_schemas(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn stats(&self) -> LookupStats {
        *self.stats.read()
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lazy handle over a serialized object.
//!
//! A [`BinaryObject`] owns its bytes through an `Arc<[u8]>` and decodes a
//! field only when it is asked for. Nested objects share the parent's bytes
//! and differ only by their start offset.

use crate::config::LENGTH_POS;
use crate::descriptor::FieldDescriptor;
use crate::error::{Error, Result};
use crate::marshaller::PortableContext;
use crate::portable::Portable;
use crate::record::Record;
use crate::resolver;
use crate::ser::{Cursor, Header};
use crate::value::{convert, FromValue, Value};
use std::fmt;
use std::sync::Arc;

/// Immutable, cheaply cloneable view of one serialized object.
#[derive(Clone)]
pub struct BinaryObject {
    ctx: Arc<PortableContext>,
    data: Arc<[u8]>,
    start: usize,
    header: Header,
}

#[allow(clippy::len_without_is_empty)]
impl BinaryObject {
    /// Handle over an object whose header is already known to be valid.
    pub(crate) fn from_parts(
        ctx: Arc<PortableContext>,
        data: Arc<[u8]>,
        start: usize,
        header: Header,
    ) -> Self {
        Self {
            ctx,
            data,
            start,
            header,
        }
    }

    /// Validate a complete buffer received from outside.
    pub(crate) fn from_bytes(ctx: Arc<PortableContext>, data: Arc<[u8]>) -> Result<Self> {
        let header = Header::parse(&data, 0)?;
        if header.length as usize != data.len() {
            return Err(Error::corrupt(
                LENGTH_POS,
                format!(
                    "buffer holds {} bytes, header declares {}",
                    data.len(),
                    header.length
                ),
            ));
        }
        if ctx.config().verify_hash {
            header.verify_hash(&data, 0)?;
        }
        log::trace!(
            "[object] accepted {} bytes of type {:#010x}, {} field(s)",
            data.len(),
            header.type_id,
            header.field_count()
        );
        Ok(Self::from_parts(ctx, data, 0, header))
    }

    /// Nested object starting at absolute position `pos`, which must end
    /// before `limit`.
    pub(crate) fn nested_at(&self, pos: usize, limit: usize) -> Result<Self> {
        let header = Header::parse(&self.data[..limit], pos)?;
        Ok(Self::from_parts(
            Arc::clone(&self.ctx),
            Arc::clone(&self.data),
            pos,
            header,
        ))
    }

    pub(crate) fn context(&self) -> &PortableContext {
        &self.ctx
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn start(&self) -> usize {
        self.start
    }

    pub(crate) fn footer_offset(&self) -> usize {
        self.header.footer_offset as usize
    }

    pub(crate) fn field_count(&self) -> usize {
        self.header.field_count()
    }

    /// `(field id, offset)` stored in footer slot `slot`.
    pub(crate) fn footer_entry(&self, slot: usize) -> Result<(u32, usize)> {
        let footer = self.start + self.footer_offset();
        if slot >= self.field_count() {
            return Err(Error::corrupt(
                footer,
                format!("footer slot {} out of {}", slot, self.field_count()),
            ));
        }
        let end = self.start + self.header.length as usize;
        let mut cursor = Cursor::at(&self.data[..end], footer + slot * self.header.entry_len());
        let id = cursor.read_u32_le()?;
        let offset = cursor.read_uint(self.header.offset_width())? as usize;
        Ok((id, offset))
    }

    fn field_id(&self, name: &str) -> u32 {
        self.ctx.mapper().field_id(self.header.type_id, name)
    }

    pub fn type_id(&self) -> u32 {
        self.header.type_id
    }

    pub fn schema_id(&self) -> u32 {
        self.header.schema_id
    }

    pub fn content_hash(&self) -> u32 {
        self.header.hash
    }

    /// Size of this object in bytes (header to end of footer).
    pub fn len(&self) -> usize {
        self.header.length as usize
    }

    /// This object's bytes. For a nested object, only its own span.
    pub fn bytes(&self) -> &[u8] {
        &self.data[self.start..self.start + self.len()]
    }

    /// Field ids in footer order.
    pub fn field_ids(&self) -> Result<Vec<u32>> {
        (0..self.field_count())
            .map(|slot| self.footer_entry(slot).map(|(id, _)| id))
            .collect()
    }

    /// Type name from the registered metadata, if any.
    pub fn type_name(&self) -> Option<String> {
        self.ctx
            .registry()
            .lookup(self.header.type_id)
            .map(|meta| meta.type_name.clone())
    }

    /// Whether the object carries `name` (an explicit null counts).
    pub fn exists(&self, name: &str) -> Result<bool> {
        self.exists_id(self.field_id(name))
    }

    pub fn exists_id(&self, field_id: u32) -> Result<bool> {
        Ok(resolver::resolve_offset(self, field_id)?.is_some())
    }

    /// Value of `name`; `None` when missing or null.
    pub fn value(&self, name: &str) -> Result<Option<Value>> {
        self.value_by_id(self.field_id(name))
    }

    /// Value by raw field id; works without any metadata.
    pub fn value_by_id(&self, field_id: u32) -> Result<Option<Value>> {
        match resolver::resolve_offset(self, field_id)? {
            Some(offset) => Ok(non_null(resolver::decode_value_at(self, offset)?)),
            None => Ok(None),
        }
    }

    /// Typed value of `name`; `FieldTypeMismatch` if the stored type differs.
    pub fn value_as<T: FromValue>(&self, name: &str) -> Result<Option<T>> {
        self.value(name)?.map(|v| convert(name, v)).transpose()
    }

    /// Nested object stored under `name`.
    pub fn field(&self, name: &str) -> Result<Option<BinaryObject>> {
        object_field(name, self.value(name)?)
    }

    /// Reusable accessor for `name` bound to this object's type.
    pub fn field_descriptor(&self, name: &str) -> FieldDescriptor {
        FieldDescriptor::new(self.header.type_id, self.field_id(name), name)
    }

    /// Decode every field into a [`Record`], in footer order.
    ///
    /// Needs metadata for the type and for every field id in the footer.
    /// A footer id without a known name makes the registry refresh from its
    /// metadata handler once. Nested objects stay lazy handles.
    pub fn deserialize(&self) -> Result<Record> {
        let type_id = self.header.type_id;
        let registry = self.ctx.registry();
        let mut meta = registry
            .lookup(type_id)
            .ok_or(Error::UnknownType { type_id })?;

        let entries = (0..self.field_count())
            .map(|slot| self.footer_entry(slot))
            .collect::<Result<Vec<_>>>()?;
        if entries.iter().any(|(id, _)| meta.field_name(*id).is_none()) {
            if let Some(fresh) = registry.refresh(type_id)? {
                meta = fresh;
            }
        }

        let mut record = Record::new(meta.type_name.as_str());
        for (field_id, offset) in entries {
            let name = meta
                .field_name(field_id)
                .ok_or(Error::UnknownField { type_id, field_id })?;
            record.set(name, resolver::decode_value_at(self, offset)?);
        }
        Ok(record)
    }

    /// Build a typed value through [`Portable::read_portable`].
    pub fn deserialize_as<T: Portable>(&self) -> Result<T> {
        T::read_portable(self)
    }
}

/// Null decodes to "no value".
pub(crate) fn non_null(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        other => Some(other),
    }
}

/// Narrow a field value to a nested object.
pub(crate) fn object_field(name: &str, value: Option<Value>) -> Result<Option<BinaryObject>> {
    match value {
        None => Ok(None),
        Some(Value::Object(object)) => Ok(Some(object)),
        Some(other) => Err(Error::FieldTypeMismatch {
            field: name.to_owned(),
            expected: "Object",
            found: other.type_name(),
        }),
    }
}

impl PartialEq for BinaryObject {
    fn eq(&self, other: &Self) -> bool {
        self.bytes() == other.bytes()
    }
}

impl Eq for BinaryObject {}

impl fmt::Debug for BinaryObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryObject")
            .field("type_id", &format_args!("{:#010x}", self.header.type_id))
            .field("schema_id", &format_args!("{:#010x}", self.header.schema_id))
            .field("len", &self.len())
            .field("fields", &self.field_count())
            .field("start", &self.start)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PortableConfig, HEADER_LEN};
    use crate::PortableMarshaller;

    fn sample(marshaller: &PortableMarshaller) -> BinaryObject {
        let mut inner = marshaller.writer("Inner");
        inner.write("val", 10i32).expect("val");
        let inner = inner.finish().expect("inner");

        let mut writer = marshaller.writer("Outer");
        writer.write("name", "outer").expect("name");
        writer.write("inner", inner).expect("inner");
        writer.write_null("nothing").expect("null");
        writer.finish().expect("outer")
    }

    #[test]
    fn test_null_versus_missing() {
        let marshaller = PortableMarshaller::new();
        let object = sample(&marshaller);

        assert!(object.exists("nothing").expect("exists"));
        assert_eq!(object.value("nothing").expect("value"), None);
        assert!(!object.exists("absent").expect("exists"));
        assert_eq!(object.value("absent").expect("value"), None);
    }

    #[test]
    fn test_nested_handle_shares_bytes() {
        let marshaller = PortableMarshaller::new();
        let object = sample(&marshaller);

        let inner = object.field("inner").expect("field").expect("present");
        assert!(Arc::ptr_eq(&inner.data, &object.data));
        assert!(inner.start > 0);
        assert_eq!(inner.value_as::<i32>("val").expect("val"), Some(10));
        assert_eq!(inner.type_name().as_deref(), Some("Inner"));
        assert!(!inner.exists("name").expect("exists"), "parent fields are not visible");
    }

    #[test]
    fn test_field_on_scalar_is_type_mismatch() {
        let marshaller = PortableMarshaller::new();
        let object = sample(&marshaller);
        assert!(matches!(
            object.field("name"),
            Err(Error::FieldTypeMismatch { expected: "Object", found: "String", .. })
        ));
        assert_eq!(object.field("nothing").expect("null"), None);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let marshaller = PortableMarshaller::new();
        let mut bytes = sample(&marshaller).bytes().to_vec();
        bytes.push(0);
        assert!(matches!(
            marshaller.to_binary(bytes),
            Err(Error::CorruptBuffer { offset, .. }) if offset == LENGTH_POS
        ));
    }

    #[test]
    fn test_hash_verification_can_be_disabled() {
        let lenient = PortableMarshaller::builder()
            .with_config(PortableConfig {
                verify_hash: false,
                ..PortableConfig::default()
            })
            .build()
            .expect("build");
        let strict = PortableMarshaller::new();

        let mut bytes = sample(&strict).bytes().to_vec();
        bytes[HEADER_LEN + 6] ^= 0x01; // inside the "outer" string
        assert!(strict.to_binary(bytes.clone()).is_err());
        assert!(lenient.to_binary(bytes).is_ok());
    }

    #[test]
    fn test_deserialize_keeps_footer_order() {
        let marshaller = PortableMarshaller::new();
        let record = sample(&marshaller).deserialize().expect("deserialize");
        let names: Vec<&str> = record.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["name", "inner", "nothing"]);
        assert_eq!(record.get("nothing"), Some(&Value::Null));
    }

    #[test]
    fn test_equality_is_byte_equality() {
        let marshaller = PortableMarshaller::new();
        let a = sample(&marshaller);
        let b = marshaller.to_binary(a.bytes().to_vec()).expect("copy");
        assert_eq!(a, b);
        assert_ne!(a, a.field("inner").expect("inner").expect("present"));
    }
}

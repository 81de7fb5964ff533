// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object writer: header, field values, footer.
//!
//! Field values are encoded into a scratch buffer as they are written; the
//! final layout (declared order, footer width, schema id, hash) is only
//! fixed by [`ObjectWriter::finish`].

use crate::config::{
    FIELD_ID_LEN, FLAG_HAS_SCHEMA, FLAG_OFFSET_ONE_BYTE, FLAG_OFFSET_TWO_BYTES, HEADER_LEN,
};
use crate::error::{Error, Result};
use crate::ids::fnv1a_32;
use crate::marshaller::PortableContext;
use crate::object::BinaryObject;
use crate::portable::Portable;
use crate::registry::TypeMetadata;
use crate::schema::Schema;
use crate::ser::{BufferWriter, Header};
use crate::tag::TypeTag;
use crate::value::Value;
use std::ops::Range;
use std::sync::Arc;

struct WrittenField {
    id: u32,
    name: String,
    tag: TypeTag,
    range: Range<usize>,
}

/// Serializes one object.
///
/// Obtained from [`crate::PortableMarshaller::writer`] or handed to
/// [`Portable::write_portable`].
pub struct ObjectWriter {
    ctx: Arc<PortableContext>,
    type_name: String,
    type_id: u32,
    body: BufferWriter,
    fields: Vec<WrittenField>,
}

impl ObjectWriter {
    pub(crate) fn new(ctx: Arc<PortableContext>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let type_id = ctx.mapper().type_id(&type_name);
        Self {
            ctx,
            type_name,
            type_id,
            body: BufferWriter::with_capacity(64),
            fields: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn type_id(&self) -> u32 {
        self.type_id
    }

    /// Write `value` under `name`.
    ///
    /// A `Value::Date` is truncated to millisecond precision, the precision
    /// it is stored with.
    pub fn write(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let value = match value.into() {
            Value::Date(instant) => Value::date(instant),
            other => other,
        };

        if let Some(config) = self.ctx.config().types.get(&self.type_name) {
            if config.fields.is_some() && config.declared_position(name).is_none() {
                return Err(Error::UndeclaredField {
                    type_name: self.type_name.clone(),
                    field: name.to_owned(),
                });
            }
        }

        let id = self.ctx.mapper().field_id(self.type_id, name);
        if let Some(previous) = self.fields.iter().find(|f| f.id == id) {
            return Err(if previous.name == name {
                Error::DuplicateField {
                    type_name: self.type_name.clone(),
                    field: name.to_owned(),
                }
            } else {
                Error::FieldIdCollision {
                    type_id: self.type_id,
                    field_id: id,
                    existing: previous.name.clone(),
                    conflicting: name.to_owned(),
                }
            });
        }

        let start = self.body.offset();
        value.encode(&mut self.body)?;
        self.fields.push(WrittenField {
            id,
            name: name.to_owned(),
            tag: value.type_tag(),
            range: start..self.body.offset(),
        });
        Ok(self)
    }

    /// Write an explicit null: the field exists but has no value.
    pub fn write_null(&mut self, name: &str) -> Result<&mut Self> {
        self.write(name, Value::Null)
    }

    /// Marshal `value` with its own writer and embed it inline.
    pub fn write_object<T: Portable>(&mut self, name: &str, value: &T) -> Result<&mut Self> {
        let mut nested = ObjectWriter::new(Arc::clone(&self.ctx), T::TYPE_NAME);
        value.write_portable(&mut nested)?;
        let object = nested.finish()?;
        self.write(name, Value::Object(object))
    }

    /// Lay out the object, register its metadata and schema, and return it.
    pub fn finish(mut self) -> Result<BinaryObject> {
        if let Some(config) = self.ctx.config().types.get(&self.type_name) {
            if config.fields.is_some() {
                self.fields
                    .sort_by_key(|f| config.declared_position(&f.name).unwrap_or(usize::MAX));
            }
        }

        let body = self.body.as_slice();
        let mut out = BufferWriter::with_capacity(
            HEADER_LEN + body.len() + self.fields.len() * (FIELD_ID_LEN + 4),
        );
        let header_pos = out.reserve_slot(HEADER_LEN);

        let mut offsets = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            offsets.push(out.offset());
            out.write_bytes(&body[field.range.clone()]);
        }
        let footer_offset = out.offset();

        let max_offset = offsets.last().copied().unwrap_or(0);
        let (flags, width) = if self.fields.is_empty() {
            (0, 0)
        } else if self.ctx.config().compact_footer && max_offset <= usize::from(u8::MAX) {
            (FLAG_HAS_SCHEMA | FLAG_OFFSET_ONE_BYTE, 1)
        } else if self.ctx.config().compact_footer && max_offset <= usize::from(u16::MAX) {
            (FLAG_HAS_SCHEMA | FLAG_OFFSET_TWO_BYTES, 2)
        } else {
            (FLAG_HAS_SCHEMA, 4)
        };

        for (field, offset) in self.fields.iter().zip(&offsets) {
            out.write_u32_le(field.id);
            out.write_uint(*offset as u32, width);
        }

        let length = out.offset();
        let length32 = u32::try_from(length).map_err(|_| Error::BufferTooLarge { size: length })?;

        let schema = Schema::new(self.fields.iter().map(|f| f.id).collect());
        let header = Header {
            flags,
            type_id: self.type_id,
            hash: fnv1a_32(&out.as_slice()[HEADER_LEN..footer_offset]),
            length: length32,
            schema_id: schema.id(),
            footer_offset: footer_offset as u32,
        };
        header.write_into(&mut out, header_pos);

        let mut meta =
            TypeMetadata::new(self.type_id, self.type_name.as_str()).with_schema(schema.id());
        for field in &self.fields {
            meta = meta.with_field(field.id, field.name.as_str(), field.tag.name());
        }
        self.ctx.registry().register(meta)?;
        if !schema.is_empty() {
            self.ctx.schemas().insert(self.type_id, schema);
        }

        log::trace!(
            "[writer] '{}' -> {} bytes, {} field(s), schema {:#010x}",
            self.type_name,
            length,
            self.fields.len(),
            header.schema_id
        );

        let data: Arc<[u8]> = out.into_bytes().into();
        Ok(BinaryObject::from_parts(self.ctx, data, 0, header))
    }
}

impl std::fmt::Debug for ObjectWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectWriter")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PortableConfig, TypeConfiguration, FOOTER_OFFSET_POS};
    use crate::ids::{IdMapper, LowerCaseFnvMapper};
    use crate::PortableMarshaller;

    fn marshaller_with(config: PortableConfig) -> PortableMarshaller {
        PortableMarshaller::builder()
            .with_config(config)
            .build()
            .expect("valid config")
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let marshaller = PortableMarshaller::new();
        let mut writer = marshaller.writer("T");
        writer.write("a", 1i32).expect("first write");
        let err = writer.write("a", 2i32).map(|_| ()).expect_err("duplicate");
        assert!(matches!(err, Error::DuplicateField { .. }));
    }

    #[test]
    fn test_case_variant_names_collide_in_one_object() {
        let marshaller = PortableMarshaller::new();
        let mut writer = marshaller.writer("T");
        writer.write("fInt", 1i32).expect("first write");
        let err = writer.write("FINT", 2i32).map(|_| ()).expect_err("collision");
        assert!(matches!(err, Error::FieldIdCollision { .. }));
    }

    #[test]
    fn test_declared_order_wins_over_call_order() {
        let mut config = PortableConfig::default();
        config
            .types
            .add(TypeConfiguration::new("Point").with_fields(["x", "y", "z"]))
            .expect("config");
        let marshaller = marshaller_with(config);

        let mut writer = marshaller.writer("Point");
        writer.write("z", 3i32).expect("z");
        writer.write("x", 1i32).expect("x");
        let object = writer.finish().expect("finish");

        let mapper = LowerCaseFnvMapper;
        let tid = mapper.type_id("Point");
        assert_eq!(
            object.field_ids().expect("footer"),
            vec![mapper.field_id(tid, "x"), mapper.field_id(tid, "z")]
        );

        let mut writer = marshaller.writer("Point");
        let err = writer.write("w", 0i32).map(|_| ()).expect_err("undeclared");
        assert!(matches!(err, Error::UndeclaredField { .. }));
    }

    #[test]
    fn test_empty_object_has_no_footer() {
        let marshaller = PortableMarshaller::new();
        let object = marshaller.writer("Empty").finish().expect("finish");
        assert_eq!(object.len(), HEADER_LEN);
        assert_eq!(object.schema_id(), crate::config::EMPTY_SCHEMA_ID);
        assert!(object.field_ids().expect("footer").is_empty());
    }

    #[test]
    fn test_footer_width_follows_object_size() {
        let marshaller = PortableMarshaller::new();
        let mut writer = marshaller.writer("Blob");
        writer.write("payload", vec![0u8; 300]).expect("payload");
        writer.write("tail", 1i32).expect("tail");
        let object = writer.finish().expect("finish");
        let flags = u16::from_le_bytes([object.bytes()[2], object.bytes()[3]]);
        assert_eq!(crate::config::offset_width(flags), 2);

        let wide = marshaller_with(PortableConfig {
            compact_footer: false,
            ..PortableConfig::default()
        });
        let mut writer = wide.writer("Small");
        writer.write("a", 1i8).expect("a");
        let object = writer.finish().expect("finish");
        let footer = u32::from_le_bytes(
            object.bytes()[FOOTER_OFFSET_POS..FOOTER_OFFSET_POS + 4]
                .try_into()
                .expect("4 bytes"),
        ) as usize;
        assert_eq!(object.len() - footer, FIELD_ID_LEN + 4);
    }

    #[test]
    fn test_identical_writes_are_byte_identical() {
        let marshaller = PortableMarshaller::new();
        let build = || {
            let mut writer = marshaller.writer("T");
            writer.write("a", 1i32).expect("a");
            writer.write("b", "two").expect("b");
            writer.write_null("c").expect("c");
            writer.finish().expect("finish")
        };
        assert_eq!(build().bytes(), build().bytes());
    }

    #[test]
    fn test_finish_registers_metadata_and_schema() {
        let marshaller = PortableMarshaller::new();
        let mut writer = marshaller.writer("Reg");
        writer.write("a", 1i32).expect("a");
        let object = writer.finish().expect("finish");

        let meta = marshaller.registry().lookup(object.type_id()).expect("metadata");
        assert_eq!(meta.type_name, "Reg");
        assert!(meta.schemas.contains(&object.schema_id()));
        assert!(marshaller
            .schema_cache()
            .contains(object.type_id(), object.schema_id()));
    }
}

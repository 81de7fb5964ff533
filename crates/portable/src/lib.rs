// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Portable - self-describing binary objects
//!
//! A compact binary object format whose fields can be read one at a time
//! without deserializing the whole object, and whose readers keep working
//! when writers add, remove or reorder fields.
//!
//! ## Quick Start
//!
//! ```rust
//! use portable::{PortableMarshaller, Result};
//!
//! fn main() -> Result<()> {
//!     let marshaller = PortableMarshaller::new();
//!
//!     let mut writer = marshaller.writer("Trade");
//!     writer.write("symbol", "ACME")?.write("qty", 100i32)?.write_null("note")?;
//!     let trade = writer.finish()?;
//!
//!     // Only "qty" is decoded.
//!     assert_eq!(trade.value_as::<i32>("qty")?, Some(100));
//!
//!     // Present-but-null and missing are told apart by `exists`.
//!     assert!(trade.exists("note")?);
//!     assert!(!trade.exists("price")?);
//!     assert_eq!(trade.value("note")?, None);
//!     Ok(())
//! }
//! ```
//!
//! ## Object Layout
//!
//! ```text
//! +------------------+-----------------------------+---------------------------+
//! | header (24 B)    | field values (tag + bytes)  | footer: (field id, offset)|
//! | tag, type, hash, | in declared or write order  | per present field         |
//! | len, schema, ftr |                             |                           |
//! +------------------+-----------------------------+---------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PortableMarshaller`] | Entry point: writers, validation, descriptors |
//! | [`ObjectWriter`] | Serializes one object |
//! | [`BinaryObject`] | Lazy handle over serialized bytes |
//! | [`FieldDescriptor`] | Reusable field accessor with per-schema cache |
//! | [`MetadataRegistry`] | Field names and schemas known per type |
//! | [`SchemaCache`] | LRU of `(type, schema)` layouts |
//!
//! ## Modules Overview
//!
//! - [`config`] - wire constants and runtime configuration
//! - [`registry`] - type metadata and metadata handlers
//! - [`schema`] - schemas and the schema cache
//! - [`value`] - dynamic values

/// Wire constants, runtime configuration and YAML loader.
pub mod config;
/// Reusable field accessors.
pub mod descriptor;
/// Error taxonomy.
pub mod error;
/// Type, field and schema id derivation.
pub mod ids;
/// Marshaller entry points.
pub mod marshaller;
/// Lazy object handles.
pub mod object;
/// Typed `Portable` trait.
pub mod portable;
/// Dynamic records.
pub mod record;
/// Type metadata registry.
pub mod registry;
mod resolver;
/// Schemas and the schema cache.
pub mod schema;
/// Little-endian cursors and the object header.
pub mod ser;
/// Value type tags.
pub mod tag;
/// Dynamic values.
pub mod value;
/// Object writer.
pub mod writer;

pub use config::{PortableConfig, TypeConfiguration, TypeConfigurations};
pub use descriptor::FieldDescriptor;
pub use error::{Error, Result};
pub use ids::{IdMapper, LowerCaseFnvMapper};
pub use marshaller::{PortableMarshaller, PortableMarshallerBuilder};
pub use object::BinaryObject;
pub use portable::Portable;
pub use record::Record;
pub use registry::{
    FieldMeta, InMemoryMetadataHandler, MetadataHandler, MetadataRegistry, NoopMetadataHandler,
    TypeMetadata,
};
pub use schema::{LookupStats, Schema, SchemaCache};
pub use tag::TypeTag;
pub use value::{Decimal, FromValue, Value};
pub use writer::ObjectWriter;

#[cfg(feature = "config-loaders")]
pub use config::TypeConfigLoader;

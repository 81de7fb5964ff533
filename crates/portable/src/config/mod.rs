// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Portable format configuration - single source of truth.
//!
//! This module centralizes the wire-format constants and the runtime
//! configuration of a marshaller. **Never hardcode header offsets elsewhere!**
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: Compile-time constants (header layout, flags, tags)
//! - **Level 2 (Dynamic)**: [`PortableConfig`] (footer compaction, hash
//!   verification, schema cache size, per-type configuration)
//!
//! # Example
//!
//! ```rust
//! use portable::config::{PortableConfig, TypeConfiguration};
//!
//! let mut config = PortableConfig::default();
//! config
//!     .types
//!     .add(TypeConfiguration::new("Point").with_fields(["x", "y"]))
//!     .unwrap();
//! assert!(config.types.get("Point").is_some());
//! ```

#[cfg(feature = "config-loaders")]
mod loader;

#[cfg(feature = "config-loaders")]
pub use loader::{TypeConfigLoader, YamlConfigDocument, YamlTypeEntry};

use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

// =======================================================================
// Header layout
// =======================================================================

/// First byte of every serialized object (also the nested-object value tag).
pub const OBJECT_TAG: u8 = 0x67;

/// Wire protocol version written at offset 1.
pub const PROTOCOL_VERSION: u8 = 1;

/// Fixed header length in bytes.
pub const HEADER_LEN: usize = 24;

/// Offset of the protocol version byte.
pub const VERSION_POS: usize = 1;
/// Offset of the `u16` flags.
pub const FLAGS_POS: usize = 2;
/// Offset of the `u32` type id.
pub const TYPE_ID_POS: usize = 4;
/// Offset of the `u32` content hash.
pub const HASH_POS: usize = 8;
/// Offset of the `u32` total length.
pub const LENGTH_POS: usize = 12;
/// Offset of the `u32` schema id.
pub const SCHEMA_ID_POS: usize = 16;
/// Offset of the `u32` footer offset.
pub const FOOTER_OFFSET_POS: usize = 20;

// =======================================================================
// Header flags
// =======================================================================

/// Object carries a footer (at least one field).
pub const FLAG_HAS_SCHEMA: u16 = 0x0002;
/// Footer offsets are 1 byte wide.
pub const FLAG_OFFSET_ONE_BYTE: u16 = 0x0008;
/// Footer offsets are 2 bytes wide.
pub const FLAG_OFFSET_TWO_BYTES: u16 = 0x0010;

/// Size of a field id inside a footer entry.
pub const FIELD_ID_LEN: usize = 4;

/// Schema id of an object without fields.
pub const EMPTY_SCHEMA_ID: u32 = 0;

/// Default number of `(type, schema)` entries kept by the schema cache.
pub const DEFAULT_SCHEMA_CACHE_CAPACITY: usize = 1024;

/// Width in bytes of footer offsets for the given header flags.
#[inline]
pub const fn offset_width(flags: u16) -> usize {
    if flags & FLAG_OFFSET_ONE_BYTE != 0 {
        1
    } else if flags & FLAG_OFFSET_TWO_BYTES != 0 {
        2
    } else {
        4
    }
}

// =======================================================================
// Runtime configuration
// =======================================================================

/// Per-type writer configuration.
///
/// When `fields` is set, writers emit fields in this declared order no matter
/// the order of the write calls, and reject fields that are not listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeConfiguration {
    pub type_name: String,
    pub fields: Option<Vec<String>>,
}

impl TypeConfiguration {
    /// Configuration for a type without a declared field list.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: None,
        }
    }

    /// Declare the field order.
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Position of `field` in the declared order.
    pub fn declared_position(&self, field: &str) -> Option<usize> {
        self.fields.as_ref()?.iter().position(|f| f == field)
    }

    fn validate(&self) -> Result<()> {
        if self.type_name.is_empty() {
            return Err(Error::InvalidConfig("type name must not be empty".into()));
        }
        if let Some(fields) = &self.fields {
            let mut seen = HashSet::with_capacity(fields.len());
            for field in fields {
                if field.is_empty() {
                    return Err(Error::InvalidConfig(format!(
                        "type '{}' declares an empty field name",
                        self.type_name
                    )));
                }
                if !seen.insert(field.as_str()) {
                    return Err(Error::InvalidConfig(format!(
                        "type '{}' declares field '{}' twice",
                        self.type_name, field
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Type configurations keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct TypeConfigurations {
    types: HashMap<String, TypeConfiguration>,
}

impl TypeConfigurations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a type configuration after validating it.
    pub fn add(&mut self, config: TypeConfiguration) -> Result<()> {
        config.validate()?;
        self.types.insert(config.type_name.clone(), config);
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeConfiguration> {
        self.types.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeConfiguration> {
        self.types.values()
    }
}

/// Runtime configuration of a [`crate::PortableMarshaller`].
#[derive(Debug, Clone)]
pub struct PortableConfig {
    /// Store footer offsets with the smallest width that fits (1, 2 or 4 bytes).
    pub compact_footer: bool,
    /// Verify the content hash of buffers entering through `to_binary`.
    pub verify_hash: bool,
    /// Capacity of the `(type, schema)` LRU cache.
    pub schema_cache_capacity: usize,
    /// Per-type writer configuration.
    pub types: TypeConfigurations,
}

impl Default for PortableConfig {
    fn default() -> Self {
        Self {
            compact_footer: true,
            verify_hash: true,
            schema_cache_capacity: DEFAULT_SCHEMA_CACHE_CAPACITY,
            types: TypeConfigurations::new(),
        }
    }
}

impl PortableConfig {
    /// Check invariants that cannot be expressed in the type system.
    pub fn validate(&self) -> Result<()> {
        if self.schema_cache_capacity == 0 {
            return Err(Error::InvalidConfig(
                "schema_cache_capacity must be greater than 0".into(),
            ));
        }
        for config in self.types.iter() {
            config.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_width_from_flags() {
        assert_eq!(offset_width(FLAG_HAS_SCHEMA | FLAG_OFFSET_ONE_BYTE), 1);
        assert_eq!(offset_width(FLAG_HAS_SCHEMA | FLAG_OFFSET_TWO_BYTES), 2);
        assert_eq!(offset_width(FLAG_HAS_SCHEMA), 4);
    }

    #[test]
    fn test_header_positions_fit_header() {
        assert_eq!(FOOTER_OFFSET_POS + 4, HEADER_LEN);
        assert!(TYPE_ID_POS < HASH_POS && HASH_POS < LENGTH_POS);
    }

    #[test]
    fn test_declared_position() {
        let cfg = TypeConfiguration::new("Point").with_fields(["x", "y"]);
        assert_eq!(cfg.declared_position("y"), Some(1));
        assert_eq!(cfg.declared_position("z"), None);
        assert_eq!(TypeConfiguration::new("Free").declared_position("x"), None);
    }

    #[test]
    fn test_duplicate_declared_field_rejected() {
        let mut types = TypeConfigurations::new();
        let err = types
            .add(TypeConfiguration::new("Point").with_fields(["x", "x"]))
            .expect_err("duplicate field must be rejected");
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(types.is_empty());
    }

    #[test]
    fn test_zero_cache_capacity_rejected() {
        let config = PortableConfig {
            schema_cache_capacity: 0,
            ..PortableConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(PortableConfig::default().validate().is_ok());
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for portable object encoding, decoding and metadata.
//!
//! A missing field is never an error: [`crate::BinaryObject::exists`] returns
//! `false` and [`crate::BinaryObject::value`] returns `Ok(None)`.

use std::fmt;

/// Errors returned by portable object operations.
///
/// # Example
///
/// ```rust
/// use portable::{Error, PortableMarshaller};
///
/// let marshaller = PortableMarshaller::new();
/// match marshaller.to_binary(vec![0u8; 3]) {
///     Err(Error::CorruptBuffer { offset, reason }) => println!("corrupt at {}: {}", offset, reason),
///     Err(e) => println!("other error: {}", e),
///     Ok(_) => println!("valid"),
/// }
/// ```
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Metadata Errors
    // ========================================================================
    /// No metadata is registered for the type id found in a buffer.
    ///
    /// Fatal for full deserialization only; raw field-id access still works.
    UnknownType { type_id: u32 },
    /// A footer field id has no known name in the type metadata.
    UnknownField { type_id: u32, field_id: u32 },
    /// Two different field names hash to the same field id within one type.
    FieldIdCollision {
        type_id: u32,
        field_id: u32,
        existing: String,
        conflicting: String,
    },

    // ========================================================================
    // Data Errors
    // ========================================================================
    /// Length/hash mismatch, truncated footer, bad tag or out-of-bounds offset.
    CorruptBuffer { offset: usize, reason: String },
    /// The caller asked for a concrete type incompatible with the stored tag.
    FieldTypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A field descriptor was used with an object of another type.
    DescriptorTypeMismatch { expected: u32, actual: u32 },
    /// Serialized object would exceed the 32-bit length limit.
    BufferTooLarge { size: usize },

    // ========================================================================
    // Writer Errors
    // ========================================================================
    /// The same field was written twice into one object.
    DuplicateField { type_name: String, field: String },
    /// A field outside the configured field list was written.
    UndeclaredField { type_name: String, field: String },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Type configuration is invalid.
    InvalidConfig(String),
    /// Configuration file not found at specified path.
    ConfigFileNotFound(String),
}

impl Error {
    /// Shorthand for [`Error::CorruptBuffer`].
    pub(crate) fn corrupt(offset: usize, reason: impl Into<String>) -> Self {
        Error::CorruptBuffer {
            offset,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Metadata
            Error::UnknownType { type_id } => {
                write!(f, "Unknown type: no metadata for type id {:#010x}", type_id)
            }
            Error::UnknownField { type_id, field_id } => write!(
                f,
                "Unknown field id {:#010x} in type {:#010x}",
                field_id, type_id
            ),
            Error::FieldIdCollision {
                type_id,
                field_id,
                existing,
                conflicting,
            } => write!(
                f,
                "Field id collision in type {:#010x}: '{}' and '{}' both map to {:#010x}",
                type_id, existing, conflicting, field_id
            ),
            // Data
            Error::CorruptBuffer { offset, reason } => {
                write!(f, "Corrupt buffer at offset {}: {}", offset, reason)
            }
            Error::FieldTypeMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "Field '{}' type mismatch: expected {}, found {}",
                field, expected, found
            ),
            Error::DescriptorTypeMismatch { expected, actual } => write!(
                f,
                "Field descriptor bound to type {:#010x} used with object of type {:#010x}",
                expected, actual
            ),
            Error::BufferTooLarge { size } => {
                write!(f, "Object too large: {} bytes (max {})", size, u32::MAX)
            }
            // Writer
            Error::DuplicateField { type_name, field } => {
                write!(f, "Field '{}' written twice in type '{}'", field, type_name)
            }
            Error::UndeclaredField { type_name, field } => write!(
                f,
                "Field '{}' is not declared in the configuration of type '{}'",
                field, type_name
            ),
            // Configuration
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::ConfigFileNotFound(path) => write!(f, "Config file not found: {}", path),
        }
    }
}

impl std::error::Error for Error {}

/// Convenient alias for results using the crate [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_variants() {
        let err = Error::corrupt(12, "footer truncated");
        assert_eq!(err.to_string(), "Corrupt buffer at offset 12: footer truncated");

        let err = Error::UnknownType { type_id: 0xAB };
        assert_eq!(
            err.to_string(),
            "Unknown type: no metadata for type id 0x000000ab"
        );

        let err = Error::FieldTypeMismatch {
            field: "fInt".into(),
            expected: "String",
            found: "Int",
        };
        assert_eq!(
            err.to_string(),
            "Field 'fInt' type mismatch: expected String, found Int"
        );
    }

    #[test]
    fn test_collision_message_names_both_fields() {
        let err = Error::FieldIdCollision {
            type_id: 1,
            field_id: 2,
            existing: "fInt".into(),
            conflicting: "FINT".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'fInt'"));
        assert!(msg.contains("'FINT'"));
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value type tags written in front of every field value.

use crate::config::OBJECT_TAG;

/// Tag identifying the encoding of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    /// Signed 8-bit integer (1 byte)
    Byte = 1,
    /// Signed 16-bit integer (2 bytes)
    Short = 2,
    /// Signed 32-bit integer (4 bytes)
    Int = 3,
    /// Signed 64-bit integer (8 bytes)
    Long = 4,
    /// 32-bit IEEE float (4 bytes)
    Float = 5,
    /// 64-bit IEEE float (8 bytes)
    Double = 6,
    /// Unicode scalar value (4 bytes)
    Char = 7,
    /// Boolean (1 byte, 0 or 1)
    Bool = 8,
    /// `u32` length + UTF-8 bytes
    String = 9,
    /// 16 bytes, RFC 4122 order
    Uuid = 10,
    /// `i64` epoch milliseconds
    Date = 11,
    /// `u32` length + raw bytes
    ByteArray = 12,
    /// `i32` scale + `u32` length + big-endian two's complement unscaled value
    Decimal = 30,
    /// `i64` epoch milliseconds + `i32` nanoseconds within the millisecond
    Timestamp = 33,
    /// Explicit null (no payload)
    Null = 101,
    /// Embedded complete object
    Object = OBJECT_TAG,
}

impl TypeTag {
    /// Convert from the wire byte.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(TypeTag::Byte),
            2 => Some(TypeTag::Short),
            3 => Some(TypeTag::Int),
            4 => Some(TypeTag::Long),
            5 => Some(TypeTag::Float),
            6 => Some(TypeTag::Double),
            7 => Some(TypeTag::Char),
            8 => Some(TypeTag::Bool),
            9 => Some(TypeTag::String),
            10 => Some(TypeTag::Uuid),
            11 => Some(TypeTag::Date),
            12 => Some(TypeTag::ByteArray),
            30 => Some(TypeTag::Decimal),
            33 => Some(TypeTag::Timestamp),
            101 => Some(TypeTag::Null),
            OBJECT_TAG => Some(TypeTag::Object),
            _ => None,
        }
    }

    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Payload size for fixed-width tags, `None` for variable-length ones.
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            TypeTag::Byte | TypeTag::Bool => Some(1),
            TypeTag::Short => Some(2),
            TypeTag::Int | TypeTag::Float | TypeTag::Char => Some(4),
            TypeTag::Long | TypeTag::Double | TypeTag::Date => Some(8),
            TypeTag::Timestamp => Some(12),
            TypeTag::Uuid => Some(16),
            TypeTag::Null => Some(0),
            TypeTag::String | TypeTag::ByteArray | TypeTag::Decimal | TypeTag::Object => None,
        }
    }

    /// Name used in metadata and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::Byte => "Byte",
            TypeTag::Short => "Short",
            TypeTag::Int => "Int",
            TypeTag::Long => "Long",
            TypeTag::Float => "Float",
            TypeTag::Double => "Double",
            TypeTag::Char => "Char",
            TypeTag::Bool => "Bool",
            TypeTag::String => "String",
            TypeTag::Uuid => "Uuid",
            TypeTag::Date => "Date",
            TypeTag::ByteArray => "ByteArray",
            TypeTag::Decimal => "Decimal",
            TypeTag::Timestamp => "Timestamp",
            TypeTag::Null => "Null",
            TypeTag::Object => "Object",
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

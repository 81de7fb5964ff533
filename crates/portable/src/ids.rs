// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type, field and schema identifiers.
//!
//! Type ids and field ids are 32-bit FNV-1a hashes of the lower-cased name,
//! so `"TestObject"` and `"testobject"` share an id. The schema id is the
//! FNV-1a hash of the ordered field ids of one concrete layout.

/// FNV-1a 32-bit offset basis (standard constant).
pub const FNV1A_OFFSET_BASIS_32: u32 = 0x811c_9dc5;
/// FNV-1a 32-bit prime (standard constant).
pub const FNV1A_PRIME_32: u32 = 0x0100_0193;

/// FNV-1a over raw bytes.
#[inline]
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    fnv1a_32_extend(FNV1A_OFFSET_BASIS_32, bytes)
}

#[inline]
fn fnv1a_32_extend(mut hash: u32, bytes: &[u8]) -> u32 {
    for &byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV1A_PRIME_32);
    }
    hash
}

/// FNV-1a of the lower-cased name, without allocating.
fn lowercase_hash(name: &str) -> u32 {
    let mut hash = FNV1A_OFFSET_BASIS_32;
    let mut buf = [0u8; 4];
    for ch in name.chars().flat_map(char::to_lowercase) {
        hash = fnv1a_32_extend(hash, ch.encode_utf8(&mut buf).as_bytes());
    }
    hash
}

/// Schema id of an ordered field id list.
pub fn schema_id(field_ids: &[u32]) -> u32 {
    if field_ids.is_empty() {
        return crate::config::EMPTY_SCHEMA_ID;
    }
    field_ids
        .iter()
        .fold(FNV1A_OFFSET_BASIS_32, |hash, id| {
            fnv1a_32_extend(hash, &id.to_le_bytes())
        })
}

/// Maps type and field names to numeric ids.
///
/// Every process reading or writing a type must use the same mapping.
pub trait IdMapper: Send + Sync {
    /// Id of a logical type name.
    fn type_id(&self, type_name: &str) -> u32;

    /// Id of a field name within the type `type_id`.
    fn field_id(&self, type_id: u32, field_name: &str) -> u32;
}

/// Default mapper: FNV-1a of the lower-cased name, same scheme for all types.
#[derive(Debug, Default, Clone, Copy)]
pub struct LowerCaseFnvMapper;

impl IdMapper for LowerCaseFnvMapper {
    fn type_id(&self, type_name: &str) -> u32 {
        lowercase_hash(type_name)
    }

    fn field_id(&self, _type_id: u32, field_name: &str) -> u32 {
        lowercase_hash(field_name)
    }
}

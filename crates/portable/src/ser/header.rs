// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed 24-byte object header.
//!
//! ```text
//!  0       1       2               4               8
//! +-------+-------+---------------+---------------+---------------+
//! |  tag  |  ver  |     flags     |    type_id    |     hash      |
//! +-------+-------+---------------+---------------+---------------+
//! 12              16              20              24
//! +---------------+---------------+---------------+
//! |    length     |   schema_id   | footer_offset |
//! +---------------+---------------+---------------+
//! ```
//!
//! All offsets stored in an object (footer offset, footer entries) are
//! relative to the object's first byte, so a nested object can be read in
//! place from inside its parent.

use super::cursor::{BufferWriter, Cursor};
use crate::config::{
    offset_width, FIELD_ID_LEN, FLAGS_POS, FLAG_HAS_SCHEMA, FOOTER_OFFSET_POS, HASH_POS,
    HEADER_LEN, LENGTH_POS, OBJECT_TAG, PROTOCOL_VERSION, SCHEMA_ID_POS, TYPE_ID_POS,
    VERSION_POS,
};
use crate::error::{Error, Result};
use crate::ids::fnv1a_32;

/// Decoded object header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub flags: u16,
    pub type_id: u32,
    pub hash: u32,
    pub length: u32,
    pub schema_id: u32,
    pub footer_offset: u32,
}

impl Header {
    /// Parse the header of the object starting at `start` and check that the
    /// declared layout fits in `bytes`.
    pub fn parse(bytes: &[u8], start: usize) -> Result<Self> {
        let available = bytes.len().saturating_sub(start);
        if available < HEADER_LEN {
            return Err(Error::corrupt(
                start,
                format!(
                    "header needs {} bytes, {} available",
                    HEADER_LEN, available
                ),
            ));
        }

        let mut cursor = Cursor::at(bytes, start);
        let tag = cursor.read_u8()?;
        if tag != OBJECT_TAG {
            return Err(Error::corrupt(
                start,
                format!("expected object tag {:#04x}, found {:#04x}", OBJECT_TAG, tag),
            ));
        }
        let version = cursor.read_u8()?;
        if version != PROTOCOL_VERSION {
            return Err(Error::corrupt(
                start + VERSION_POS,
                format!("unsupported protocol version {}", version),
            ));
        }

        let header = Self {
            flags: cursor.read_u16_le()?,
            type_id: cursor.read_u32_le()?,
            hash: cursor.read_u32_le()?,
            length: cursor.read_u32_le()?,
            schema_id: cursor.read_u32_le()?,
            footer_offset: cursor.read_u32_le()?,
        };
        header.check_layout(start, available)?;
        Ok(header)
    }

    fn check_layout(&self, start: usize, available: usize) -> Result<()> {
        let length = self.length as usize;
        if length < HEADER_LEN || length > available {
            return Err(Error::corrupt(
                start + LENGTH_POS,
                format!(
                    "object length {} outside [{}, {}]",
                    length, HEADER_LEN, available
                ),
            ));
        }

        let footer = self.footer_offset as usize;
        if footer < HEADER_LEN || footer > length {
            return Err(Error::corrupt(
                start + FOOTER_OFFSET_POS,
                format!(
                    "footer offset {} outside object of length {}",
                    footer, length
                ),
            ));
        }

        let footer_len = length - footer;
        if self.has_schema() {
            if footer_len == 0 || footer_len % self.entry_len() != 0 {
                return Err(Error::corrupt(
                    start + footer,
                    format!(
                        "footer length {} is not a multiple of entry size {}",
                        footer_len,
                        self.entry_len()
                    ),
                ));
            }
        } else if footer_len != 0 {
            return Err(Error::corrupt(
                start + footer,
                "object without schema carries a footer",
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn has_schema(&self) -> bool {
        self.flags & FLAG_HAS_SCHEMA != 0
    }

    /// Width in bytes of each footer offset.
    #[inline]
    pub fn offset_width(&self) -> usize {
        offset_width(self.flags)
    }

    /// Size of one `(field id, offset)` footer entry.
    #[inline]
    pub fn entry_len(&self) -> usize {
        FIELD_ID_LEN + self.offset_width()
    }

    /// Number of footer entries.
    pub fn field_count(&self) -> usize {
        if self.has_schema() {
            (self.length - self.footer_offset) as usize / self.entry_len()
        } else {
            0
        }
    }

    /// Compare the stored hash with the hash of the field region.
    ///
    /// `bytes[start..]` must already have passed [`Header::parse`].
    pub fn verify_hash(&self, bytes: &[u8], start: usize) -> Result<()> {
        let body = &bytes[start + HEADER_LEN..start + self.footer_offset as usize];
        let actual = fnv1a_32(body);
        if actual != self.hash {
            return Err(Error::corrupt(
                start + HASH_POS,
                format!(
                    "content hash mismatch: header {:#010x}, computed {:#010x}",
                    self.hash, actual
                ),
            ));
        }
        Ok(())
    }

    /// Fill a header slot previously reserved with
    /// [`BufferWriter::reserve_slot`].
    pub fn write_into(&self, out: &mut BufferWriter, pos: usize) {
        out.patch_u8(pos, OBJECT_TAG);
        out.patch_u8(pos + VERSION_POS, PROTOCOL_VERSION);
        out.patch_u16_le(pos + FLAGS_POS, self.flags);
        out.patch_u32_le(pos + TYPE_ID_POS, self.type_id);
        out.patch_u32_le(pos + HASH_POS, self.hash);
        out.patch_u32_le(pos + LENGTH_POS, self.length);
        out.patch_u32_le(pos + SCHEMA_ID_POS, self.schema_id);
        out.patch_u32_le(pos + FOOTER_OFFSET_POS, self.footer_offset);
    }
}

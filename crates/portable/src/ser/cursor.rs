// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read cursor and growable write buffer for little-endian encoding.

use crate::error::{Error, Result};

/// Generate read methods for primitive types.
///
/// Each generated method checks bounds (`CorruptBuffer` on overflow), reads
/// N bytes, converts via `from_le_bytes()` and advances the offset.
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> Result<$type> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.read_bytes($size)?);
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Generate write methods for primitive types.
///
/// Each generated method appends `to_le_bytes()` to the buffer.
macro_rules! impl_write_le {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.buffer.extend_from_slice(&value.to_le_bytes());
        }
    };
}

/// Immutable cursor for reading (bounds-checked, zero-copy).
///
/// Offsets are absolute positions in the wrapped slice, so errors report the
/// position inside the serialized object.
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Cursor positioned at `offset`.
    pub fn at(buffer: &'a [u8], offset: usize) -> Self {
        Self { buffer, offset }
    }

    impl_read_le!(read_u16_le, u16, 2);
    impl_read_le!(read_u32_le, u32, 4);
    impl_read_le!(read_u64_le, u64, 8);
    impl_read_le!(read_i16_le, i16, 2);
    impl_read_le!(read_i32_le, i32, 4);
    impl_read_le!(read_i64_le, i64, 8);

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_f32_le(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32_le()?))
    }

    pub fn read_f64_le(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64_le()?))
    }

    /// Read an unsigned integer of `width` bytes (1, 2 or 4).
    pub fn read_uint(&mut self, width: usize) -> Result<u32> {
        match width {
            1 => self.read_u8().map(u32::from),
            2 => self.read_u16_le().map(u32::from),
            4 => self.read_u32_le(),
            other => Err(Error::corrupt(
                self.offset,
                format!("invalid integer width {}", other),
            )),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(|| Error::corrupt(self.offset, "unexpected end of buffer"))?;
        let slice = &self.buffer[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    /// Read a `u32` length prefix followed by that many bytes.
    pub fn read_len_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32_le()? as usize;
        self.read_bytes(len)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}

/// Growable buffer for writing, with back-patching of reserved slots.
#[derive(Debug, Default)]
pub struct BufferWriter {
    buffer: Vec<u8>,
}

impl BufferWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    impl_write_le!(write_u16_le, u16);
    impl_write_le!(write_u32_le, u32);
    impl_write_le!(write_u64_le, u64);
    impl_write_le!(write_i16_le, i16);
    impl_write_le!(write_i32_le, i32);
    impl_write_le!(write_i64_le, i64);

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_f32_le(&mut self, value: f32) {
        self.write_u32_le(value.to_bits());
    }

    pub fn write_f64_le(&mut self, value: f64) {
        self.write_u64_le(value.to_bits());
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Write an unsigned integer using `width` bytes (1, 2 or 4).
    ///
    /// The caller guarantees `value` fits in `width`.
    pub fn write_uint(&mut self, value: u32, width: usize) {
        match width {
            1 => self.write_u8(value as u8),
            2 => self.write_u16_le(value as u16),
            _ => self.write_u32_le(value),
        }
    }

    /// Write a `u32` length prefix followed by `data`.
    pub fn write_len_prefixed(&mut self, data: &[u8]) -> Result<()> {
        let len = u32::try_from(data.len())
            .map_err(|_| Error::BufferTooLarge { size: data.len() })?;
        self.write_u32_le(len);
        self.write_bytes(data);
        Ok(())
    }

    /// Append `len` zero bytes and return their position for later patching.
    pub fn reserve_slot(&mut self, len: usize) -> usize {
        let pos = self.buffer.len();
        self.buffer.resize(pos + len, 0);
        pos
    }

    /// Overwrite 1 byte at `pos` (must lie inside a reserved slot).
    pub fn patch_u8(&mut self, pos: usize, value: u8) {
        self.buffer[pos] = value;
    }

    /// Overwrite 2 bytes at `pos` (must lie inside a reserved slot).
    pub fn patch_u16_le(&mut self, pos: usize, value: u16) {
        self.buffer[pos..pos + 2].copy_from_slice(&value.to_le_bytes());
    }

    /// Overwrite 4 bytes at `pos` (must lie inside a reserved slot).
    pub fn patch_u32_le(&mut self, pos: usize, value: u32) {
        self.buffer[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn offset(&self) -> usize {
        self.buffer.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

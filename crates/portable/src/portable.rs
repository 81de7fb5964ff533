// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed serialization without reflection.

use crate::error::Result;
use crate::object::BinaryObject;
use crate::writer::ObjectWriter;

/// A type that writes and reads its own fields.
///
/// # Example
///
/// ```rust
/// use portable::{BinaryObject, ObjectWriter, Portable, PortableMarshaller, Result};
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Portable for Point {
///     const TYPE_NAME: &'static str = "Point";
///
///     fn write_portable(&self, writer: &mut ObjectWriter) -> Result<()> {
///         writer.write("x", self.x)?.write("y", self.y)?;
///         Ok(())
///     }
///
///     fn read_portable(object: &BinaryObject) -> Result<Self> {
///         Ok(Point {
///             x: object.value_as("x")?.unwrap_or_default(),
///             y: object.value_as("y")?.unwrap_or_default(),
///         })
///     }
/// }
///
/// # fn main() -> Result<()> {
/// let marshaller = PortableMarshaller::new();
/// let object = marshaller.marshal(&Point { x: 1, y: 2 })?;
/// let back: Point = marshaller.unmarshal(object.bytes().to_vec())?;
/// assert_eq!(back, Point { x: 1, y: 2 });
/// # Ok(())
/// # }
/// ```
pub trait Portable: Sized {
    /// Logical type name; the type id is derived from it.
    const TYPE_NAME: &'static str;

    fn write_portable(&self, writer: &mut ObjectWriter) -> Result<()>;

    fn read_portable(object: &BinaryObject) -> Result<Self>;
}

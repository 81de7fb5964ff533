// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Low-level helpers for the portable wire format.

pub mod cursor;
pub mod header;

pub use cursor::{BufferWriter, Cursor};
pub use header::Header;

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! TL wire primitives.
//!
//! Layout (bit-exact, little-endian):
//! - `#`, `int`, magics: 4 bytes
//! - `long`, `double`: 8 bytes
//! - `string`, `bytes`: length header, payload, zero padding to a multiple of 4.
//!   Lengths up to 253 use a 1-byte header; longer payloads use `0xFE` followed
//!   by a 3-byte length.

mod error;
mod reader;
mod writer;

pub use error::WireError;
pub use reader::{Mark, Reader};
pub use writer::Writer;

/// Longest payload that fits the 1-byte length header.
pub const SHORT_LEN_MAX: usize = 253;

/// First byte of a 4-byte length header.
pub const LONG_LEN_MARKER: u8 = 0xFE;

/// Longest payload a 3-byte length can describe.
pub const LONG_LEN_MAX: usize = 0x00FF_FFFF;

/// Size of a magic number on the wire.
pub const MAGIC_SIZE: usize = 4;

/// Round `offset` up to the next multiple of 4.
#[inline]
pub fn align4(offset: usize) -> usize {
    (offset + 3) & !3
}

#[cfg(test)]
mod reader_tests;
#[cfg(test)]
mod writer_tests;

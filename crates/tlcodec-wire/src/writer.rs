//! Append-only output cursor.

use crate::{LONG_LEN_MARKER, LONG_LEN_MAX, SHORT_LEN_MAX, WireError, align4};

/// Growable output buffer for TL primitives.
#[derive(Clone, Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Drop everything written after `len`, restoring an earlier state.
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    pub fn write_nat(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Magics share the 32-bit integer layout.
    pub fn write_magic(&mut self, magic: u32) {
        self.write_nat(magic);
    }

    pub fn write_int(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_long(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_double(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_string(&mut self, v: &str) -> Result<(), WireError> {
        self.write_bytes(v.as_bytes())
    }

    /// Length header, payload, then zero padding to a 4-byte boundary.
    pub fn write_bytes(&mut self, v: &[u8]) -> Result<(), WireError> {
        let len = v.len();
        let header = if len <= SHORT_LEN_MAX {
            self.buf.push(len as u8);
            1
        } else if len <= LONG_LEN_MAX {
            let [b0, b1, b2, _] = (len as u32).to_le_bytes();
            self.buf.extend_from_slice(&[LONG_LEN_MARKER, b0, b1, b2]);
            4
        } else {
            return Err(WireError::PayloadTooLong { len });
        };
        self.buf.extend_from_slice(v);
        let written = header + len;
        self.buf.resize(self.buf.len() + align4(written) - written, 0);
        Ok(())
    }
}

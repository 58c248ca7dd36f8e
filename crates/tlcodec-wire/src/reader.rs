//! Bounds-checked input cursor with a single-level mark/rewind.

use crate::{LONG_LEN_MARKER, SHORT_LEN_MAX, WireError, align4};

/// Saved cursor position; see [`Reader::rewind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mark(usize);

/// Reads TL primitives from a complete buffer.
///
/// Every read either succeeds in full or fails with
/// [`WireError::InsufficientData`] without moving the cursor.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    pub fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    /// Return to a previously recorded position.
    pub fn rewind(&mut self, mark: Mark) {
        debug_assert!(mark.0 <= self.data.len());
        self.pos = mark.0;
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < n {
            return Err(WireError::InsufficientData {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_nat(&mut self) -> Result<u32, WireError> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub fn read_magic(&mut self) -> Result<u32, WireError> {
        self.read_nat()
    }

    pub fn read_int(&mut self) -> Result<i32, WireError> {
        self.take_array().map(i32::from_le_bytes)
    }

    pub fn read_long(&mut self) -> Result<i64, WireError> {
        self.take_array().map(i64::from_le_bytes)
    }

    pub fn read_double(&mut self) -> Result<f64, WireError> {
        self.take_array().map(f64::from_le_bytes)
    }

    pub fn read_bytes(&mut self) -> Result<&'a [u8], WireError> {
        let start = self.pos;
        let result = self.read_bytes_at(start);
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    fn read_bytes_at(&mut self, start: usize) -> Result<&'a [u8], WireError> {
        let first = self.take(1)?[0];
        let (header, len) = match first {
            n if (n as usize) <= SHORT_LEN_MAX => (1, n as usize),
            LONG_LEN_MARKER => {
                let [b0, b1, b2] = self.take_array()?;
                (4, u32::from_le_bytes([b0, b1, b2, 0]) as usize)
            }
            _ => return Err(WireError::MalformedString { offset: start }),
        };
        let payload = self.take(len)?;
        let padding = align4(header + len) - (header + len);
        self.take(padding)?;
        Ok(payload)
    }

    pub fn read_string(&mut self) -> Result<&'a str, WireError> {
        let start = self.pos;
        let bytes = self.read_bytes()?;
        std::str::from_utf8(bytes).map_err(|_| {
            self.pos = start;
            WireError::InvalidUtf8 { offset: start }
        })
    }
}

//! Positioned binary reader over the record wire primitives.
//!
//! Primitive layout:
//! ```text
//! int     zig-zag varint, <= 5 bytes, must fit 32 bits
//! long    zig-zag varint, <= 10 bytes
//! float   4 bytes little-endian
//! double  8 bytes little-endian
//! boolean 1 byte, 0x00 or 0x01
//! bytes   long length, then that many bytes
//! string  bytes holding UTF-8
//! ```

use std::io::{self, BufRead, Read};

use crate::error::StreamError;
use crate::types::{DEFAULT_MAX_BLOB_LEN, MAX_VARINT_INT_BYTES, MAX_VARINT_LONG_BYTES};

/// Map a zig-zag encoded value back to its signed form.
pub fn zigzag_decode(raw: u64) -> i64 {
    ((raw >> 1) as i64) ^ -((raw & 1) as i64)
}

/// A byte-counting reader that decodes wire primitives from `R`.
///
/// Keeps a scratch buffer for string payloads so repeated reads do not
/// allocate per field.
#[derive(Debug)]
pub struct BinaryReader<R> {
    inner: R,
    position: u64,
    max_blob_len: usize,
    scratch: Vec<u8>,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_max_blob_len(inner, DEFAULT_MAX_BLOB_LEN)
    }

    /// Create a reader that rejects length prefixes above `max_blob_len`.
    pub fn with_max_blob_len(inner: R, max_blob_len: usize) -> Self {
        Self {
            inner,
            position: 0,
            max_blob_len,
            scratch: Vec::new(),
        }
    }

    /// Total bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read exactly `N` bytes.
    ///
    /// Bytes consumed before a short read or I/O error still advance the
    /// position, so `UnexpectedEof` reports where the input actually ended.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], StreamError> {
        let mut buf = [0u8; N];
        let mut filled = 0;
        while filled < N {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(StreamError::UnexpectedEof {
                        position: self.position,
                    });
                }
                Ok(n) => {
                    filled += n;
                    self.position += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(StreamError::Io(e)),
            }
        }
        Ok(buf)
    }

    pub fn read_byte(&mut self) -> Result<u8, StreamError> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    /// Read an unsigned LEB128 varint of at most `max_bytes` bytes.
    fn read_varint(&mut self, max_bytes: usize) -> Result<u64, StreamError> {
        let start = self.position;
        let mut value: u64 = 0;
        for i in 0..max_bytes {
            let b = self.read_byte()?;
            let shift = 7 * i as u32;
            // The tenth byte of a long may only carry the top bit.
            if shift == 63 && b > 1 {
                return Err(StreamError::VarintOverflow {
                    max_bytes,
                    position: start,
                });
            }
            value |= u64::from(b & 0x7F) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(StreamError::VarintOverflow {
            max_bytes,
            position: start,
        })
    }

    pub fn read_int(&mut self) -> Result<i32, StreamError> {
        let value = zigzag_decode(self.read_varint(MAX_VARINT_INT_BYTES)?);
        i32::try_from(value).map_err(|_| StreamError::IntOutOfRange(value))
    }

    pub fn read_long(&mut self) -> Result<i64, StreamError> {
        Ok(zigzag_decode(self.read_varint(MAX_VARINT_LONG_BYTES)?))
    }

    pub fn read_float(&mut self) -> Result<f32, StreamError> {
        Ok(f32::from_le_bytes(self.read_array::<4>()?))
    }

    pub fn read_double(&mut self) -> Result<f64, StreamError> {
        Ok(f64::from_le_bytes(self.read_array::<8>()?))
    }

    pub fn read_bool(&mut self) -> Result<bool, StreamError> {
        match self.read_byte()? {
            0x00 => Ok(false),
            0x01 => Ok(true),
            other => Err(StreamError::InvalidBool(other)),
        }
    }

    /// Read and validate a length prefix.
    pub fn read_len(&mut self) -> Result<usize, StreamError> {
        let len = self.read_long()?;
        if len < 0 {
            return Err(StreamError::NegativeLength(len));
        }
        let len = len as u64;
        if len > self.max_blob_len as u64 {
            return Err(StreamError::LengthTooLarge {
                max: self.max_blob_len,
                actual: len,
            });
        }
        Ok(len as usize)
    }

    /// Fill the scratch buffer with exactly `len` bytes.
    fn fill_scratch(&mut self, len: usize) -> Result<(), StreamError> {
        self.scratch.clear();
        let result = (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut self.scratch);
        // read_to_end keeps whatever it appended before failing.
        self.position += self.scratch.len() as u64;
        result.map_err(StreamError::Io)?;
        if self.scratch.len() < len {
            return Err(StreamError::UnexpectedEof {
                position: self.position,
            });
        }
        Ok(())
    }

    /// Read a length-prefixed blob into a fresh vector.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, StreamError> {
        let len = self.read_len()?;
        self.fill_scratch(len)?;
        Ok(self.scratch.clone())
    }

    /// Read a length-prefixed UTF-8 string, borrowing the scratch buffer.
    pub fn read_str(&mut self) -> Result<&str, StreamError> {
        let len = self.read_len()?;
        self.fill_scratch(len)?;
        std::str::from_utf8(&self.scratch).map_err(|_| StreamError::InvalidUtf8)
    }

    pub fn read_string(&mut self) -> Result<String, StreamError> {
        self.read_str().map(str::to_owned)
    }

    /// Consume exactly `n` bytes without retaining them.
    pub fn skip_bytes(&mut self, n: usize) -> Result<(), StreamError> {
        let skipped = io::copy(&mut (&mut self.inner).take(n as u64), &mut io::sink())
            .map_err(StreamError::Io)?;
        self.position += skipped;
        if skipped < n as u64 {
            return Err(StreamError::UnexpectedEof {
                position: self.position,
            });
        }
        Ok(())
    }

    /// Consume a length prefix and the span it announces.
    pub fn skip_blob(&mut self) -> Result<(), StreamError> {
        let len = self.read_len()?;
        self.skip_bytes(len)
    }
}

impl<R: BufRead> BinaryReader<R> {
    /// True if the underlying stream has no more bytes.
    pub fn at_eof(&mut self) -> Result<bool, StreamError> {
        Ok(self.inner.fill_buf()?.is_empty())
    }
}

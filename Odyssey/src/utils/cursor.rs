//! Random-access little-endian reader over an in-memory byte buffer
//!
//! Callers own all positioning: nothing here seeks implicitly, and a read that
//! would run past the end of the buffer fails with [`Error::TruncatedRead`]
//! without moving the cursor.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use crate::error::{Error, Result};

/// Little-endian reader with explicit seek/skip and C-style string reads.
#[derive(Debug, Clone)]
pub struct BinaryCursor<'a> {
    inner: Cursor<&'a [u8]>,
}

impl<'a> BinaryCursor<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(data),
        }
    }

    /// Current absolute read position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.inner.position() as usize
    }

    /// Total length of the underlying buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.get_ref().is_empty()
    }

    /// Move to an absolute offset. Seeking past the end is allowed; the next read fails.
    pub fn seek(&mut self, offset: usize) {
        self.inner.set_position(offset as u64);
    }

    /// Advance the position by `n` bytes.
    pub fn skip(&mut self, n: usize) {
        let target = self.position().saturating_add(n);
        self.seek(target);
    }

    fn ensure(&self, requested: usize) -> Result<()> {
        let position = self.position();
        let len = self.len();
        if position.checked_add(requested).is_none_or(|end| end > len) {
            return Err(Error::TruncatedRead {
                position,
                requested,
                len,
            });
        }
        Ok(())
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.inner.read_u8()?)
    }

    pub fn get_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.inner.read_u16::<LittleEndian>()?)
    }

    pub fn get_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.inner.read_u32::<LittleEndian>()?)
    }

    pub fn get_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.inner.read_f32::<LittleEndian>()?)
    }

    /// Read `N` consecutive floats.
    pub fn get_f32_array<const N: usize>(&mut self) -> Result<[f32; N]> {
        self.ensure(N * 4)?;
        let mut values = [0.0f32; N];
        self.inner.read_f32_into::<LittleEndian>(&mut values)?;
        Ok(values)
    }

    /// Read `count` consecutive floats.
    pub fn get_f32_vec(&mut self, count: usize) -> Result<Vec<f32>> {
        self.ensure(count.saturating_mul(4))?;
        let mut values = vec![0.0f32; count];
        self.inner.read_f32_into::<LittleEndian>(&mut values)?;
        Ok(values)
    }

    /// Read exactly `max_len` bytes and return the text before the first null.
    ///
    /// Fields without a terminator yield all `max_len` bytes.
    pub fn get_fixed_string(&mut self, max_len: usize) -> Result<String> {
        self.ensure(max_len)?;
        let mut buf = vec![0u8; max_len];
        self.inner.read_exact(&mut buf)?;
        let end = buf.iter().position(|&b| b == 0).unwrap_or(max_len);
        Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
    }

    /// Read bytes up to (and consuming) a null terminator.
    pub fn get_c_string(&mut self) -> Result<String> {
        let position = self.position();
        let data: &[u8] = self.inner.get_ref();
        let rest = data.get(position..).unwrap_or_default();

        let Some(end) = rest.iter().position(|&b| b == 0) else {
            return Err(Error::TruncatedRead {
                position,
                requested: rest.len() + 1,
                len: data.len(),
            });
        };

        let text = String::from_utf8_lossy(&rest[..end]).into_owned();
        self.seek(position + end + 1);
        Ok(text)
    }
}

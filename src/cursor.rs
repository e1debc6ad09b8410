// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/cursor.rs - Little-endian byte cursor over an in-memory file.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/*!
 * # `cursor` Module
 *
 * Sequential reads over an immutable byte buffer. The cursor always works in
 * absolute buffer offsets, so errors raised from deep inside a section still
 * point at the right place in the file.
 */

use crate::error::{Error, Result};

/// A read position within an immutable byte buffer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    start: usize,
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            start: 0,
            pos: 0,
        }
    }

    /// Creates a cursor positioned at `position`.
    ///
    /// Positioning exactly at the end of the buffer is allowed; anything
    /// beyond it is reported as truncation.
    pub fn at(data: &'a [u8], position: usize) -> Result<Self> {
        if position > data.len() {
            return Err(Error::Truncated {
                offset: position,
                needed: 0,
                available: 0,
            });
        }
        Ok(Self {
            data,
            start: position,
            pos: position,
        })
    }

    /// The absolute offset of the next byte to be read.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes consumed since the cursor was created.
    pub fn consumed(&self) -> usize {
        self.pos - self.start
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(Error::Truncated {
                offset: self.pos,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Returns the next `n` bytes and advances past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn peek_u8(&self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.data[self.pos])
    }

    pub fn peek_u32(&self) -> Result<u32> {
        self.ensure(4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + 4]);
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Reads `n` bytes as text. Invalid UTF-8 is replaced, not rejected.
    pub fn read_string(&mut self, n: usize) -> Result<String> {
        Ok(String::from_utf8_lossy(self.read_bytes(n)?).to_string())
    }

    /// Reads a string preceded by a one-byte length.
    pub fn read_prefixed_string(&mut self) -> Result<String> {
        let len = self.read_u8()?;
        self.read_string(len.into())
    }

    /// Reads a byte block preceded by a two-byte little-endian length.
    pub fn read_prefixed_bytes_u16(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u16()?;
        self.read_bytes(len.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_reads() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xFF, 0xFE, 0xFF];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u16().unwrap(), 0x1234);
        assert_eq!(cursor.read_u32().unwrap(), 0x12345678);
        assert_eq!(cursor.read_i8().unwrap(), -1);
        assert_eq!(cursor.read_i16().unwrap(), -2);
        assert_eq!(cursor.consumed(), 9);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_truncated_read_reports_offset() {
        let data = [0x01, 0x02, 0x03];
        let mut cursor = ByteCursor::new(&data);
        cursor.skip(1).unwrap();
        let err = cursor.read_u32().unwrap_err();
        assert!(matches!(
            err,
            Error::Truncated {
                offset: 1,
                needed: 4,
                available: 2
            }
        ));
        // A failed read does not move the cursor.
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_prefixed_reads() {
        let data = [3, b'a', b'b', b'c', 2, 0, 0xAA, 0xBB, 0x00];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_prefixed_string().unwrap(), "abc");
        assert_eq!(cursor.read_prefixed_bytes_u16().unwrap(), &[0xAA, 0xBB]);
        assert_eq!(cursor.remaining(), 1);
    }

    #[test]
    fn test_prefixed_string_past_end() {
        let data = [5, b'a', b'b'];
        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            cursor.read_prefixed_string(),
            Err(Error::Truncated { offset: 1, .. })
        ));
    }

    #[test]
    fn test_positioned_cursor() {
        let data = [0u8, 1, 2, 3, 0x0D, 0, 0, 0];
        let mut cursor = ByteCursor::at(&data, 4).unwrap();
        assert_eq!(cursor.peek_u32().unwrap(), 0x0D);
        assert_eq!(cursor.peek_u8().unwrap(), 0x0D);
        assert_eq!(cursor.consumed(), 0);
        cursor.skip(4).unwrap();
        assert_eq!(cursor.consumed(), 4);
        assert_eq!(cursor.position(), 8);

        assert!(ByteCursor::at(&data, 8).is_ok());
        assert!(matches!(
            ByteCursor::at(&data, 9),
            Err(Error::Truncated { offset: 9, .. })
        ));
    }

    #[test]
    fn test_read_f32() {
        let data = 1.5f32.to_le_bytes();
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_f32().unwrap(), 1.5);
    }
}

// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Wire-level primitives of the binary format.
//!
//! Integers are zigzag-encoded little varints (7 data bits per byte, high
//! bit set on continuation bytes). Floats and doubles are fixed-width
//! little-endian IEEE-754. Bytes and strings carry a `long` length prefix.
//! There is no framing at the value level; a value is exactly the
//! concatenation of its parts.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::Error;

/// An append-only output buffer for encoding values.
#[derive(Default)]
pub struct Writer {
    bf: Vec<u8>,
    reserved: usize,
}

impl Writer {
    /// Clears the buffer, keeping its capacity.
    pub fn reset(&mut self) {
        self.bf.clear();
        self.reserved = 0;
    }

    /// Returns a copy of the encoded bytes.
    pub fn dump(&self) -> Vec<u8> {
        self.bf.clone()
    }

    /// Consumes the writer, returning the encoded bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.bf
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.reserved += additional;
        if self.bf.capacity() < self.reserved {
            self.bf.reserve(self.reserved);
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bf.push(value);
    }

    pub fn write_bytes(&mut self, v: &[u8]) {
        self.bf.extend_from_slice(v);
    }

    /// Writes a boolean as a single byte, strictly 0 or 1.
    pub fn write_boolean(&mut self, value: bool) {
        self.bf.push(value as u8);
    }

    /// Writes a zigzag varint `long`. Uses at most 10 bytes.
    pub fn write_long(&mut self, value: i64) {
        let mut zigzag = ((value << 1) ^ (value >> 63)) as u64;
        loop {
            let byte = (zigzag & 0x7F) as u8;
            zigzag >>= 7;
            if zigzag == 0 {
                self.bf.push(byte);
                return;
            }
            self.bf.push(byte | 0x80);
        }
    }

    /// Writes a zigzag varint `int`. Same wire shape as [`Writer::write_long`],
    /// at most 5 bytes.
    pub fn write_int(&mut self, value: i32) {
        self.write_long(value as i64);
    }

    pub fn write_f32(&mut self, value: f32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_f32(&mut buf, value);
        self.bf.extend_from_slice(&buf);
    }

    pub fn write_f64(&mut self, value: f64) {
        let mut buf = [0u8; 8];
        LittleEndian::write_f64(&mut buf, value);
        self.bf.extend_from_slice(&buf);
    }

    /// Writes a length-prefixed byte string: `long` length, then raw bytes.
    pub fn write_len_prefixed(&mut self, v: &[u8]) {
        self.write_long(v.len() as i64);
        self.bf.extend_from_slice(v);
    }

    /// Writes a length-prefixed UTF-8 string.
    pub fn write_str(&mut self, s: &str) {
        self.write_len_prefixed(s.as_bytes());
    }
}

/// A cursor over an input byte slice for decoding values.
///
/// Every read is bounds-checked; a read past the end of the slice returns
/// [`Error::MalformedData`] rather than panicking, since truncated input is
/// an ordinary wire-level failure.
pub struct Reader<'a> {
    bf: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bf: &'a [u8]) -> Reader<'a> {
        Reader { bf, cursor: 0 }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        match self.bf.get(self.cursor) {
            Some(&b) => {
                self.cursor += 1;
                Ok(b)
            }
            None => Err(Error::malformed_data("unexpected end of input")),
        }
    }

    /// Returns the next `len` bytes as a slice and advances the cursor.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        match self.bf.get(self.cursor..self.cursor + len) {
            Some(s) => {
                self.cursor += len;
                Ok(s)
            }
            None => Err(Error::malformed_data(format!(
                "need {} bytes, {} remaining",
                len,
                self.remaining()
            ))),
        }
    }

    /// Advances the cursor by `len` bytes without reading them.
    pub fn skip_bytes(&mut self, len: usize) -> Result<(), Error> {
        if self.remaining() < len {
            return Err(Error::malformed_data(format!(
                "cannot skip {} bytes, {} remaining",
                len,
                self.remaining()
            )));
        }
        self.cursor += len;
        Ok(())
    }

    /// Reads a boolean byte. Bytes other than 0 and 1 are rejected.
    pub fn read_boolean(&mut self) -> Result<bool, Error> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(Error::malformed_data(format!("invalid boolean byte {b}"))),
        }
    }

    /// Reads a zigzag varint `long`.
    ///
    /// A varint whose magnitude does not fit 64 bits, or that runs past the
    /// end of input, is a format error.
    pub fn read_long(&mut self) -> Result<i64, Error> {
        let mut acc: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let b = self.read_u8()?;
            if shift == 63 && (b & 0xFE) != 0 {
                return Err(Error::malformed_data("varint overflows 64 bits"));
            }
            acc |= ((b & 0x7F) as u64) << shift;
            if b & 0x80 == 0 {
                let decoded = ((acc >> 1) as i64) ^ -((acc & 1) as i64);
                return Ok(decoded);
            }
            shift += 7;
        }
    }

    /// Reads a zigzag varint `int`. A value outside the 32-bit range is a
    /// format error, not a silent truncation.
    pub fn read_int(&mut self) -> Result<i32, Error> {
        let v = self.read_long()?;
        i32::try_from(v)
            .map_err(|_| Error::malformed_data(format!("varint {v} overflows 32 bits")))
    }

    pub fn read_f32(&mut self) -> Result<f32, Error> {
        let s = self.read_bytes(4)?;
        Ok(LittleEndian::read_f32(s))
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        let s = self.read_bytes(8)?;
        Ok(LittleEndian::read_f64(s))
    }

    /// Reads a length-prefixed byte string. A negative length is a format
    /// error.
    pub fn read_len_prefixed(&mut self) -> Result<&'a [u8], Error> {
        let len = self.read_long()?;
        if len < 0 {
            return Err(Error::malformed_data(format!("negative length {len}")));
        }
        self.read_bytes(len as usize)
    }

    /// Reads a length-prefixed string, validating UTF-8.
    ///
    /// The wire format itself does not enforce UTF-8, but the target
    /// representation here is a Rust `String`, so invalid UTF-8 is rejected
    /// at decode time.
    pub fn read_str(&mut self) -> Result<&'a str, Error> {
        let raw = self.read_len_prefixed()?;
        std::str::from_utf8(raw).map_err(|e| Error::malformed_data(format!("invalid UTF-8: {e}")))
    }
}

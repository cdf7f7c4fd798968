// Field-level readers and writers for message bodies.
//
// Layout notation used in the handlers and renderers:
// - **NB**: NUL-terminated string
// - **1B/2B/4B**: little-endian integer of that width

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::FormatError;

/// Bounds-checked cursor over a message body. Every read fails with
/// `FormatError::Truncated` instead of panicking on short input.
#[derive(Debug, Clone)]
pub struct BodyReader {
    buf: Bytes,
}

impl BodyReader {
    pub fn new(body: &Bytes) -> Self {
        Self { buf: body.clone() }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, needed: usize) -> Result<(), FormatError> {
        if self.buf.remaining() < needed {
            return Err(FormatError::Truncated {
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16, FormatError> {
        self.ensure(2)?;
        Ok(self.buf.get_u16_le())
    }

    pub fn read_u32(&mut self) -> Result<u32, FormatError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes, FormatError> {
        self.ensure(len)?;
        Ok(self.buf.split_to(len))
    }

    /// NB field. Invalid UTF-8 is replaced rather than rejected; clients send
    /// whatever their local code page produces.
    pub fn read_string(&mut self) -> Result<String, FormatError> {
        let end = self
            .buf
            .iter()
            .position(|&b| b == 0)
            .ok_or(FormatError::Truncated {
                needed: self.buf.remaining() + 1,
                remaining: self.buf.remaining(),
            })?;
        let raw = self.buf.split_to(end);
        self.buf.advance(1);
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    /// Reads an NB field that clients always leave empty.
    pub fn skip_string(&mut self) -> Result<(), FormatError> {
        self.read_string().map(|_| ())
    }
}

pub trait PutString {
    /// Writes `s` as an NB field, cut at any embedded NUL.
    fn put_string(&mut self, s: &str);
}

impl PutString for BytesMut {
    fn put_string(&mut self, s: &str) {
        let bytes = s.as_bytes();
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.put_slice(&bytes[..end]);
        self.put_u8(0);
    }
}

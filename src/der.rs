//! The small, closed set of DER primitives the session schema is built from.
//!
//! This is not a general ASN.1 implementation: only SEQUENCE, unsigned
//! INTEGER, OCTET STRING and UTF8String are understood, and only definite
//! lengths up to four length octets.

use crate::errors::SessionError;

use byteorder::{BigEndian, ByteOrder};
use std::convert::TryFrom;
use std::mem;
use std::str;
use zeroize::Zeroize;

pub const INTEGER: u8 = 0x02;
pub const OCTET_STRING: u8 = 0x04;
pub const UTF8_STRING: u8 = 0x0c;
pub const SEQUENCE: u8 = 0x30;

const MAX_LENGTH_OCTETS: usize = 4;
/// Tag, length-of-length and up to eight length octets.
const MAX_HEADER_LEN: usize = 10;

/// Builds DER output. The working buffer is wiped on drop, since session
/// encodings carry the master secret.
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn finish(mut self) -> Vec<u8> {
        mem::take(&mut self.buf)
    }

    pub fn tlv(&mut self, tag: u8, value: &[u8]) -> &mut Self {
        self.reserve(MAX_HEADER_LEN + value.len());
        self.buf.push(tag);
        write_length(&mut self.buf, value.len());
        self.buf.extend_from_slice(value);
        self
    }

    pub fn integer(&mut self, value: u64) -> &mut Self {
        let mut bytes = [0; 8];
        BigEndian::write_u64(&mut bytes, value);
        let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
        if bytes[first] & 0x80 != 0 {
            let mut padded = Vec::with_capacity(9 - first);
            padded.push(0);
            padded.extend_from_slice(&bytes[first..]);
            self.tlv(INTEGER, &padded)
        } else {
            self.tlv(INTEGER, &bytes[first..])
        }
    }

    pub fn octet_string(&mut self, value: &[u8]) -> &mut Self {
        self.tlv(OCTET_STRING, value)
    }

    pub fn utf8_string(&mut self, value: &str) -> &mut Self {
        self.tlv(UTF8_STRING, value.as_bytes())
    }

    pub fn sequence<F>(&mut self, contents: F) -> &mut Self
    where
        F: FnOnce(&mut Writer),
    {
        let mut inner = Writer::new();
        contents(&mut inner);
        self.tlv(SEQUENCE, &inner.buf)
    }
}

impl Writer {
    /// Makes room for `additional` bytes. The old allocation is wiped before
    /// it is released, so no stale copy of earlier fields is left behind.
    fn reserve(&mut self, additional: usize) {
        if self.buf.capacity() - self.buf.len() >= additional {
            return;
        }
        let capacity = (self.buf.len() + additional).max(2 * self.buf.capacity());
        let mut grown = Vec::with_capacity(capacity);
        grown.extend_from_slice(&self.buf);
        self.buf.zeroize();
        self.buf = grown;
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}

fn write_length(buf: &mut Vec<u8>, length: usize) {
    if length < 0x80 {
        buf.push(length as u8);
        return;
    }
    let mut bytes = [0; 8];
    BigEndian::write_u64(&mut bytes, length as u64);
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    buf.push(0x80 | (bytes.len() - first) as u8);
    buf.extend_from_slice(&bytes[first..]);
}

pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads one TLV and returns the tag, its value, and the total number of
    /// bytes it occupied.
    pub fn tlv(&mut self) -> Result<(u8, &'a [u8], usize), SessionError> {
        let start = self.pos;
        let rest = &self.data[self.pos..];
        let (tag, length, header_len) = match rest.len() {
            0..=1 => return Err(SessionError::DecodingError("truncated DER header")),
            _ => match rest[1] {
                0x80 => return Err(SessionError::DecodingError("indefinite length")),
                l if l < 0x80 => (rest[0], usize::from(l), 2),
                l => {
                    let octets = usize::from(l & 0x7f);
                    if octets > MAX_LENGTH_OCTETS || rest.len() < 2 + octets {
                        return Err(SessionError::DecodingError("bad DER length"));
                    }
                    let length = rest[2..2 + octets].iter().fold(0usize, |acc, b| (acc << 8) | usize::from(*b));
                    if length < 0x80 || rest[2] == 0 {
                        return Err(SessionError::DecodingError("non-minimal DER length"));
                    }
                    (rest[0], length, 2 + octets)
                }
            },
        };
        if tag & 0x1f == 0x1f {
            return Err(SessionError::DecodingError("multi-byte DER tag"));
        }
        match header_len.checked_add(length) {
            Some(total) if total <= rest.len() => {
                self.pos += total;
                Ok((tag, &rest[header_len..total], self.pos - start))
            }
            _ => Err(SessionError::DecodingError("DER value runs past end of input")),
        }
    }

    fn expect(&mut self, expected: u8) -> Result<&'a [u8], SessionError> {
        let (tag, value, _) = self.tlv()?;
        if tag != expected {
            return Err(SessionError::DecodingError("unexpected DER tag"));
        }
        Ok(value)
    }

    pub fn integer(&mut self) -> Result<u64, SessionError> {
        let value = self.expect(INTEGER)?;
        match value.len() {
            0 => Err(SessionError::DecodingError("empty INTEGER")),
            _ if value[0] & 0x80 != 0 => Err(SessionError::DecodingError("negative INTEGER")),
            n if n > 1 && value[0] == 0 && value[1] & 0x80 == 0 => Err(SessionError::DecodingError("non-minimal INTEGER")),
            _ => {
                let first = value.iter().position(|b| *b != 0).unwrap_or(value.len());
                let magnitude = &value[first..];
                if magnitude.len() > 8 {
                    return Err(SessionError::DecodingError("INTEGER too large"));
                }
                Ok(magnitude.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
            }
        }
    }

    /// Reads an INTEGER that must fit in `T`.
    pub fn integer_as<T>(&mut self) -> Result<T, SessionError>
    where
        T: TryFrom<u64>,
    {
        let value = self.integer()?;
        T::try_from(value).map_err(|_| SessionError::DecodingError("INTEGER out of range"))
    }

    pub fn octet_string(&mut self) -> Result<&'a [u8], SessionError> {
        self.expect(OCTET_STRING)
    }

    pub fn utf8_string(&mut self) -> Result<&'a str, SessionError> {
        let value = self.expect(UTF8_STRING)?;
        str::from_utf8(value).map_err(|_| SessionError::DecodingError("invalid UTF8String"))
    }

    pub fn sequence(&mut self) -> Result<Reader<'a>, SessionError> {
        let value = self.expect(SEQUENCE)?;
        Ok(Reader::new(value))
    }

    pub fn verify_end(&self) -> Result<(), SessionError> {
        match self.is_empty() {
            true => Ok(()),
            false => Err(SessionError::DecodingError("trailing data")),
        }
    }
}

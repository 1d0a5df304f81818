//! Sort-preserving encodings for composite table keys.
//!
//! # Strings
//!
//! A string field that is followed by other fields is written with every `0x00`
//! byte escaped as `0x00 0xff` and terminated by `0x00 0x00`. The terminator
//! compares lower than any escaped or ordinary continuation, so a string sorts
//! before every longer string it is a prefix of, and no following field can be
//! misread as part of the string. The last field of a key is written raw.
//!
//! # Unsigned integers
//!
//! An integer is written as one length byte (the number of significant
//! big-endian bytes, `0..=8`) followed by those bytes. Larger magnitudes have
//! longer encodings and a greater length byte, so byte order equals numeric
//! order for every value.

use byteorder::{BigEndian, ByteOrder};
use termpos_common::{Result, error::Error};

const ESCAPE: u8 = 0x00;
const ESCAPED_ZERO: u8 = 0xff;
const TERMINATOR: u8 = 0x00;

/// Appends `s` to `buf` so that byte order of the output matches byte order of
/// the input.
///
/// Pass `last = true` only for the final field of a key; such a field is stored
/// without escaping and consumes the remainder of the key on decode.
pub fn pack_string_preserving_sort(buf: &mut Vec<u8>, s: &[u8], last: bool) {
    if last {
        buf.extend_from_slice(s);
        return;
    }
    buf.reserve(s.len() + 2);
    for &byte in s {
        buf.push(byte);
        if byte == ESCAPE {
            buf.push(ESCAPED_ZERO);
        }
    }
    buf.push(ESCAPE);
    buf.push(TERMINATOR);
}

/// Reads a string written by [`pack_string_preserving_sort`] from the front of
/// `data`, advancing `data` past it.
pub fn unpack_string_preserving_sort(data: &mut &[u8], last: bool) -> Result<Vec<u8>> {
    let bytes: &[u8] = *data;
    if last {
        *data = &bytes[bytes.len()..];
        return Ok(bytes.to_vec());
    }

    let mut s = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        i += 1;
        if byte != ESCAPE {
            s.push(byte);
            continue;
        }
        match bytes.get(i) {
            Some(&TERMINATOR) => {
                *data = &bytes[i + 1..];
                return Ok(s);
            }
            Some(&ESCAPED_ZERO) => {
                s.push(ESCAPE);
                i += 1;
            }
            Some(&other) => {
                return Err(Error::corrupt_data(
                    "sortable string",
                    format!("invalid escape sequence 0x00 0x{other:02x}"),
                ));
            }
            None => break,
        }
    }
    Err(Error::corrupt_data("sortable string", "missing terminator"))
}

/// Appends `value` to `buf` so that byte order of the output matches numeric
/// order.
pub fn pack_uint_preserving_sort(buf: &mut Vec<u8>, value: u64) {
    let len = significant_bytes(value);
    buf.push(len as u8);
    if len > 0 {
        let mut be = [0u8; 8];
        BigEndian::write_uint(&mut be, value, len);
        buf.extend_from_slice(&be[..len]);
    }
}

/// Reads an integer written by [`pack_uint_preserving_sort`] from the front of
/// `data`, advancing `data` past it.
///
/// Non-canonical encodings (a leading zero byte) are rejected so that decoding
/// stays the exact inverse of encoding.
pub fn unpack_uint_preserving_sort(data: &mut &[u8]) -> Result<u64> {
    let bytes: &[u8] = *data;
    let (&len, rest) = bytes
        .split_first()
        .ok_or_else(|| Error::corrupt_data("sortable uint", "unexpected end of data"))?;
    let len = len as usize;
    if len > 8 {
        return Err(Error::corrupt_data(
            "sortable uint",
            format!("length byte {len} out of range"),
        ));
    }
    if len == 0 {
        *data = rest;
        return Ok(0);
    }
    if rest.len() < len {
        return Err(Error::corrupt_data("sortable uint", "unexpected end of data"));
    }
    if rest[0] == 0 {
        return Err(Error::corrupt_data("sortable uint", "non-canonical encoding"));
    }
    let value = BigEndian::read_uint(rest, len);
    *data = &rest[len..];
    Ok(value)
}

fn significant_bytes(value: u64) -> usize {
    let bits = (u64::BITS - value.leading_zeros()) as usize;
    bits.div_ceil(8)
}

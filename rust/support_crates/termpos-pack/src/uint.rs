//! Variable-length unsigned integers (little-endian base 128).
//!
//! Each byte carries seven payload bits, least significant group first. The high
//! bit is set on every byte except the last one. A `u64` takes at most
//! [`MAX_PACKED_LEN`] bytes.

use termpos_common::{Result, error::Error};

const CONTINUATION_BIT: u8 = 0x80;
const PAYLOAD_MASK: u8 = 0x7f;

/// Maximum number of bytes produced by [`pack_uint`].
pub const MAX_PACKED_LEN: usize = 10;

/// Appends `value` to `buf` as a variable-length integer.
pub fn pack_uint(buf: &mut Vec<u8>, mut value: u64) {
    while value > PAYLOAD_MASK as u64 {
        buf.push((value as u8 & PAYLOAD_MASK) | CONTINUATION_BIT);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Returns the number of bytes [`pack_uint`] writes for `value`.
pub fn packed_uint_len(value: u64) -> usize {
    let bits = u64::BITS - value.leading_zeros();
    (bits.max(1) as usize).div_ceil(7)
}

/// Reads a variable-length integer from the front of `data` and advances `data`
/// past it.
///
/// Truncated input, or an encoding that does not fit in a `u64`, is reported as
/// corrupt data. On error `data` is left untouched.
pub fn unpack_uint(data: &mut &[u8]) -> Result<u64> {
    let bytes: &[u8] = *data;
    let mut result = 0u64;
    for (i, &byte) in bytes.iter().enumerate().take(MAX_PACKED_LEN) {
        let payload = (byte & PAYLOAD_MASK) as u64;
        if i == MAX_PACKED_LEN - 1 && payload > 1 {
            return Err(Error::corrupt_data("packed uint", "value overflows u64"));
        }
        result |= payload << (7 * i);
        if byte & CONTINUATION_BIT == 0 {
            *data = &bytes[i + 1..];
            return Ok(result);
        }
    }
    if bytes.len() >= MAX_PACKED_LEN {
        Err(Error::corrupt_data("packed uint", "value overflows u64"))
    } else {
        Err(Error::corrupt_data("packed uint", "unexpected end of data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_uint_layout() {
        let mut buf = Vec::new();
        pack_uint(&mut buf, 0);
        assert_eq!(buf, [0x00]);

        buf.clear();
        pack_uint(&mut buf, 127);
        assert_eq!(buf, [0x7f]);

        buf.clear();
        pack_uint(&mut buf, 128);
        assert_eq!(buf, [0x80, 0x01]);

        buf.clear();
        pack_uint(&mut buf, 300);
        assert_eq!(buf, [0xac, 0x02]);

        buf.clear();
        pack_uint(&mut buf, u64::MAX);
        assert_eq!(buf.len(), MAX_PACKED_LEN);
        assert_eq!(*buf.last().unwrap(), 0x01);
    }

    #[test]
    fn test_packed_uint_len() {
        for value in [0, 1, 127, 128, 16383, 16384, u32::MAX as u64, u64::MAX] {
            let mut buf = Vec::new();
            pack_uint(&mut buf, value);
            assert_eq!(packed_uint_len(value), buf.len(), "value {value}");
        }
    }

    #[test]
    fn test_unpack_uint_sequence() {
        fastrand::seed(7126342);
        let mut buf = Vec::new();
        let mut reference = Vec::new();
        for _ in 0..10000 {
            let value = match fastrand::u8(0..3) {
                0 => fastrand::u64(0..128),
                1 => fastrand::u64(0..1 << 32),
                _ => fastrand::u64(..),
            };
            pack_uint(&mut buf, value);
            reference.push(value);
        }

        let mut data = buf.as_slice();
        for &expected in &reference {
            assert_eq!(unpack_uint(&mut data).unwrap(), expected);
        }
        assert!(data.is_empty());
    }

    #[test]
    fn test_unpack_uint_truncated() {
        let mut data: &[u8] = &[];
        assert!(unpack_uint(&mut data).unwrap_err().is_corrupt_data());

        let mut data: &[u8] = &[0x80, 0x80];
        assert!(unpack_uint(&mut data).unwrap_err().is_corrupt_data());
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_unpack_uint_overflow() {
        let mut data: &[u8] = &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        assert!(unpack_uint(&mut data).unwrap_err().is_corrupt_data());

        let mut data: &[u8] = &[0xff; 11];
        assert!(unpack_uint(&mut data).unwrap_err().is_corrupt_data());
    }
}

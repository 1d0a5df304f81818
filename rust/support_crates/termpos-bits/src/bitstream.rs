//! Dense bit streams of arbitrary-width unsigned integers.
//!
//! Values are written least significant bit first, filling each byte from its
//! least significant bit. The final byte is zero padded, so a frozen stream is
//! always byte aligned and can be appended to a byte-oriented header.

use termpos_common::{Result, error::Error};

/// Returns the number of bits needed to write any offset in `[0, span]`.
///
/// This is the single width rule shared by every encoder and decoder in the
/// crate: a span of zero needs no bits at all, a span of one needs one bit, and
/// `u64::MAX` needs 64.
#[inline]
pub const fn bits_needed(span: u64) -> u32 {
    u64::BITS - span.leading_zeros()
}

#[inline]
fn low_mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Appends fixed-width unsigned integers to a byte buffer.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    buf: Vec<u8>,
    /// Pending bits of the current, not yet complete, byte.
    acc: u64,
    /// Number of valid bits in `acc`, always less than 8.
    n_bits: u32,
}

impl BitWriter {
    /// Creates a writer with an empty buffer.
    pub fn new() -> BitWriter {
        BitWriter::default()
    }

    /// Creates a writer that continues after the bytes already in `prefix`.
    ///
    /// The prefix is typically a byte-oriented header that precedes the bit stream.
    pub fn with_prefix(prefix: Vec<u8>) -> BitWriter {
        BitWriter {
            buf: prefix,
            acc: 0,
            n_bits: 0,
        }
    }

    /// Writes the low `bits` bits of `value` (`bits` in `0..=64`).
    ///
    /// The value must fit in `bits` bits; writing zero bits is a no-op.
    pub fn write(&mut self, value: u64, bits: u32) {
        debug_assert!(bits <= u64::BITS);
        debug_assert!(
            bits == u64::BITS || value >> bits == 0,
            "value {value} does not fit in {bits} bits"
        );
        let mut value = value;
        let mut remaining = bits;
        while remaining > 0 {
            let take = (8 - self.n_bits).min(remaining);
            self.acc |= (value & low_mask(take)) << self.n_bits;
            self.n_bits += take;
            value >>= take;
            remaining -= take;
            if self.n_bits == 8 {
                self.buf.push(self.acc as u8);
                self.acc = 0;
                self.n_bits = 0;
            }
        }
    }

    /// Total number of bits in the buffer, including any prefix bytes.
    pub fn bit_len(&self) -> usize {
        self.buf.len() * 8 + self.n_bits as usize
    }

    /// Flushes the partial byte (zero padded) and returns the buffer.
    pub fn freeze(mut self) -> Vec<u8> {
        if self.n_bits > 0 {
            self.buf.push(self.acc as u8);
        }
        self.buf
    }
}

/// Reads fixed-width unsigned integers from a byte buffer written by [`BitWriter`].
///
/// The reader owns (or borrows, depending on `B`) its data, which lets a decoder
/// keep the encoded value and the read cursor together.
#[derive(Debug, Clone)]
pub struct BitReader<B = Vec<u8>> {
    data: B,
    /// Index of the next byte to load.
    idx: usize,
    /// Loaded but not yet consumed bits, least significant first.
    acc: u64,
    /// Number of valid bits in `acc`.
    avail: u32,
}

impl<B: AsRef<[u8]>> BitReader<B> {
    /// Creates a reader positioned at the first byte of `data`.
    pub fn new(data: B) -> BitReader<B> {
        BitReader::with_offset(data, 0)
    }

    /// Creates a reader positioned at byte `offset` of `data`.
    ///
    /// Used to skip a byte-oriented header in front of the bit stream.
    pub fn with_offset(data: B, offset: usize) -> BitReader<B> {
        BitReader {
            data,
            idx: offset,
            acc: 0,
            avail: 0,
        }
    }

    /// Reads `bits` bits (`0..=64`) as an unsigned integer.
    ///
    /// Fails with `CorruptData` when the stream ends before `bits` bits could be
    /// read.
    pub fn read(&mut self, bits: u32) -> Result<u64> {
        debug_assert!(bits <= u64::BITS);
        let mut value = 0u64;
        let mut filled = 0;
        while filled < bits {
            if self.avail == 0 {
                let byte = *self.data.as_ref().get(self.idx).ok_or_else(|| {
                    Error::corrupt_data("bit stream", "unexpected end of data")
                })?;
                self.idx += 1;
                self.acc = byte as u64;
                self.avail = 8;
            }
            let take = self.avail.min(bits - filled);
            value |= (self.acc & low_mask(take)) << filled;
            self.acc >>= take;
            self.avail -= take;
            filled += take;
        }
        Ok(value)
    }

    /// Number of bits left to read, including the zero padding of the last byte.
    pub fn remaining_bits(&self) -> usize {
        let len = self.data.as_ref().len();
        len.saturating_sub(self.idx) * 8 + self.avail as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_needed_boundaries() {
        assert_eq!(bits_needed(0), 0);
        assert_eq!(bits_needed(1), 1);
        assert_eq!(bits_needed(2), 2);
        assert_eq!(bits_needed(3), 2);
        assert_eq!(bits_needed(4), 3);
        assert_eq!(bits_needed(255), 8);
        assert_eq!(bits_needed(256), 9);
        assert_eq!(bits_needed(u64::MAX), 64);
        for bits in 1..64u32 {
            assert_eq!(bits_needed((1u64 << bits) - 1), bits);
            assert_eq!(bits_needed(1u64 << bits), bits + 1);
        }
    }

    #[test]
    fn test_write_layout_lsb_first() {
        let mut wr = BitWriter::new();
        wr.write(0b1, 1);
        wr.write(0b10, 2);
        wr.write(0b11111, 5);
        wr.write(0x3, 4);
        assert_eq!(wr.bit_len(), 12);
        assert_eq!(wr.freeze(), [0b1111_1101, 0x03]);
    }

    #[test]
    fn test_zero_width_writes_are_empty() {
        let mut wr = BitWriter::new();
        wr.write(0, 0);
        wr.write(0, 0);
        assert_eq!(wr.bit_len(), 0);
        assert!(wr.freeze().is_empty());

        let mut rd = BitReader::new(Vec::<u8>::new());
        assert_eq!(rd.read(0).unwrap(), 0);
    }

    #[test]
    fn test_prefix_is_preserved() {
        let mut wr = BitWriter::with_prefix(vec![0xaa, 0xbb]);
        wr.write(5, 3);
        let data = wr.freeze();
        assert_eq!(data, [0xaa, 0xbb, 0x05]);

        let mut rd = BitReader::with_offset(data.as_slice(), 2);
        assert_eq!(rd.read(3).unwrap(), 5);
        assert_eq!(rd.remaining_bits(), 5);
    }

    #[test]
    fn test_mixed_widths() {
        fastrand::seed(90210);
        let mut wr = BitWriter::new();
        let mut written = Vec::new();
        for _ in 0..5000 {
            let bits = fastrand::u32(0..=64);
            let value = if bits == 64 {
                fastrand::u64(..)
            } else {
                fastrand::u64(..) & low_mask(bits)
            };
            wr.write(value, bits);
            written.push((value, bits));
        }
        let total_bits: usize = written.iter().map(|&(_, bits)| bits as usize).sum();
        assert_eq!(wr.bit_len(), total_bits);

        let data = wr.freeze();
        assert_eq!(data.len(), total_bits.div_ceil(8));
        let mut rd = BitReader::new(&data);
        for &(value, bits) in &written {
            assert_eq!(rd.read(bits).unwrap(), value);
        }
        assert!(rd.remaining_bits() < 8);
    }

    #[test]
    fn test_read_past_end_is_corrupt() {
        let mut rd = BitReader::new([0xffu8]);
        assert_eq!(rd.read(6).unwrap(), 0x3f);
        let err = rd.read(3).unwrap_err();
        assert!(err.is_corrupt_data());
    }
}

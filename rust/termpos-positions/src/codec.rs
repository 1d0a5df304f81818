//! Encoded form of a position list.
//!
//! ```text
//! value := uvarint(last) [body]
//! body  := first          in bits_needed(last) bits
//!          count - 2      in bits_needed(last - first - 1) bits
//!          interior positions, interpolative-coded in [first + 1, last - 1]
//! ```
//!
//! The body is present only when the list holds more than one position. In that
//! case `last >= 1`, so `first` takes at least one bit and the body is never
//! empty: a value consisting of the varint alone is always a single-position
//! list.

use termpos_bits::{BitReader, BitWriter, bits_needed, check_sequence, decode_interpolative};
use termpos_common::{Result, error::Error, verify_arg};
use termpos_pack::uint::{pack_uint, packed_uint_len, unpack_uint};

use crate::key::{TermCount, TermPos};

/// Summary of a position list, readable without decoding the interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionListHeader {
    pub count: TermCount,
    pub first: TermPos,
    pub last: TermPos,
}

impl PositionListHeader {
    /// Bounds and count of the interior positions (all but the first and the last).
    pub(crate) fn interior(&self) -> (TermCount, TermPos, TermPos) {
        if self.count <= 2 {
            (0, self.first, self.last)
        } else {
            (self.count - 2, self.first + 1, self.last - 1)
        }
    }
}

/// Encodes a non-empty, strictly ascending list of positions.
pub fn encode_positions(positions: &[TermPos]) -> Result<Vec<u8>> {
    let (Some(&first), Some(&last)) = (positions.first(), positions.last()) else {
        return Err(Error::invalid_arg(
            "positions",
            "position list must not be empty",
        ));
    };
    check_sequence(positions, first, last)?;

    let mut header = Vec::with_capacity(packed_uint_len(last) + positions.len());
    pack_uint(&mut header, last);
    if positions.len() == 1 {
        return Ok(header);
    }

    let mut writer = BitWriter::with_prefix(header);
    writer.write(first, bits_needed(last));
    writer.write(positions.len() as u64 - 2, bits_needed(last - first - 1));
    let interior = &positions[1..positions.len() - 1];
    if !interior.is_empty() {
        writer.encode_interpolative(interior, first + 1, last - 1)?;
    }
    Ok(writer.freeze())
}

/// Parses the header of an encoded list.
///
/// Returns the header and a bit reader positioned at the first interior
/// position.
pub fn parse_header<B: AsRef<[u8]>>(data: B) -> Result<(PositionListHeader, BitReader<B>)> {
    let bytes = data.as_ref();
    verify_arg!(data, !bytes.is_empty());
    let mut rest = bytes;
    let last = unpack_uint(&mut rest)?;
    let offset = bytes.len() - rest.len();
    let body = !rest.is_empty();

    let mut reader = BitReader::with_offset(data, offset);
    if !body {
        let header = PositionListHeader {
            count: 1,
            first: last,
            last,
        };
        return Ok((header, reader));
    }

    let first = reader.read(bits_needed(last))?;
    if first >= last {
        return Err(Error::corrupt_data(
            "position list",
            format!("first position {first} is not below last position {last}"),
        ));
    }
    let span = last - first - 1;
    let interior = reader.read(bits_needed(span))?;
    if interior > span {
        return Err(Error::corrupt_data(
            "position list",
            format!("{interior} interior positions do not fit between {first} and {last}"),
        ));
    }
    let count = interior.checked_add(2).ok_or_else(|| {
        Error::corrupt_data("position list", "position count overflows u64")
    })?;
    let header = PositionListHeader { count, first, last };
    Ok((header, reader))
}

/// Eagerly decodes every position of an encoded list.
pub fn decode_positions(data: &[u8]) -> Result<Vec<TermPos>> {
    let (header, mut reader) = parse_header(data)?;
    if header.count == 1 {
        return Ok(vec![header.last]);
    }
    let (count, lo, hi) = header.interior();
    // Stored counts are untrusted; cap the preallocation.
    let capacity = header.count.min(reader.remaining_bits() as u64 + 2);
    let mut positions = Vec::with_capacity(capacity as usize);
    positions.push(header.first);
    positions.extend(decode_interpolative(&mut reader, count, lo, hi)?);
    positions.push(header.last);
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes a multi-position header without a body.
    fn raw_header(last: u64, first: u64, interior: u64) -> Vec<u8> {
        let mut prefix = Vec::new();
        pack_uint(&mut prefix, last);
        let mut writer = BitWriter::with_prefix(prefix);
        writer.write(first, bits_needed(last));
        writer.write(interior, bits_needed(last - first - 1));
        writer.freeze()
    }

    #[test]
    fn test_single_position_is_varint_only() {
        let data = encode_positions(&[5]).unwrap();
        assert_eq!(data, [5]);
        let (header, _) = parse_header(data.as_slice()).unwrap();
        assert_eq!(
            header,
            PositionListHeader {
                count: 1,
                first: 5,
                last: 5
            }
        );

        assert_eq!(encode_positions(&[0]).unwrap(), [0]);
        assert_eq!(decode_positions(&[0]).unwrap(), [0]);
    }

    #[test]
    fn test_two_positions() {
        for pair in [[0u64, 1], [3, 4], [0, u64::MAX], [u64::MAX - 1, u64::MAX]] {
            let data = encode_positions(&pair).unwrap();
            assert!(data.len() > 1);
            let (header, _) = parse_header(data.as_slice()).unwrap();
            assert_eq!((header.count, header.first, header.last), (2, pair[0], pair[1]));
            assert_eq!(decode_positions(&data).unwrap(), pair);
        }
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(encode_positions(&[]).unwrap_err().is_invalid_arg());
        assert!(encode_positions(&[3, 7, 7]).unwrap_err().is_invalid_arg());
        assert!(encode_positions(&[9, 2]).unwrap_err().is_invalid_arg());
    }

    #[test]
    fn test_random_lists() {
        fastrand::seed(314159);
        for _ in 0..300 {
            let count = fastrand::usize(1..200);
            let max_gap = [1u64, 2, 10, 1000, 1 << 30][fastrand::usize(0..5)];
            let mut next = fastrand::u64(0..1000);
            let positions: Vec<u64> = (0..count)
                .map(|_| {
                    let p = next;
                    next += fastrand::u64(1..=max_gap);
                    p
                })
                .collect();
            let data = encode_positions(&positions).unwrap();
            let (header, _) = parse_header(data.as_slice()).unwrap();
            assert_eq!(header.count, count as u64);
            assert_eq!(header.first, positions[0]);
            assert_eq!(header.last, *positions.last().unwrap());
            assert_eq!(decode_positions(&data).unwrap(), positions);
        }
    }

    #[test]
    fn test_dense_list_is_header_only() {
        let positions: Vec<u64> = (1..=100).collect();
        let data = encode_positions(&positions).unwrap();
        // varint(100) plus first (7 bits) and count - 2 (7 bits).
        assert_eq!(data.len(), 1 + 2);
        assert!(data.len() * 8 < 100 * bits_needed(100) as usize);
        assert_eq!(decode_positions(&data).unwrap(), positions);
    }

    #[test]
    fn test_corrupt_header() {
        // Truncated varint.
        assert!(parse_header(&[0x80u8][..]).unwrap_err().is_corrupt_data());

        // last = 4, first = 7: first must be below last.
        assert!(parse_header(&[4u8, 0b111][..]).unwrap_err().is_corrupt_data());

        // last = 5, first = 2, three interior positions claimed within [3, 4].
        assert!(parse_header(&[5u8, 0b11010][..]).unwrap_err().is_corrupt_data());

        // last = 2^32 - 1 needs 32 bits for first.
        assert!(
            parse_header(&[0xffu8, 0xff, 0xff, 0xff, 0x0f, 0x00][..])
                .unwrap_err()
                .is_corrupt_data()
        );

        // last = u64::MAX, first = 0, u64::MAX - 1 interior positions: the
        // count does not fit in a u64.
        let data = raw_header(u64::MAX, 0, u64::MAX - 1);
        assert!(parse_header(data.as_slice()).unwrap_err().is_corrupt_data());

        let data = encode_positions(&[2, 3, 4]).unwrap();
        assert_eq!(data, [4, 0b1010]);
        let (header, _) = parse_header(data.as_slice()).unwrap();
        assert_eq!(header.count, 3);
    }

    #[test]
    fn test_huge_count_in_short_value() {
        // A 17-byte value claiming 2^39 interior positions.
        let data = raw_header(1 << 40, 0, 1 << 39);
        assert_eq!(data.len(), 17);
        let (header, _) = parse_header(data.as_slice()).unwrap();
        assert_eq!(header.count, (1 << 39) + 2);
        assert!(decode_positions(&data).unwrap_err().is_corrupt_data());
    }

    #[test]
    fn test_empty_value_is_invalid() {
        let empty: &[u8] = &[];
        assert!(parse_header(empty).unwrap_err().is_invalid_arg());
    }
}

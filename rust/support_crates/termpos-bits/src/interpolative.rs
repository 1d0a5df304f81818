//! Interpolative coding of strictly increasing integer sequences.
//!
//! A sequence of `n` distinct values known to lie in `[lo, hi]` is coded by
//! writing its middle element `v[m]` (`m = n / 2`) first, then the left half and
//! then the right half. Because the `m` smaller and `n - 1 - m` larger elements
//! must fit around it, `v[m]` is confined to `[lo + m, hi - (n - 1 - m)]` and is
//! written as an offset into that range using [`bits_needed`] of its span. The
//! halves are coded recursively with `[lo, v[m] - 1]` and `[v[m] + 1, hi]` as
//! their bounds. Dense runs cost nothing: a range whose span equals its element
//! count leaves zero bits per value.
//!
//! Decoding must track the ranges exactly like the encoder does, otherwise the
//! stream desynchronizes. [`InterpolativeReader`] does this lazily with an
//! explicit work stack, producing values in ascending order and skipping ranges
//! that lie below a target without materializing them.

use termpos_common::{Result, error::Error, verify_arg, verify_data};

use crate::bitstream::{BitReader, BitWriter, bits_needed};

/// Validates that `values` is strictly increasing and contained in `[lo, hi]`.
pub fn check_sequence(values: &[u64], lo: u64, hi: u64) -> Result<()> {
    let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
        return Ok(());
    };
    verify_arg!(range, lo <= first && last <= hi);
    if let Some(i) = values.windows(2).position(|pair| pair[0] >= pair[1]) {
        return Err(Error::invalid_arg(
            "values",
            format!(
                "sequence must be strictly ascending, found {} followed by {} at index {i}",
                values[i],
                values[i + 1]
            ),
        ));
    }
    Ok(())
}

/// Splits a range of `count` (>= 1) values into the middle index and the
/// tightened bounds of the middle value.
#[inline]
fn middle_bounds(lo: u64, hi: u64, count: u64) -> (u64, u64, u64) {
    let m = count / 2;
    (m, lo + m, hi - (count - 1 - m))
}

#[inline]
fn is_dense(lo: u64, hi: u64, count: u64) -> bool {
    hi - lo == count - 1
}

fn read_middle<B: AsRef<[u8]>>(reader: &mut BitReader<B>, low: u64, high: u64) -> Result<u64> {
    let span = high - low;
    let offset = reader.read(bits_needed(span))?;
    if offset > span {
        return Err(Error::corrupt_data(
            "interpolative stream",
            format!("offset {offset} exceeds range span {span}"),
        ));
    }
    Ok(low + offset)
}

impl BitWriter {
    /// Writes `values`, a strictly increasing sequence bounded by `[lo, hi]`,
    /// using interpolative coding.
    ///
    /// An empty sequence writes nothing; a single value is written as its offset
    /// from `lo` in `bits_needed(hi - lo)` bits. Sequences that are not strictly
    /// ascending or stray outside `[lo, hi]` are rejected before anything is
    /// written.
    pub fn encode_interpolative(&mut self, values: &[u64], lo: u64, hi: u64) -> Result<()> {
        check_sequence(values, lo, hi)?;
        self.encode_range(values, lo, hi);
        Ok(())
    }

    fn encode_range(&mut self, values: &[u64], lo: u64, hi: u64) {
        if values.is_empty() {
            return;
        }
        let (m, low, high) = middle_bounds(lo, hi, values.len() as u64);
        let m = m as usize;
        let value = values[m];
        debug_assert!(low <= value && value <= high);
        self.write(value - low, bits_needed(high - low));
        if m > 0 {
            self.encode_range(&values[..m], lo, value - 1);
        }
        if m + 1 < values.len() {
            self.encode_range(&values[m + 1..], value + 1, hi);
        }
    }
}

/// Eagerly decodes `count` interpolative-coded values bounded by `[lo, hi]`.
pub fn decode_interpolative<B: AsRef<[u8]>>(
    reader: &mut BitReader<B>,
    count: u64,
    lo: u64,
    hi: u64,
) -> Result<Vec<u64>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    verify_data!(count, lo <= hi && count - 1 <= hi - lo);
    let mut values = Vec::with_capacity(count.min(reader.remaining_bits() as u64) as usize);
    decode_range(reader, lo, hi, count, &mut values)?;
    Ok(values)
}

fn decode_range<B: AsRef<[u8]>>(
    reader: &mut BitReader<B>,
    lo: u64,
    hi: u64,
    count: u64,
    out: &mut Vec<u64>,
) -> Result<()> {
    let (m, low, high) = middle_bounds(lo, hi, count);
    let value = read_middle(reader, low, high)?;
    if m > 0 {
        decode_range(reader, lo, value - 1, m, out)?;
    }
    out.push(value);
    let right = count - 1 - m;
    if right > 0 {
        decode_range(reader, value + 1, hi, right, out)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    /// A range whose middle value has not been read yet.
    Pending { lo: u64, hi: u64, count: u64 },
    /// A value that is known but not yet returned.
    Value(u64),
}

/// Lazy, ascending-order decoder for an interpolative-coded sequence.
///
/// The work stack holds at most one pending range and one value per level of
/// the coding tree, so its depth is bounded by `log2(count) + 1`.
#[derive(Debug, Clone)]
pub struct InterpolativeReader<B = Vec<u8>> {
    reader: BitReader<B>,
    stack: Vec<Frame>,
    remaining: u64,
}

impl<B: AsRef<[u8]>> InterpolativeReader<B> {
    /// Prepares to decode `count` values bounded by `[lo, hi]` from `reader`.
    ///
    /// Nothing is read until the first call to [`next`](Self::next) or
    /// [`skip_to`](Self::skip_to). A `count` that cannot fit in the range is
    /// reported as corrupt data.
    pub fn new(reader: BitReader<B>, count: u64, lo: u64, hi: u64) -> Result<Self> {
        let mut stack = Vec::new();
        if count > 0 {
            verify_data!(count, lo <= hi && count - 1 <= hi - lo);
            stack.reserve(2 * (u64::BITS - count.leading_zeros()) as usize + 1);
            stack.push(Frame::Pending { lo, hi, count });
        }
        Ok(InterpolativeReader {
            reader,
            stack,
            remaining: count,
        })
    }

    /// Number of values not yet returned or skipped.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Returns the next value in ascending order, or `None` after the last one.
    pub fn next(&mut self) -> Result<Option<u64>> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Value(value) => {
                    self.remaining -= 1;
                    return Ok(Some(value));
                }
                Frame::Pending { lo, hi, count } => self.split(lo, hi, count)?,
            }
        }
        Ok(None)
    }

    /// Returns the smallest remaining value that is at least `target`, or `None`
    /// if there is none. All smaller values are consumed.
    ///
    /// Pending ranges that lie entirely below `target` are never expanded onto
    /// the stack. Dense ranges among them carry no bits and are dropped without
    /// touching the stream; the others are read through only to stay in sync.
    pub fn skip_to(&mut self, target: u64) -> Result<Option<u64>> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Value(value) => {
                    self.remaining -= 1;
                    if value >= target {
                        return Ok(Some(value));
                    }
                }
                Frame::Pending { lo, hi, count } if hi < target => {
                    self.remaining -= count;
                    self.pass_over(lo, hi, count)?;
                }
                Frame::Pending { lo, hi, count } => self.split(lo, hi, count)?,
            }
        }
        Ok(None)
    }

    /// Reads the middle value of a pending range and pushes its halves so the
    /// left half is decoded first.
    fn split(&mut self, lo: u64, hi: u64, count: u64) -> Result<()> {
        let (m, low, high) = middle_bounds(lo, hi, count);
        let value = read_middle(&mut self.reader, low, high)?;
        let right = count - 1 - m;
        if right > 0 {
            self.stack.push(Frame::Pending {
                lo: value + 1,
                hi,
                count: right,
            });
        }
        self.stack.push(Frame::Value(value));
        if m > 0 {
            self.stack.push(Frame::Pending {
                lo,
                hi: value - 1,
                count: m,
            });
        }
        Ok(())
    }

    /// Consumes the bits of a pending range without producing its values.
    fn pass_over(&mut self, lo: u64, hi: u64, count: u64) -> Result<()> {
        if is_dense(lo, hi, count) {
            return Ok(());
        }
        let (m, low, high) = middle_bounds(lo, hi, count);
        let value = read_middle(&mut self.reader, low, high)?;
        if m > 0 {
            self.pass_over(lo, value - 1, m)?;
        }
        let right = count - 1 - m;
        if right > 0 {
            self.pass_over(value + 1, hi, right)?;
        }
        Ok(())
    }
}

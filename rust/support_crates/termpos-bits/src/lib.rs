//! Bit-level codecs for position data.
//!
//! This crate knows nothing about keys, tables or documents. It provides:
//!
//! - [`BitWriter`] / [`BitReader`]: a dense, byte-aligned stream of arbitrary
//!   width unsigned integers.
//! - [`bits_needed`]: the width rule shared by every encoder and decoder.
//! - Interpolative coding of strictly increasing sequences: the
//!   [`BitWriter::encode_interpolative`] encoder, the eager
//!   [`decode_interpolative`] and the lazy [`InterpolativeReader`] that can skip
//!   forward without materializing the skipped values.
//!
//! # Example
//!
//! ```rust
//! use termpos_bits::{BitReader, BitWriter, InterpolativeReader};
//!
//! let positions = [3u64, 4, 5, 9, 27];
//! let mut writer = BitWriter::new();
//! writer.encode_interpolative(&positions, 0, 31).unwrap();
//! let data = writer.freeze();
//!
//! let mut reader = InterpolativeReader::new(BitReader::new(data), 5, 0, 31).unwrap();
//! assert_eq!(reader.skip_to(6).unwrap(), Some(9));
//! assert_eq!(reader.next().unwrap(), Some(27));
//! assert_eq!(reader.next().unwrap(), None);
//! ```

pub mod bitstream;
pub mod interpolative;

pub use bitstream::{BitReader, BitWriter, bits_needed};
pub use interpolative::{InterpolativeReader, check_sequence, decode_interpolative};

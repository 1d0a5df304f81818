//! Position lists of a search index.
//!
//! For every (document, term) pair the index stores the strictly ascending word
//! positions at which the term occurs. This crate provides:
//!
//! - [`key`]: sort-preserving table keys that group a term's documents together.
//! - [`codec`]: the compact encoded form of a position list (a varint header
//!   followed by an interpolative-coded bit stream).
//! - [`PositionListTable`]: storage of encoded lists in a lazily created sorted
//!   table.
//! - [`PositionListDecoder`]: streaming access with `next` and `skip_to`, as
//!   needed by phrase and proximity matching.
//!
//! # Example
//!
//! ```rust
//! use termpos_positions::{PositionListDecoder, PositionListTable};
//! use termpos_table::{MemoryStore, TableOptions};
//!
//! let table = PositionListTable::open(TableOptions::default(), MemoryStore::new()).unwrap();
//! let data = PositionListTable::<MemoryStore>::pack(&[3, 8, 21]).unwrap();
//! table.set_positionlist(10, b"cat", &data).unwrap();
//!
//! let mut decoder = PositionListDecoder::from_table(&table, 10, b"cat").unwrap();
//! assert_eq!(decoder.get_approx_size(), 3);
//! assert!(decoder.skip_to(5).unwrap());
//! assert_eq!(decoder.get_position().unwrap(), 8);
//! ```

pub mod codec;
pub mod decoder;
pub mod key;
pub mod table;

pub use codec::PositionListHeader;
pub use decoder::{DecoderState, PositionListDecoder, Positions};
pub use key::{DocId, TermCount, TermPos};
pub use table::{PositionListTable, TermEntries};

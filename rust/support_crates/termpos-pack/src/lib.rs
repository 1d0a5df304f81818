//! Byte-level packing primitives shared by the storage tables.
//!
//! Two families of encodings live here:
//!
//! - [`uint`]: compact variable-length unsigned integers for values (headers,
//!   counters). Not sort-preserving.
//! - [`sortable`]: sort-preserving encodings for table keys. Byte-lexicographic
//!   order of the encoded form matches the natural order of the values, and a
//!   non-final string field is self-terminating, so several fields can be
//!   concatenated into one composite key without ambiguity.
//!
//! # Usage
//!
//! ```rust
//! use termpos_pack::sortable::{pack_string_preserving_sort, pack_uint_preserving_sort};
//!
//! let mut first = Vec::new();
//! pack_string_preserving_sort(&mut first, b"cat", false);
//! pack_uint_preserving_sort(&mut first, 300);
//!
//! let mut second = Vec::new();
//! pack_string_preserving_sort(&mut second, b"cat", false);
//! pack_uint_preserving_sort(&mut second, 1000);
//!
//! assert!(first < second);
//! ```

pub mod sortable;
pub mod uint;

pub use sortable::{
    pack_string_preserving_sort, pack_uint_preserving_sort, unpack_string_preserving_sort,
    unpack_uint_preserving_sort,
};
pub use uint::{pack_uint, unpack_uint};

//! Sorted key-value table abstractions consumed by the index tables:
//! - `SortedTable`: a table of byte keys, totally ordered by byte value, with upsert,
//!   delete and cursor access.
//! - `TableCursor`: a seekable, forward-only iterator over a consistent view of a table.
//! - `LazyTable`: a table that only exists on storage once something has been written
//!   to it.
//!
//! The table engine itself (page layout, durability, compaction) lives behind these
//! traits. A simple memory-based engine is provided for tests and for callers that
//! do not need persistence.

pub mod lazy;
pub mod memory;

pub use lazy::{LazyTable, TableFactory, TableOptions, TableState};
pub use memory::{MemoryCursor, MemoryStore, MemoryTable};

/// A table of byte-string entries ordered by the byte-lexicographic order of their
/// keys.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Every cursor must observe a point-in-time
/// view of the table for its whole lifetime, regardless of concurrent writes.
pub trait SortedTable: Send + Sync + 'static {
    /// Inserts or overwrites the entry for `key`.
    fn put(&self, key: &[u8], value: &[u8]) -> std::io::Result<()>;

    /// Removes the entry for `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &[u8]) -> std::io::Result<()>;

    /// Returns true if the table holds no entries.
    fn is_empty(&self) -> std::io::Result<bool>;

    /// Creates a new, unpositioned cursor over the current contents of the table.
    fn cursor(&self) -> std::io::Result<Box<dyn TableCursor + '_>>;

    /// Reads the value stored under exactly `key`, if any.
    fn get_exact_entry(&self, key: &[u8]) -> std::io::Result<Option<Vec<u8>>> {
        let mut cursor = self.cursor()?;
        if cursor.seek(key)? {
            Ok(cursor.current_value().map(<[u8]>::to_vec))
        } else {
            Ok(None)
        }
    }
}

/// A forward-only iterator over the entries of a [`SortedTable`].
///
/// A cursor is created unpositioned; [`seek`](TableCursor::seek) positions it and
/// [`next`](TableCursor::next) advances it. Once it moves past the last entry,
/// [`current`](TableCursor::current) returns `None`.
pub trait TableCursor {
    /// Positions the cursor at the first entry whose key is greater than or equal to
    /// `key`.
    ///
    /// # Returns
    ///
    /// `true` if the cursor landed on an entry whose key equals `key` exactly.
    fn seek(&mut self, key: &[u8]) -> std::io::Result<bool>;

    /// Advances to the next entry in key order.
    ///
    /// # Returns
    ///
    /// `false` if the cursor moved past the last entry (or was never positioned).
    fn next(&mut self) -> std::io::Result<bool>;

    /// Returns the key and value of the entry the cursor is positioned at.
    fn current(&self) -> Option<(&[u8], &[u8])>;

    /// Returns the key of the current entry.
    fn current_key(&self) -> Option<&[u8]> {
        self.current().map(|(key, _)| key)
    }

    /// Returns the value of the current entry.
    fn current_value(&self) -> Option<&[u8]> {
        self.current().map(|(_, value)| value)
    }
}

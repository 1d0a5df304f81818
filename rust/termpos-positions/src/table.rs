//! Storage of position lists in a lazily created sorted table.

use termpos_common::{Result, error::Error, try_or_ret_some_err};
use termpos_table::{LazyTable, TableCursor, TableFactory, TableOptions, TableState};

use crate::{
    codec::{encode_positions, parse_header},
    key::{DocId, TermCount, TermPos, make_key, parse_key, term_prefix},
};

/// Table of encoded position lists keyed by (term, document id).
///
/// The underlying table is created by the first `set_positionlist` call. Until
/// then every lookup behaves as if the requested entry were missing.
pub struct PositionListTable<F: TableFactory> {
    table: LazyTable<F>,
}

impl<F: TableFactory> PositionListTable<F> {
    /// Opens the position table described by `options`, if it exists.
    pub fn open(options: TableOptions, factory: F) -> Result<Self> {
        Ok(PositionListTable {
            table: LazyTable::open(options, factory)?,
        })
    }

    /// Encodes a strictly ascending, non-empty list of positions.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `positions` is empty, contains duplicates or is not
    /// sorted.
    pub fn pack(positions: &[TermPos]) -> Result<Vec<u8>> {
        encode_positions(positions)
    }

    /// Stores the encoded position list of `term` in `did`, replacing any
    /// previous value. The bytes are stored as given.
    pub fn set_positionlist(&self, did: DocId, term: &[u8], data: &[u8]) -> Result<()> {
        let key = make_key(did, term);
        self.table.add(&key, data)
    }

    /// Removes the position list of `term` in `did`, if present.
    pub fn delete_positionlist(&self, did: DocId, term: &[u8]) -> Result<()> {
        let key = make_key(did, term);
        self.table.del(&key)
    }

    /// Returns the number of positions stored for `term` in `did`, or 0 if there
    /// is no entry. Only the header of the stored value is decoded.
    pub fn positionlist_count(&self, did: DocId, term: &[u8]) -> Result<TermCount> {
        match self.get_positionlist(did, term)? {
            Some(data) if !data.is_empty() => Ok(parse_header(data.as_slice())?.0.count),
            _ => Ok(0),
        }
    }

    /// Returns the encoded position list of `term` in `did`.
    pub fn get_positionlist(&self, did: DocId, term: &[u8]) -> Result<Option<Vec<u8>>> {
        let key = make_key(did, term);
        log::trace!("position lookup: did {did}, term {} bytes", term.len());
        self.table.get_exact_entry(&key)
    }

    /// Returns every (document id, encoded list) stored for `term`, in ascending
    /// document id order.
    pub fn term_entries(&self, term: &[u8]) -> Result<TermEntries<'_>> {
        let prefix = term_prefix(term);
        let cursor = match self.table.cursor()? {
            Some(mut cursor) => {
                log::trace!("scanning position lists, term {} bytes", term.len());
                cursor
                    .seek(&prefix)
                    .map_err(|e| Error::io("seek position table", e))?;
                Some(cursor)
            }
            None => None,
        };
        Ok(TermEntries { cursor, prefix })
    }

    pub fn state(&self) -> Result<TableState> {
        self.table.state()
    }

    pub(crate) fn lazy_table(&self) -> &LazyTable<F> {
        &self.table
    }
}

/// Iterator over the stored position lists of one term.
///
/// Created by [`PositionListTable::term_entries`].
pub struct TermEntries<'t> {
    cursor: Option<Box<dyn TableCursor + 't>>,
    prefix: Vec<u8>,
}

impl TermEntries<'_> {
    fn current(&self) -> Option<(&[u8], &[u8])> {
        let (key, value) = self.cursor.as_ref()?.current()?;
        key.starts_with(&self.prefix).then_some((key, value))
    }
}

impl Iterator for TermEntries<'_> {
    type Item = Result<(DocId, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.current()?;
        let entry = parse_key(key).map(|(did, _)| (did, value.to_vec()));
        if let Some(cursor) = self.cursor.as_mut() {
            try_or_ret_some_err!(
                cursor
                    .next()
                    .map_err(|e| Error::io("scan position table", e))
            );
        }
        Some(entry)
    }
}

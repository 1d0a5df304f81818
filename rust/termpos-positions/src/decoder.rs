//! Streaming decoder over one stored position list.

use termpos_bits::InterpolativeReader;
use termpos_common::{Result, error::Error, try_or_ret_some_err};
use termpos_table::{TableCursor, TableFactory};

use crate::{
    codec::{PositionListHeader, parse_header},
    key::{DocId, TermCount, TermPos, make_key},
    table::PositionListTable,
};

/// Position of a [`PositionListDecoder`] within its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No position has been returned yet.
    Unstarted,
    /// `get_position` returns the current position.
    Positioned,
    /// Every position has been passed. Terminal until the next `read_data`.
    Exhausted,
}

/// Walks the positions of one (document, term) list in ascending order.
///
/// The header (count, first, last) is parsed when data is loaded; interior
/// positions are decoded on demand, and `skip_to` passes over ranges below its
/// target without materializing them.
///
/// The decoder exclusively owns the table cursor used for its lookups. The
/// cursor is opened by the first `read_data` on a table and reused by later
/// lookups on the same table, in any key order; lookups therefore see the table
/// as it was when the cursor was opened. It is released when the decoder is
/// dropped or reads from another table.
pub struct PositionListDecoder<'t> {
    cursor: Option<TableLookup<'t>>,
    /// `None` while the decoder holds an empty list.
    header: Option<PositionListHeader>,
    interior: Option<InterpolativeReader<Vec<u8>>>,
    state: DecoderState,
    current: TermPos,
}

/// A cursor together with the table it was opened on.
struct TableLookup<'t> {
    table: *const (),
    cursor: Box<dyn TableCursor + 't>,
}

impl Default for PositionListDecoder<'_> {
    fn default() -> Self {
        PositionListDecoder {
            cursor: None,
            header: None,
            interior: None,
            state: DecoderState::Unstarted,
            current: 0,
        }
    }
}

impl<'t> PositionListDecoder<'t> {
    /// Creates a decoder holding an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder over the position list of `term` in `did`.
    ///
    /// A missing entry (or an absent table) yields a decoder over an empty list.
    pub fn from_table<F: TableFactory>(
        table: &'t PositionListTable<F>,
        did: DocId,
        term: &[u8],
    ) -> Result<Self> {
        let mut decoder = Self::new();
        decoder.read_data(table, did, term)?;
        Ok(decoder)
    }

    /// Loads the position list of `term` in `did`, replacing any previous state.
    ///
    /// # Returns
    ///
    /// `true` if the entry exists. On a miss the decoder holds an empty list.
    ///
    /// # Errors
    ///
    /// `CorruptData` if the stored header cannot be parsed, `Io` on table
    /// failures.
    pub fn read_data<F: TableFactory>(
        &mut self,
        table: &'t PositionListTable<F>,
        did: DocId,
        term: &[u8],
    ) -> Result<bool> {
        self.clear_list();
        let Some(cursor) = self.table_cursor(table)? else {
            return Ok(false);
        };
        let key = make_key(did, term);
        let hit = cursor
            .seek(&key)
            .map_err(|e| Error::io("seek position table", e))?;
        log::trace!("position list seek: did {did}, hit {hit}");
        let data = if hit {
            cursor.current_value().map(<[u8]>::to_vec)
        } else {
            None
        };
        match data {
            Some(data) if !data.is_empty() => self.load(data),
            _ => Ok(false),
        }
    }

    /// Loads an encoded position list held in memory, replacing any previous
    /// state. Empty input means there is no positional data.
    pub fn read_bytes(&mut self, data: &[u8]) -> Result<bool> {
        self.clear_list();
        if data.is_empty() {
            return Ok(false);
        }
        self.load(data.to_vec())
    }

    /// Moves to the first position, or to the one following the current
    /// position.
    ///
    /// # Returns
    ///
    /// `false` once the list is exhausted, and on every call after that.
    pub fn next(&mut self) -> Result<bool> {
        let Some(header) = self.header else {
            self.state = DecoderState::Exhausted;
            return Ok(false);
        };
        match self.state {
            DecoderState::Exhausted => Ok(false),
            DecoderState::Unstarted => Ok(self.land(header.first)),
            DecoderState::Positioned if self.current == header.last => {
                self.state = DecoderState::Exhausted;
                Ok(false)
            }
            DecoderState::Positioned => {
                let next = self.read_interior(|reader| reader.next())?;
                Ok(self.land(next.unwrap_or(header.last)))
            }
        }
    }

    /// Moves to the smallest position that is at least `target`.
    ///
    /// A target at or below the current position leaves the decoder where it is
    /// and returns `true`.
    ///
    /// # Returns
    ///
    /// `false` (and the decoder is exhausted) if every position is below
    /// `target`.
    pub fn skip_to(&mut self, target: TermPos) -> Result<bool> {
        let Some(header) = self.header else {
            self.state = DecoderState::Exhausted;
            return Ok(false);
        };
        match self.state {
            DecoderState::Exhausted => return Ok(false),
            DecoderState::Positioned if target <= self.current => return Ok(true),
            DecoderState::Unstarted if target <= header.first => {
                return Ok(self.land(header.first));
            }
            _ => {}
        }
        if target > header.last {
            self.state = DecoderState::Exhausted;
            return Ok(false);
        }
        if target == header.last {
            return Ok(self.land(header.last));
        }
        let found = self.read_interior(|reader| reader.skip_to(target))?;
        Ok(self.land(found.unwrap_or(header.last)))
    }

    /// Returns the current position.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless the last `next` or `skip_to` returned `true`.
    pub fn get_position(&self) -> Result<TermPos> {
        match self.state {
            DecoderState::Positioned => Ok(self.current),
            state => Err(Error::invalid_arg(
                "position",
                format!("decoder is not positioned ({state:?})"),
            )),
        }
    }

    /// Number of positions in the list, taken from the header.
    pub fn get_approx_size(&self) -> TermCount {
        self.header.map_or(0, |header| header.count)
    }

    /// The smallest position in the list.
    pub fn first(&self) -> Option<TermPos> {
        self.header.map(|header| header.first)
    }

    /// The largest position in the list.
    pub fn last(&self) -> Option<TermPos> {
        self.header.map(|header| header.last)
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Iterates over the positions not yet visited.
    pub fn positions(&mut self) -> Positions<'_, 't> {
        Positions { decoder: self }
    }

    /// Returns the cursor over `table`, opening it unless the previous lookup
    /// was on the same table. An absent table yields `None`.
    fn table_cursor<F: TableFactory>(
        &mut self,
        table: &'t PositionListTable<F>,
    ) -> Result<Option<&mut Box<dyn TableCursor + 't>>> {
        let id = (table as *const PositionListTable<F>).cast::<()>();
        if self
            .cursor
            .as_ref()
            .is_none_or(|lookup| !std::ptr::eq(lookup.table, id))
        {
            self.cursor = match table.lazy_table().cursor()? {
                Some(cursor) => Some(TableLookup { table: id, cursor }),
                None => None,
            };
        }
        Ok(self.cursor.as_mut().map(|lookup| &mut lookup.cursor))
    }

    fn clear_list(&mut self) {
        self.header = None;
        self.interior = None;
        self.state = DecoderState::Unstarted;
        self.current = 0;
    }

    fn load(&mut self, data: Vec<u8>) -> Result<bool> {
        let (header, reader) = parse_header(data).inspect_err(|e| {
            log::warn!("corrupt position list header: {e}");
        })?;
        let (count, lo, hi) = header.interior();
        self.interior = Some(InterpolativeReader::new(reader, count, lo, hi)?);
        self.header = Some(header);
        Ok(true)
    }

    fn land(&mut self, position: TermPos) -> bool {
        self.current = position;
        self.state = DecoderState::Positioned;
        true
    }

    fn read_interior(
        &mut self,
        read: impl FnOnce(&mut InterpolativeReader<Vec<u8>>) -> Result<Option<TermPos>>,
    ) -> Result<Option<TermPos>> {
        let Some(reader) = self.interior.as_mut() else {
            return Ok(None);
        };
        read(reader).inspect_err(|e| {
            log::warn!("corrupt position list body: {e}");
            self.state = DecoderState::Exhausted;
        })
    }
}

/// Iterator over the remaining positions of a [`PositionListDecoder`].
pub struct Positions<'d, 't> {
    decoder: &'d mut PositionListDecoder<'t>,
}

impl Iterator for Positions<'_, '_> {
    type Item = Result<TermPos>;

    fn next(&mut self) -> Option<Self::Item> {
        if !try_or_ret_some_err!(self.decoder.next()) {
            return None;
        }
        Some(self.decoder.get_position())
    }
}

//! Tables that are materialized on first write.

use std::sync::OnceLock;

use termpos_common::{Result, error::Error};

use crate::{SortedTable, TableCursor};

/// Options identifying and configuring a lazily created table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    name: String,
    readonly: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            name: "position".to_string(),
            readonly: false,
        }
    }
}

impl TableOptions {
    pub fn new(name: impl Into<String>) -> TableOptions {
        TableOptions::default().with_name(name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks the table read-only: writes fail with `InvalidOperation` and an absent
    /// table is never created.
    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn readonly(&self) -> bool {
        self.readonly
    }
}

/// Opens and creates the tables backing a [`LazyTable`].
pub trait TableFactory {
    type Table: SortedTable;

    /// Opens an existing table, returning `None` if it does not exist yet.
    fn open(&self, options: &TableOptions) -> std::io::Result<Option<Self::Table>>;

    /// Creates the table, or opens it if it already exists.
    fn create(&self, options: &TableOptions) -> std::io::Result<Self::Table>;
}

/// Existence state of a [`LazyTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    /// The table has never been written to.
    Absent,
    /// The table exists but holds no entries.
    Empty,
    /// The table exists and holds at least one entry.
    Populated,
}

/// A sorted table that only exists once something has been written to it.
///
/// Reads against an absent table behave like reads that find nothing. The first
/// write creates the table through the factory.
pub struct LazyTable<F: TableFactory> {
    factory: F,
    options: TableOptions,
    table: OnceLock<F::Table>,
}

impl<F: TableFactory> LazyTable<F> {
    /// Opens the table if it already exists, without creating it.
    pub fn open(options: TableOptions, factory: F) -> Result<Self> {
        let table = OnceLock::new();
        if let Some(existing) = factory
            .open(&options)
            .map_err(|e| Error::io(format!("open table '{}'", options.name()), e))?
        {
            let _ = table.set(existing);
        }
        Ok(LazyTable {
            factory,
            options,
            table,
        })
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Returns the underlying table, if it has been materialized.
    pub fn table(&self) -> Option<&F::Table> {
        self.table.get()
    }

    pub fn state(&self) -> Result<TableState> {
        let Some(table) = self.table.get() else {
            return Ok(TableState::Absent);
        };
        let empty = table.is_empty().map_err(|e| self.io_error("inspect", e))?;
        Ok(if empty {
            TableState::Empty
        } else {
            TableState::Populated
        })
    }

    /// Inserts or overwrites an entry, creating the table if needed.
    pub fn add(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.verify_writable("add")?;
        let table = self.materialize()?;
        table.put(key, value).map_err(|e| self.io_error("write", e))
    }

    /// Removes an entry. Does nothing if the table or the entry is absent.
    pub fn del(&self, key: &[u8]) -> Result<()> {
        self.verify_writable("del")?;
        match self.table.get() {
            Some(table) => table.remove(key).map_err(|e| self.io_error("delete from", e)),
            None => Ok(()),
        }
    }

    /// Point lookup of `key`. An absent table yields `None`.
    pub fn get_exact_entry(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.table.get() {
            Some(table) => table
                .get_exact_entry(key)
                .map_err(|e| self.io_error("read", e)),
            None => Ok(None),
        }
    }

    /// Creates a cursor over the table. An absent table yields `None`.
    pub fn cursor(&self) -> Result<Option<Box<dyn TableCursor + '_>>> {
        match self.table.get() {
            Some(table) => {
                let cursor = table.cursor().map_err(|e| self.io_error("open cursor on", e))?;
                Ok(Some(cursor))
            }
            None => Ok(None),
        }
    }

    fn materialize(&self) -> Result<&F::Table> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }
        let table = self
            .factory
            .create(&self.options)
            .map_err(|e| self.io_error("create", e))?;
        log::debug!("created table '{}'", self.options.name());
        // A concurrent writer may have created it first; both handles refer to the
        // same storage.
        let _ = self.table.set(table);
        self.table
            .get()
            .ok_or_else(|| Error::invalid_operation("materialize table"))
    }

    fn verify_writable(&self, op: &str) -> Result<()> {
        if self.options.readonly() {
            return Err(Error::invalid_operation(format!(
                "{op} on read-only table '{}'",
                self.options.name()
            )));
        }
        Ok(())
    }

    fn io_error(&self, action: &str, source: std::io::Error) -> Error {
        Error::io(format!("{action} table '{}'", self.options.name()), source)
    }
}

//! Memory-based sorted table engine.

use std::{
    collections::BTreeMap,
    ops::Bound,
    sync::{Arc, RwLock},
};

use ahash::AHashMap;

use crate::{SortedTable, TableCursor, lazy::TableFactory, lazy::TableOptions};

type Entries = BTreeMap<Vec<u8>, Vec<u8>>;

fn poisoned() -> std::io::Error {
    std::io::Error::other("memory table lock poisoned")
}

/// A sorted table held entirely in memory.
///
/// Writers replace the shared map copy-on-write, so every cursor keeps reading the
/// snapshot it was created from. Clones share the same underlying table.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    entries: Arc<RwLock<Arc<Entries>>>,
}

impl MemoryTable {
    pub fn new() -> MemoryTable {
        MemoryTable::default()
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> std::io::Result<usize> {
        Ok(self.snapshot()?.len())
    }

    fn snapshot(&self) -> std::io::Result<Arc<Entries>> {
        let guard = self.entries.read().map_err(|_| poisoned())?;
        Ok(Arc::clone(&guard))
    }

    fn update(&self, f: impl FnOnce(&mut Entries)) -> std::io::Result<()> {
        let mut guard = self.entries.write().map_err(|_| poisoned())?;
        f(Arc::make_mut(&mut guard));
        Ok(())
    }
}

impl SortedTable for MemoryTable {
    fn put(&self, key: &[u8], value: &[u8]) -> std::io::Result<()> {
        self.update(|entries| {
            entries.insert(key.to_vec(), value.to_vec());
        })
    }

    fn remove(&self, key: &[u8]) -> std::io::Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn is_empty(&self) -> std::io::Result<bool> {
        Ok(self.snapshot()?.is_empty())
    }

    fn cursor(&self) -> std::io::Result<Box<dyn TableCursor + '_>> {
        Ok(Box::new(MemoryCursor::new(self.snapshot()?)))
    }

    fn get_exact_entry(&self, key: &[u8]) -> std::io::Result<Option<Vec<u8>>> {
        Ok(self.snapshot()?.get(key).cloned())
    }
}

/// Cursor over a point-in-time snapshot of a [`MemoryTable`].
#[derive(Debug)]
pub struct MemoryCursor {
    snapshot: Arc<Entries>,
    /// Key of the current entry; `None` when unpositioned or past the end.
    current: Option<Vec<u8>>,
}

impl MemoryCursor {
    fn new(snapshot: Arc<Entries>) -> MemoryCursor {
        MemoryCursor {
            snapshot,
            current: None,
        }
    }

    fn land(&mut self, lower: Bound<&[u8]>) -> bool {
        self.current = self
            .snapshot
            .range::<[u8], _>((lower, Bound::Unbounded))
            .next()
            .map(|(key, _)| key.clone());
        self.current.is_some()
    }
}

impl TableCursor for MemoryCursor {
    fn seek(&mut self, key: &[u8]) -> std::io::Result<bool> {
        self.land(Bound::Included(key));
        Ok(self.current.as_deref() == Some(key))
    }

    fn next(&mut self) -> std::io::Result<bool> {
        let Some(current) = self.current.take() else {
            return Ok(false);
        };
        Ok(self.land(Bound::Excluded(current.as_slice())))
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        let key = self.current.as_deref()?;
        self.snapshot
            .get_key_value(key)
            .map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}

/// A namespace of named memory tables that hands them out through
/// [`TableFactory`].
///
/// Cloning the store shares the namespace, so a table created through one handle is
/// visible to every other handle.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<AHashMap<String, MemoryTable>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Returns true if a table named `name` has been created.
    pub fn contains(&self, name: &str) -> std::io::Result<bool> {
        Ok(self.tables.read().map_err(|_| poisoned())?.contains_key(name))
    }
}

impl TableFactory for MemoryStore {
    type Table = MemoryTable;

    fn open(&self, options: &TableOptions) -> std::io::Result<Option<MemoryTable>> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.get(options.name()).cloned())
    }

    fn create(&self, options: &TableOptions) -> std::io::Result<MemoryTable> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        Ok(tables
            .entry(options.name().to_string())
            .or_default()
            .clone())
    }
}

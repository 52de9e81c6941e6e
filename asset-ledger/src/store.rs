//! Store adapter: ordered key-value access for the ledger
//!
//! # Layers
//!
//! - [`Backend`] - a physical ordered key space with atomic batch writes
//!   ([`RocksStore`], [`MemoryStore`])
//! - [`StateStore`] - the get/put/range-scan contract operations run against
//! - [`StoreTransaction`] - a write-buffering overlay over a backend. Reads
//!   see the operation's own writes; [`StoreTransaction::commit`] applies
//!   every write in one batch, dropping it discards them.

use crate::{
    error::{Error, Result},
    Config,
};
use parking_lot::RwLock;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch,
    WriteOptions, DB,
};
use std::cmp::Ordering;
use std::collections::{btree_map, BTreeMap};
use std::iter::Peekable;
use std::ops::Bound;

/// Column family holding all ledger state
const CF_STATE: &str = "state";

/// One scanned entry
pub type ScanItem = Result<(String, Vec<u8>)>;

/// Lazy, ascending range scan. Dropping it releases the underlying iterator.
pub type RangeScan<'a> = Box<dyn Iterator<Item = ScanItem> + 'a>;

/// Physical ordered key space
pub trait Backend: Send + Sync {
    /// Read one key
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Scan `[start, end)` in ascending key order
    fn scan(&self, start: &str, end: &str) -> Result<RangeScan<'_>>;

    /// Apply all writes atomically
    fn write_batch(&self, writes: Vec<(String, Vec<u8>)>) -> Result<()>;
}

/// Store contract consumed by ledger operations
pub trait StateStore {
    /// Read one key
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write one key
    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Scan `[start, end)` in ascending key order
    fn range_scan(&self, start: &str, end: &str) -> Result<RangeScan<'_>>;
}

/// RocksDB-backed key space
pub struct RocksStore {
    db: DB,
    sync_writes: bool,
}

impl std::fmt::Debug for RocksStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksStore")
            .field("path", &self.db.path())
            .field("sync_writes", &self.sync_writes)
            .finish_non_exhaustive()
    }
}

impl RocksStore {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(
            CF_STATE,
            Self::cf_options_state(),
        )];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!(path = ?path, "Opened RocksDB ledger store");

        Ok(Self {
            db,
            sync_writes: config.rocksdb.sync_writes,
        })
    }

    fn cf_options_state() -> Options {
        let mut opts = Options::default();
        // State is frequently read, use LZ4 for speed
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_handle(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_STATE)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", CF_STATE)))
    }
}

fn decode_key(raw: Box<[u8]>) -> Result<String> {
    String::from_utf8(raw.into_vec()).map_err(|e| Error::Storage(format!("Non UTF-8 key: {}", e)))
}

impl Backend for RocksStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.cf_handle()?;
        Ok(self.db.get_cf(cf, key.as_bytes())?)
    }

    fn scan(&self, start: &str, end: &str) -> Result<RangeScan<'_>> {
        let cf = self.cf_handle()?;
        let end = end.to_string();

        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(start.as_bytes(), Direction::Forward))
            .map(|item| -> ScanItem {
                let (key, value) = item?;
                Ok((decode_key(key)?, value.into_vec()))
            })
            .take_while(move |item| match item {
                Ok((key, _)) => key.as_str() < end.as_str(),
                Err(_) => true,
            });

        Ok(Box::new(iter))
    }

    fn write_batch(&self, writes: Vec<(String, Vec<u8>)>) -> Result<()> {
        let cf = self.cf_handle()?;
        let mut batch = WriteBatch::default();
        for (key, value) in &writes {
            batch.put_cf(cf, key.as_bytes(), value);
        }

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.sync_writes);

        // Atomic commit
        self.db.write_opt(batch, &write_opts)?;
        Ok(())
    }
}

/// In-memory ordered key space
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every entry, in key order
    pub fn entries(&self) -> Vec<(String, Vec<u8>)> {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Backend for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn scan(&self, start: &str, end: &str) -> Result<RangeScan<'_>> {
        if start >= end {
            return Ok(Box::new(std::iter::empty()));
        }
        // Snapshot so the lock is not held while the caller iterates
        let snapshot: Vec<ScanItem> = self
            .entries
            .read()
            .range::<str, _>((Bound::Included(start), Bound::Excluded(end)))
            .map(|(k, v)| Ok((k.clone(), v.clone())))
            .collect();
        Ok(Box::new(snapshot.into_iter()))
    }

    fn write_batch(&self, writes: Vec<(String, Vec<u8>)>) -> Result<()> {
        let mut entries = self.entries.write();
        entries.extend(writes);
        Ok(())
    }
}

/// Write-buffering transaction over a backend
///
/// The atomic unit of one ledger operation.
pub struct StoreTransaction<'a, B: Backend + ?Sized> {
    backend: &'a B,
    writes: BTreeMap<String, Vec<u8>>,
}

impl<'a, B: Backend + ?Sized> std::fmt::Debug for StoreTransaction<'a, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreTransaction")
            .field("pending_writes", &self.writes.len())
            .finish_non_exhaustive()
    }
}

impl<'a, B: Backend + ?Sized> StoreTransaction<'a, B> {
    /// Start a transaction with no pending writes
    pub fn begin(backend: &'a B) -> Self {
        Self {
            backend,
            writes: BTreeMap::new(),
        }
    }

    /// Number of buffered writes
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Apply all buffered writes as one batch, returning how many keys were written
    pub fn commit(self) -> Result<usize> {
        let count = self.writes.len();
        if count > 0 {
            self.backend.write_batch(self.writes.into_iter().collect())?;
        }
        Ok(count)
    }
}

impl<'a, B: Backend + ?Sized> StateStore for StoreTransaction<'a, B> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.writes.get(key) {
            Some(value) => Ok(Some(value.clone())),
            None => self.backend.get(key),
        }
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.writes.insert(key.to_string(), value);
        Ok(())
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<RangeScan<'_>> {
        if start >= end {
            return Ok(Box::new(std::iter::empty()));
        }
        let base = self.backend.scan(start, end)?;
        let overlay = self
            .writes
            .range::<str, _>((Bound::Included(start), Bound::Excluded(end)));

        Ok(Box::new(MergedScan {
            base: base.peekable(),
            overlay: overlay.peekable(),
        }))
    }
}

/// Merges a backend scan with buffered writes; buffered values win on equal keys
struct MergedScan<'a> {
    base: Peekable<RangeScan<'a>>,
    overlay: Peekable<btree_map::Range<'a, String, Vec<u8>>>,
}

enum Next {
    Base,
    Overlay,
    Both,
}

impl<'a> Iterator for MergedScan<'a> {
    type Item = ScanItem;

    fn next(&mut self) -> Option<ScanItem> {
        let next = match (self.base.peek(), self.overlay.peek()) {
            (None, None) => return None,
            (Some(Err(_)), _) | (Some(Ok(_)), None) => Next::Base,
            (None, Some(_)) => Next::Overlay,
            (Some(Ok((base_key, _))), Some((overlay_key, _))) => {
                match base_key.as_str().cmp(overlay_key.as_str()) {
                    Ordering::Less => Next::Base,
                    Ordering::Greater => Next::Overlay,
                    Ordering::Equal => Next::Both,
                }
            }
        };

        match next {
            Next::Base => self.base.next(),
            Next::Overlay => self.overlay.next().map(|(k, v)| Ok((k.clone(), v.clone()))),
            Next::Both => {
                self.base.next();
                self.overlay.next().map(|(k, v)| Ok((k.clone(), v.clone())))
            }
        }
    }
}

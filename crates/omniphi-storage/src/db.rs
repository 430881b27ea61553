use crate::{Result, StorageError};
use rocksdb::{ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::Arc;

/// Column-family database backing a chain module's stores.
///
/// Keys that encode integers use big-endian bytes so RocksDB's lexicographic
/// iteration order equals numeric order.
pub struct ModuleDB {
    db: Arc<DB>,
}

impl ModuleDB {
    /// Open the database at `path`, creating the named column families.
    pub fn open<P: AsRef<Path>>(path: P, column_families: &[&str]) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let cfs: Vec<ColumnFamilyDescriptor> = column_families
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::Database(format!("column family {name} not found")))
    }

    pub fn get(&self, cf: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get_cf(self.cf(cf)?, key)?)
    }

    pub fn has(&self, cf: &str, key: &[u8]) -> Result<bool> {
        Ok(self.get(cf, key)?.is_some())
    }

    pub fn put(&self, cf: &str, key: &[u8], value: &[u8]) -> Result<()> {
        Ok(self.db.put_cf(self.cf(cf)?, key, value)?)
    }

    pub fn delete(&self, cf: &str, key: &[u8]) -> Result<()> {
        Ok(self.db.delete_cf(self.cf(cf)?, key)?)
    }

    /// Start a batch; all puts/deletes land atomically on `commit`.
    pub fn batch(&self) -> StateBatch<'_> {
        StateBatch { db: self, inner: WriteBatch::default() }
    }

    /// All entries of a column family in ascending key order.
    pub fn scan_all(&self, cf: &str) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut out = Vec::new();
        for item in self.db.iterator_cf(self.cf(cf)?, IteratorMode::Start) {
            let (key, value) = item?;
            out.push((key.to_vec(), value.to_vec()));
        }
        Ok(out)
    }

    /// Entries with `from <= key <= to`, ascending.
    pub fn scan_range(&self, cf: &str, from: &[u8], to: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut out = Vec::new();
        let mode = IteratorMode::From(from, Direction::Forward);
        for item in self.db.iterator_cf(self.cf(cf)?, mode) {
            let (key, value) = item?;
            if key.as_ref() > to {
                break;
            }
            out.push((key.to_vec(), value.to_vec()));
        }
        Ok(out)
    }
}

/// Write batch bound to its database; commits atomically.
pub struct StateBatch<'a> {
    db: &'a ModuleDB,
    inner: WriteBatch,
}

impl StateBatch<'_> {
    pub fn put(&mut self, cf: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner.put_cf(self.db.cf(cf)?, key, value);
        Ok(())
    }

    pub fn delete(&mut self, cf: &str, key: &[u8]) -> Result<()> {
        self.inner.delete_cf(self.db.cf(cf)?, key);
        Ok(())
    }

    pub fn commit(self) -> Result<()> {
        self.db.db.write(self.inner)?;
        Ok(())
    }
}

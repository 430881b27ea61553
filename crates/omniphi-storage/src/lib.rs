// Durable state layer: RocksDB column families behind a small module-facing
// API. Every logical mutation goes through a single WriteBatch so it commits
// atomically with the enclosing block.

pub mod db;
pub mod error;

pub use db::{ModuleDB, StateBatch};
pub use error::{Result, StorageError};

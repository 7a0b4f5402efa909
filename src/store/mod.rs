//!
//! jsop store module
//! -----------------
//! This module implements the record store for jsop: a thin adapter over an
//! embedded byte-keyed database (sled) that presents structured addresses as
//! keys and JSON values as records. A document is laid out as a flat
//! collection of such records so that any node can be located in O(1)
//! lookups regardless of document size.
//!
//! Key responsibilities:
//! - Encoding addresses to byte keys (components joined by `0xFF`).
//! - Encoding record values as JSON text (UTF-8, no trailing newline).
//! - A session-scoped write-through cache that collapses repeated reads.
//! - Open modes: create-new, read-write (must exist), read-only.
//!
//! The public API centers around the `Store` type; container semantics are
//! layered on top of it by the `node` module.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::error::{JsopError, JsopResult};

mod address;
pub use address::Address;

/// How a database is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Truncate any existing database at the path, or create a fresh one.
    CreateNew,
    /// Open an existing database for reading and writing.
    ReadWrite,
    /// Open an existing database; every mutation fails with NotWritable.
    ReadOnly,
}

/// Record store over an embedded byte-keyed database.
///
/// All operations take `&self`; the read cache sits behind a mutex so a
/// single store can back any number of node handles within a session.
/// The cache is write-through: populated on get and put, invalidated on
/// delete. It is correct under the single-writer-per-session rule.
pub struct Store {
    db: sled::Db,
    mode: OpenMode,
    cache: Mutex<HashMap<Address, Value>>,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> JsopResult<Self> {
        let path = path.as_ref();
        match mode {
            OpenMode::CreateNew => {
                if path.exists() {
                    fs::remove_dir_all(path)?;
                }
            }
            OpenMode::ReadWrite | OpenMode::ReadOnly => {
                if !path.exists() {
                    return Err(JsopError::io(format!(
                        "no database at '{}'",
                        path.display()
                    )));
                }
            }
        }
        debug!(target: "jsop::store", "open: path='{}' mode={:?}", path.display(), mode);
        let db = sled::open(path)?;
        Ok(Self { db, mode, cache: Mutex::new(HashMap::new()) })
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    fn ensure_writable(&self) -> JsopResult<()> {
        if self.mode == OpenMode::ReadOnly {
            return Err(JsopError::not_writable("store is open read-only"));
        }
        Ok(())
    }

    /// Read and decode the record at `address`. Fails with MissingRecord
    /// when no record exists there. Decoded values are memoised.
    pub fn get(&self, address: &Address) -> JsopResult<Value> {
        if let Some(value) = self.cache.lock().get(address) {
            return Ok(value.clone());
        }
        let bytes = self
            .db
            .get(address.encode())?
            .ok_or_else(|| JsopError::missing_record(address.to_string()))?;
        let value: Value = serde_json::from_slice(&bytes)?;
        self.cache.lock().insert(address.clone(), value.clone());
        Ok(value)
    }

    /// Write the record at `address`, echoing the value into the cache.
    pub fn put(&self, address: &Address, value: &Value) -> JsopResult<()> {
        self.ensure_writable()?;
        let bytes = serde_json::to_vec(value)?;
        self.db.insert(address.encode(), bytes)?;
        self.cache.lock().insert(address.clone(), value.clone());
        Ok(())
    }

    /// Delete the record at `address`. Fails with MissingRecord when no
    /// record exists there.
    pub fn delete(&self, address: &Address) -> JsopResult<()> {
        self.ensure_writable()?;
        let previous = self.db.remove(address.encode())?;
        self.cache.lock().remove(address);
        if previous.is_none() {
            return Err(JsopError::missing_record(address.to_string()));
        }
        Ok(())
    }

    pub fn contains(&self, address: &Address) -> JsopResult<bool> {
        if self.cache.lock().contains_key(address) {
            return Ok(true);
        }
        Ok(self.db.contains_key(address.encode())?)
    }

    /// Enumerate every record address currently in the store.
    pub fn keys(&self) -> JsopResult<Vec<Address>> {
        let mut out = Vec::new();
        for item in self.db.iter() {
            let (key, _) = item?;
            out.push(Address::decode(&key)?);
        }
        Ok(out)
    }

    pub fn flush(&self) -> JsopResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

//!
//! jsop session module
//! -------------------
//! Top-level open/init/export surface. A `Jsop` names a database on disk;
//! opening it validates the format metadata and yields a `Session`, whose
//! root handle is the entry point for all navigation. Handles borrow the
//! session, so the borrow checker enforces that they do not outlive it.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{JsopError, JsopResult};
use crate::node::{self, Node};
use crate::store::{Address, OpenMode, Store};

const FORMAT_NAME: &str = "JSOP";
const FORMAT_VERSION_MAJOR: u64 = 1;
const FORMAT_VERSION_MINOR: u64 = 0;

fn meta_name() -> Address {
    Address::of(["m", "format-name"])
}

fn meta_major() -> Address {
    Address::of(["m", "format-version-major"])
}

fn meta_minor() -> Address {
    Address::of(["m", "format-version-minor"])
}

/// A jsop database on disk.
///
/// ```no_run
/// use serde_json::json;
/// use jsop::session::Jsop;
///
/// # fn main() -> jsop::error::JsopResult<()> {
/// let db = Jsop::new("/path/to/db");
/// db.init(&json!({"name": "example"}))?;
/// let session = db.open()?;
/// let root = session.root()?.as_map().unwrap();
/// root.put("age", &json!(30))?;
/// session.close()?;
/// # Ok(())
/// # }
/// ```
pub struct Jsop {
    path: PathBuf,
}

impl Jsop {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Create a fresh database holding `value` as its root. Any existing
    /// database at the path is truncated.
    pub fn init(&self, value: &Value) -> JsopResult<()> {
        debug!(target: "jsop::session", "init: path='{}'", self.path.display());
        let store = Store::open(&self.path, OpenMode::CreateNew)?;
        store.put(&meta_name(), &Value::from(FORMAT_NAME))?;
        store.put(&meta_major(), &Value::from(FORMAT_VERSION_MAJOR))?;
        store.put(&meta_minor(), &Value::from(FORMAT_VERSION_MINOR))?;
        node::assign(&store, &Address::root(), value)?;
        store.flush()
    }

    /// Synonym of `init`.
    pub fn dump(&self, value: &Value) -> JsopResult<()> {
        self.init(value)
    }

    /// Snapshot the whole database as an in-memory value.
    pub fn export(&self) -> JsopResult<Value> {
        let session = self.open_readonly()?;
        let value = session.root()?.export()?;
        session.close()?;
        Ok(value)
    }

    /// Synonym of `export`.
    pub fn load(&self) -> JsopResult<Value> {
        self.export()
    }

    pub fn open(&self) -> JsopResult<Session> {
        self.open_mode(OpenMode::ReadWrite)
    }

    pub fn open_readonly(&self) -> JsopResult<Session> {
        self.open_mode(OpenMode::ReadOnly)
    }

    fn open_mode(&self, mode: OpenMode) -> JsopResult<Session> {
        self.validate_format()?;
        let store = Store::open(&self.path, mode)?;
        Ok(Session { store })
    }

    // Read-only probe of the metadata triple, released before the real
    // open. Unreadable metadata is Corrupt; readable-but-wrong metadata
    // is UnsupportedFormat.
    fn validate_format(&self) -> JsopResult<()> {
        let probe = Store::open(&self.path, OpenMode::ReadOnly)
            .map_err(|err| JsopError::corrupt(format!("cannot open database: {}", err)))?;
        let name = probe
            .get(&meta_name())
            .map_err(|err| JsopError::corrupt(format!("cannot read format name: {}", err)))?;
        let major = probe
            .get(&meta_major())
            .map_err(|err| JsopError::corrupt(format!("cannot read format version: {}", err)))?;
        let minor = probe
            .get(&meta_minor())
            .map_err(|err| JsopError::corrupt(format!("cannot read format version: {}", err)))?;
        drop(probe);

        if name.as_str() != Some(FORMAT_NAME) {
            return Err(JsopError::unsupported(format!("format name mismatch: {}", name)));
        }
        if major.as_u64() != Some(FORMAT_VERSION_MAJOR) {
            return Err(JsopError::unsupported(format!("unsupported major version: {}", major)));
        }
        match minor.as_u64() {
            Some(m) if m <= FORMAT_VERSION_MINOR => Ok(()),
            _ => Err(JsopError::unsupported(format!("unsupported minor version: {}", minor))),
        }
    }
}

/// An open database scope. The store is held exclusively until the
/// session closes; all handles resolve their reads and writes through it.
pub struct Session {
    store: Store,
}

impl Session {
    /// Handle to the document root.
    pub fn root(&self) -> JsopResult<Node<'_>> {
        node::fetch(&self.store, &Address::root())
    }

    /// The underlying record store, for address-level inspection.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Flush and release the store. Dropping the session releases it as
    /// well; `close` only makes the flush explicit.
    pub fn close(self) -> JsopResult<()> {
        self.store.flush()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;

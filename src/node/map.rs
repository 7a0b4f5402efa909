use serde_json::Value;

use crate::error::{JsopError, JsopResult};
use crate::store::{Address, Store};

use super::{assign, fetch, remove, Node};

/// Live handle to an insertion-ordered map node.
///
/// A map at address `A` is stored as its `{}` marker plus a head/tail/size
/// triple at `A·(n)`, `A·(p)`, `A·(s)`, and per entry `k` a prev/next pair
/// at `A·(k,k,p)`, `A·(k,k,n)` with the value subtree rooted at
/// `A·(k,k,v)`. The handle owns no state; every operation reads and
/// writes records through the session store.
///
/// Keys are text. A caller holding a non-text key uses its canonical text
/// form, so the integer `7` and the string `"7"` name the same entry.
#[derive(Clone)]
pub struct MapNode<'a> {
    store: &'a Store,
    address: Address,
}

impl<'a> MapNode<'a> {
    pub(crate) fn new(store: &'a Store, address: Address) -> Self {
        Self { store, address }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    // One nullable-key record: null or a key string.
    fn read_link(&self, address: &Address) -> JsopResult<Option<String>> {
        match self.store.get(address)? {
            Value::Null => Ok(None),
            Value::String(key) => Ok(Some(key)),
            other => Err(JsopError::corrupt(format!(
                "linkage record at {} holds {} instead of a key",
                address, other
            ))),
        }
    }

    fn write_link(&self, address: &Address, key: Option<&str>) -> JsopResult<()> {
        let value = match key {
            Some(key) => Value::String(key.to_string()),
            None => Value::Null,
        };
        self.store.put(address, &value)
    }

    pub(crate) fn head_key(&self) -> JsopResult<Option<String>> {
        self.read_link(&self.address.head())
    }

    pub(crate) fn tail_key(&self) -> JsopResult<Option<String>> {
        self.read_link(&self.address.tail())
    }

    pub(crate) fn next_key(&self, key: &str) -> JsopResult<Option<String>> {
        self.read_link(&self.address.entry_next(key))
    }

    pub(crate) fn prev_key(&self, key: &str) -> JsopResult<Option<String>> {
        self.read_link(&self.address.entry_prev(key))
    }

    /// Write the empty head/tail/size triple for a freshly created node.
    pub(crate) fn init_node(&self) -> JsopResult<()> {
        self.write_link(&self.address.head(), None)?;
        self.write_link(&self.address.tail(), None)?;
        self.store.put(&self.address.size(), &Value::from(0u64))
    }

    pub fn len(&self) -> JsopResult<usize> {
        match self.store.get(&self.address.size())? {
            Value::Number(n) => n
                .as_u64()
                .map(|v| v as usize)
                .ok_or_else(|| JsopError::corrupt(format!("size record at {} is negative", self.address.size()))),
            other => Err(JsopError::corrupt(format!(
                "size record at {} holds {} instead of a count",
                self.address.size(),
                other
            ))),
        }
    }

    pub fn is_empty(&self) -> JsopResult<bool> {
        Ok(self.len()? == 0)
    }

    fn set_len(&self, len: usize) -> JsopResult<()> {
        self.store.put(&self.address.size(), &Value::from(len as u64))
    }

    pub fn contains(&self, key: &str) -> JsopResult<bool> {
        self.store.contains(&self.address.entry_value(key))
    }

    /// Fetch the value of `key`: a scalar, or a handle when the entry
    /// holds a nested container. Fails with MissingKey if absent.
    pub fn get(&self, key: &str) -> JsopResult<Node<'a>> {
        if !self.contains(key)? {
            return Err(JsopError::missing_key(key));
        }
        fetch(self.store, &self.address.entry_value(key))
    }

    /// Set `key` to `value`. A new key is linked as the new tail, so
    /// iteration preserves insertion order; an existing key keeps its
    /// position and has its old value (and any subtree) destroyed.
    pub fn put(&self, key: &str, value: &Value) -> JsopResult<()> {
        if !self.contains(key)? {
            self.link_tail(key)?;
        }
        assign(self.store, &self.address.entry_value(key), value)
    }

    fn link_tail(&self, key: &str) -> JsopResult<()> {
        let last = self.tail_key()?;
        self.write_link(&self.address.entry_prev(key), last.as_deref())?;
        self.write_link(&self.address.entry_next(key), None)?;
        match &last {
            Some(last) => self.write_link(&self.address.entry_next(last), Some(key))?,
            None => self.write_link(&self.address.head(), Some(key))?,
        }
        self.write_link(&self.address.tail(), Some(key))?;
        self.set_len(self.len()? + 1)
    }

    /// Remove `key` and its value subtree, relinking the neighbours.
    pub fn delete(&self, key: &str) -> JsopResult<()> {
        if !self.contains(key)? {
            return Err(JsopError::missing_key(key));
        }
        let prev = self.prev_key(key)?;
        let next = self.next_key(key)?;
        remove(self.store, &self.address.entry_value(key))?;
        self.store.delete(&self.address.entry_prev(key))?;
        self.store.delete(&self.address.entry_next(key))?;
        match &prev {
            Some(prev) => self.write_link(&self.address.entry_next(prev), next.as_deref())?,
            None => self.write_link(&self.address.head(), next.as_deref())?,
        }
        match &next {
            Some(next) => self.write_link(&self.address.entry_prev(next), prev.as_deref())?,
            None => self.write_link(&self.address.tail(), prev.as_deref())?,
        }
        self.set_len(self.len()? - 1)
    }

    /// Keys in insertion order. The iterator advances to the successor
    /// before yielding a key, so deleting the yielded key does not
    /// corrupt the walk; a not-yet-visited key that gets deleted simply
    /// never appears.
    pub fn iter(&self) -> Keys<'a> {
        Keys { map: self.clone(), current: None, last: None, started: false }
    }

    pub fn keys(&self) -> JsopResult<Vec<String>> {
        self.iter().collect()
    }

    pub fn values(&self) -> JsopResult<Vec<Node<'a>>> {
        let mut out = Vec::new();
        for key in self.iter() {
            out.push(self.get(&key?)?);
        }
        Ok(out)
    }

    pub fn items(&self) -> JsopResult<Vec<(String, Node<'a>)>> {
        let mut out = Vec::new();
        for key in self.iter() {
            let key = key?;
            let value = self.get(&key)?;
            out.push((key, value));
        }
        Ok(out)
    }

    /// Delete every entry, head first.
    pub fn clear(&self) -> JsopResult<()> {
        while let Some(key) = self.head_key()? {
            self.delete(&key)?;
        }
        Ok(())
    }

    /// Value of `key` as a snapshot, or `default` when absent.
    pub fn get_or(&self, key: &str, default: &Value) -> JsopResult<Value> {
        if self.contains(key)? {
            self.get(key)?.export()
        } else {
            Ok(default.clone())
        }
    }

    /// Remove `key` and return its value as a snapshot.
    pub fn pop(&self, key: &str) -> JsopResult<Value> {
        if !self.contains(key)? {
            return Err(JsopError::missing_key(key));
        }
        let value = self.get(key)?.export()?;
        self.delete(key)?;
        Ok(value)
    }

    pub fn pop_or(&self, key: &str, default: &Value) -> JsopResult<Value> {
        if self.contains(key)? {
            self.pop(key)
        } else {
            Ok(default.clone())
        }
    }

    /// Remove and return the head entry. Fails with EmptyContainer when
    /// the map has no entries.
    pub fn popitem(&self) -> JsopResult<(String, Value)> {
        let head = self
            .head_key()?
            .ok_or_else(|| JsopError::empty("popitem on an empty map"))?;
        let value = self.get(&head)?.export()?;
        self.delete(&head)?;
        Ok((head, value))
    }

    /// Insert `default` under `key` when absent, then return the value.
    pub fn setdefault(&self, key: &str, default: &Value) -> JsopResult<Node<'a>> {
        if !self.contains(key)? {
            self.put(key, default)?;
        }
        self.get(key)
    }

    pub fn update_from_map(&self, entries: &serde_json::Map<String, Value>) -> JsopResult<()> {
        for (key, value) in entries {
            self.put(key, value)?;
        }
        Ok(())
    }

    pub fn update_from_pairs<I>(&self, pairs: I) -> JsopResult<()>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        for (key, value) in pairs {
            self.put(&key, &value)?;
        }
        Ok(())
    }

    /// Depth-first snapshot in insertion order.
    pub fn export(&self) -> JsopResult<Value> {
        let mut out = serde_json::Map::new();
        let mut current = self.head_key()?;
        while let Some(key) = current {
            let next = self.next_key(&key)?;
            out.insert(key.clone(), self.get(&key)?.export()?);
            current = next;
        }
        Ok(Value::Object(out))
    }

    pub fn copy(&self) -> JsopResult<Value> {
        self.export()
    }

    // Invoked by the dereferencer before the marker record is deleted.
    pub(crate) fn destroy(&self) -> JsopResult<()> {
        self.clear()?;
        self.store.delete(&self.address.head())?;
        self.store.delete(&self.address.tail())?;
        self.store.delete(&self.address.size())
    }
}

/// Lazy key iterator over a map node, in insertion order. The state is a
/// single upcoming key, so the walk stays cheap to re-enter after the
/// caller deletes the yielded entry.
pub struct Keys<'a> {
    map: MapNode<'a>,
    current: Option<String>,
    last: Option<String>,
    started: bool,
}

impl<'a> Iterator for Keys<'a> {
    type Item = JsopResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            self.current = match self.map.head_key() {
                Ok(head) => head,
                Err(err) => return Some(Err(err)),
            };
        }
        loop {
            let key = self.current.take()?;
            match self.map.contains(&key) {
                Ok(true) => {
                    // Advance before yielding so the caller may delete `key`.
                    self.current = match self.map.next_key(&key) {
                        Ok(next) => next,
                        Err(err) => return Some(Err(err)),
                    };
                    self.last = Some(key.clone());
                    return Some(Ok(key));
                }
                // The upcoming key was deleted since it was captured; its
                // unlink rewired the predecessor, so re-read from there.
                Ok(false) => {
                    let resumed = match &self.last {
                        Some(last) => self.map.next_key(last),
                        None => self.map.head_key(),
                    };
                    self.current = match resumed {
                        Ok(next) => next,
                        Err(err) => return Some(Err(err)),
                    };
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

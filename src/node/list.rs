use std::cmp::Ordering;

use serde_json::Value;

use crate::error::{JsopError, JsopResult};
use crate::store::{Address, Store};

use super::{MapNode, Node};

/// Live handle to a list node.
///
/// A sequence of length `n` is a map node whose keys are the decimal
/// strings `"0"..="n-1"`, linked in that order. Index-shifting mutations
/// (delete, insert, remove) move element values between neighbouring
/// keys and drop or add the last key, so after every completed operation
/// the keys are dense again. Lists inherit map cost: random access is
/// O(1) record lookups, shifts are O(n) element copies.
#[derive(Clone)]
pub struct ListNode<'a> {
    map: MapNode<'a>,
}

impl<'a> ListNode<'a> {
    pub(crate) fn new(store: &'a Store, address: Address) -> Self {
        Self { map: MapNode::new(store, address) }
    }

    pub fn address(&self) -> &Address {
        self.map.address()
    }

    pub(crate) fn init_node(&self) -> JsopResult<()> {
        self.map.init_node()
    }

    pub fn len(&self) -> JsopResult<usize> {
        self.map.len()
    }

    pub fn is_empty(&self) -> JsopResult<bool> {
        self.map.is_empty()
    }

    // Negative indices count from the end; anything outside the bounds
    // fails with OutOfRange.
    fn normalise(&self, index: i64, len: usize) -> JsopResult<usize> {
        let shifted = if index < 0 { index + len as i64 } else { index };
        if shifted < 0 || shifted >= len as i64 {
            return Err(JsopError::out_of_range(index, len));
        }
        Ok(shifted as usize)
    }

    pub fn get(&self, index: i64) -> JsopResult<Node<'a>> {
        let len = self.len()?;
        let i = self.normalise(index, len)?;
        self.map.get(&i.to_string())
    }

    /// Replace the element at `index`, destroying any subtree it held.
    pub fn put(&self, index: i64, value: &Value) -> JsopResult<()> {
        let len = self.len()?;
        let i = self.normalise(index, len)?;
        self.map.put(&i.to_string(), value)
    }

    pub fn append(&self, value: &Value) -> JsopResult<()> {
        let len = self.len()?;
        self.map.put(&len.to_string(), value)
    }

    pub fn prepend(&self, value: &Value) -> JsopResult<()> {
        self.insert(0, value)
    }

    /// Remove and return the last element. Fails with EmptyContainer on
    /// an empty list.
    pub fn pop(&self) -> JsopResult<Value> {
        let len = self.len()?;
        if len == 0 {
            return Err(JsopError::empty("pop on an empty list"));
        }
        self.map.pop(&(len - 1).to_string())
    }

    /// Remove the element at `index`, shifting the tail left.
    pub fn delete(&self, index: i64) -> JsopResult<()> {
        let len = self.len()?;
        let i = self.normalise(index, len)?;
        self.shift_left(i, len)?;
        self.pop()?;
        Ok(())
    }

    // self[j] := self[j+1] for j in from..len-1; leaves a stale copy at
    // the end for the caller to pop.
    fn shift_left(&self, from: usize, len: usize) -> JsopResult<()> {
        for j in from..len.saturating_sub(1) {
            let value = self.map.get(&(j + 1).to_string())?.export()?;
            self.map.put(&j.to_string(), &value)?;
        }
        Ok(())
    }

    /// Insert `value` before `index`. Indices past the end append, and
    /// indices below `-len` prepend, as in a dense array.
    pub fn insert(&self, index: i64, value: &Value) -> JsopResult<()> {
        let len = self.len()?;
        if index >= len as i64 {
            return self.append(value);
        }
        let i = if index < -(len as i64) {
            0
        } else if index < 0 {
            (index + len as i64) as usize
        } else {
            index as usize
        };
        self.append(&Value::Null)?;
        for j in ((i + 1)..=len).rev() {
            let shifted = self.map.get(&(j - 1).to_string())?.export()?;
            self.map.put(&j.to_string(), &shifted)?;
        }
        self.map.put(&i.to_string(), value)
    }

    /// Remove the first element deeply equal to `value`. Fails with
    /// NotFound when nothing matches.
    pub fn remove(&self, value: &Value) -> JsopResult<()> {
        let len = self.len()?;
        for i in 0..len {
            if self.map.get(&i.to_string())?.eq_value(value)? {
                self.shift_left(i, len)?;
                self.pop()?;
                return Ok(());
            }
        }
        Err(JsopError::not_found(format!("no element equal to {}", value)))
    }

    pub fn contains(&self, value: &Value) -> JsopResult<bool> {
        for item in self.iter()? {
            if item?.eq_value(value)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Index of the first element deeply equal to `value` within
    /// `start..stop` (`stop` defaults to the length). Fails with
    /// NotFound when nothing matches.
    pub fn index_of(&self, value: &Value, start: usize, stop: Option<usize>) -> JsopResult<usize> {
        let len = self.len()?;
        let stop = stop.unwrap_or(len).min(len);
        for i in start..stop {
            if self.map.get(&i.to_string())?.eq_value(value)? {
                return Ok(i);
            }
        }
        Err(JsopError::not_found(format!("no element equal to {}", value)))
    }

    pub fn count(&self, value: &Value) -> JsopResult<usize> {
        let mut n = 0;
        for item in self.iter()? {
            if item?.eq_value(value)? {
                n += 1;
            }
        }
        Ok(n)
    }

    /// Elements in index order. The iterator must not be used across a
    /// mutation that shifts indices.
    pub fn iter(&self) -> JsopResult<Items<'a>> {
        let len = self.len()?;
        Ok(Items { list: self.clone(), front: 0, back: len })
    }

    pub fn extend<I>(&self, items: I) -> JsopResult<()>
    where
        I: IntoIterator<Item = Value>,
    {
        for item in items {
            self.append(&item)?;
        }
        Ok(())
    }

    /// Fresh snapshot of this list followed by `other`.
    pub fn concat(&self, other: &[Value]) -> JsopResult<Value> {
        let mut out = self.snapshot()?;
        out.extend_from_slice(other);
        Ok(Value::Array(out))
    }

    /// Fresh snapshot of this list repeated `n` times.
    pub fn repeat(&self, n: usize) -> JsopResult<Value> {
        let snapshot = self.snapshot()?;
        let mut out = Vec::with_capacity(snapshot.len() * n);
        for _ in 0..n {
            out.extend(snapshot.iter().cloned());
        }
        Ok(Value::Array(out))
    }

    /// Extend this list with its own content until it holds `n` copies.
    pub fn repeat_in_place(&self, n: usize) -> JsopResult<()> {
        if n == 0 {
            return self.clear();
        }
        let snapshot = self.snapshot()?;
        for _ in 1..n {
            self.extend(snapshot.iter().cloned())?;
        }
        Ok(())
    }

    /// Sort in place: snapshot, order in memory, rewrite. Elements of
    /// mixed kinds order by kind (null, bool, number, string, list, map).
    pub fn sort(&self) -> JsopResult<()> {
        let mut snapshot = self.snapshot()?;
        snapshot.sort_by(value_cmp);
        self.rewrite(snapshot)
    }

    pub fn reverse(&self) -> JsopResult<()> {
        let mut snapshot = self.snapshot()?;
        snapshot.reverse();
        self.rewrite(snapshot)
    }

    fn rewrite(&self, items: Vec<Value>) -> JsopResult<()> {
        self.map.clear()?;
        self.extend(items)
    }

    // Snapshot in linkage order. Walks the key linkage rather than the
    // decimal indices so it stays usable while cell removals have left
    // key gaps.
    fn snapshot(&self) -> JsopResult<Vec<Value>> {
        let mut out = Vec::new();
        for key in self.map.iter() {
            out.push(self.map.get(&key?)?.export()?);
        }
        Ok(out)
    }

    pub fn export(&self) -> JsopResult<Value> {
        Ok(Value::Array(self.snapshot()?))
    }

    pub fn copy(&self) -> JsopResult<Value> {
        self.export()
    }

    pub fn clear(&self) -> JsopResult<()> {
        self.map.clear()
    }

    /// Cell handles for each element, frozen to the entry keys at call
    /// time. Cells address entries independently of their index, so
    /// removing one cell does not invalidate the others; the list is
    /// compacted back to dense indices when the `Cells` iterator drops.
    pub fn cells(&self) -> JsopResult<Cells<'a>> {
        let keys = self.map.keys()?;
        Ok(Cells { list: self.clone(), keys: keys.into_iter() })
    }

    pub(crate) fn destroy(&self) -> JsopResult<()> {
        self.map.destroy()
    }

    // Dense iff the keys are exactly {"0".."len-1"}. Entry keys only
    // ever come from append, so they are increasing decimal integers;
    // the tail key equals len-1 exactly when no gap exists.
    fn is_dense(&self) -> JsopResult<bool> {
        let len = self.len()?;
        if len == 0 {
            return Ok(self.map.head_key()?.is_none());
        }
        Ok(self.map.tail_key()?.as_deref() == Some((len - 1).to_string().as_str()))
    }

    pub(crate) fn compact(&self) -> JsopResult<()> {
        crate::tprintln!("[list.compact] reindexing {}", self.address());
        let snapshot = self.snapshot()?;
        self.rewrite(snapshot)
    }
}

/// Element iterator over a list node, in index order. Supports reverse
/// iteration through `DoubleEndedIterator`.
pub struct Items<'a> {
    list: ListNode<'a>,
    front: usize,
    back: usize,
}

impl<'a> Iterator for Items<'a> {
    type Item = JsopResult<Node<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.list.get(self.front as i64);
        self.front += 1;
        Some(item)
    }
}

impl<'a> DoubleEndedIterator for Items<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.list.get(self.back as i64))
    }
}

/// Handle to one list entry at its frozen map key. This is the only API
/// whose view of an entry survives removals of other entries in the same
/// iteration.
pub struct Cell<'a> {
    map: MapNode<'a>,
    key: String,
}

impl<'a> Cell<'a> {
    pub fn value(&self) -> JsopResult<Node<'a>> {
        self.map.get(&self.key)
    }

    pub fn put(&self, value: &Value) -> JsopResult<()> {
        self.map.put(&self.key, value)
    }

    pub fn remove(&self) -> JsopResult<()> {
        self.map.delete(&self.key)
    }

    pub fn export(&self) -> JsopResult<Value> {
        self.value()?.export()
    }
}

/// Iterator of cell handles. On drop, restores index density if cell
/// removals left gaps in the key sequence.
pub struct Cells<'a> {
    list: ListNode<'a>,
    keys: std::vec::IntoIter<String>,
}

impl<'a> Iterator for Cells<'a> {
    type Item = Cell<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        Some(Cell { map: self.list.map.clone(), key })
    }
}

impl<'a> Drop for Cells<'a> {
    fn drop(&mut self) {
        if !self.list.is_dense().unwrap_or(true) {
            let _ = self.list.compact();
        }
    }
}

// Total order over values for sort(): kind rank first, then value within
// a kind. Numbers compare as f64; containers compare element-wise.
fn value_cmp(a: &Value, b: &Value) -> Ordering {
    fn kind_rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (xi, yi) in x.iter().zip(y.iter()) {
                let ord = value_cmp(xi, yi);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            for ((xk, xv), (yk, yv)) in x.iter().zip(y.iter()) {
                let ord = xk.cmp(yk).then_with(|| value_cmp(xv, yv));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

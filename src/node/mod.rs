//!
//! jsop node module
//! ----------------
//! Value-oriented view over the record store. The dereferencer turns an
//! address into either a primitive value or a live handle to a container
//! node; assignment and removal keep the composite-value lifecycle honest
//! by destroying a container's subtree before its record is replaced or
//! deleted, so no orphaned records are left behind.
//!
//! A non-empty container stores only a marker (`{}` or `[]`) in its own
//! record; its contents live in child records below its address. Handles
//! borrow the open session's store and are invalidated when it closes.

use serde_json::Value;

use crate::error::{JsopError, JsopResult};
use crate::store::{Address, Store};

mod list;
mod map;

pub use list::{Cell, Cells, Items, ListNode};
pub use map::{Keys, MapNode};

/// What lives at an address: a primitive value, or a handle to a
/// container node rooted there.
pub enum Node<'a> {
    Value(Value),
    Map(MapNode<'a>),
    List(ListNode<'a>),
}

impl<'a> Node<'a> {
    /// Depth-first snapshot as an in-memory value, detached from the store.
    pub fn export(&self) -> JsopResult<Value> {
        match self {
            Node::Value(value) => Ok(value.clone()),
            Node::Map(map) => map.export(),
            Node::List(list) => list.export(),
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Node::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<MapNode<'a>> {
        match self {
            Node::Map(map) => Some(map.clone()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<ListNode<'a>> {
        match self {
            Node::List(list) => Some(list.clone()),
            _ => None,
        }
    }

    /// Structural deep equality against a snapshot value. Containers
    /// compare by element-wise export; cross-kind comparisons are false.
    pub fn eq_value(&self, other: &Value) -> JsopResult<bool> {
        match self {
            Node::Value(value) => Ok(value == other),
            Node::Map(map) => {
                if !other.is_object() {
                    return Ok(false);
                }
                Ok(map.export()? == *other)
            }
            Node::List(list) => {
                if !other.is_array() {
                    return Ok(false);
                }
                Ok(list.export()? == *other)
            }
        }
    }
}

/// Dereference `address`: a `{}` record yields a map handle, a `[]`
/// record a list handle, anything else the scalar itself.
pub fn fetch<'a>(store: &'a Store, address: &Address) -> JsopResult<Node<'a>> {
    let value = store.get(address)?;
    Ok(match value {
        Value::Object(_) => Node::Map(MapNode::new(store, address.clone())),
        Value::Array(_) => Node::List(ListNode::new(store, address.clone())),
        scalar => Node::Value(scalar),
    })
}

pub fn exists(store: &Store, address: &Address) -> JsopResult<bool> {
    store.contains(address)
}

/// Write `value` at `address`, replacing whatever was there. An existing
/// record is removed first so a replaced container cannot leave orphaned
/// child records. Composite values are written as a marker plus one
/// record per element, recursively, preserving document order.
pub fn assign(store: &Store, address: &Address, value: &Value) -> JsopResult<()> {
    ensure_assignable(store, address)?;
    if store.contains(address)? {
        remove(store, address)?;
    }
    match value {
        Value::Object(entries) => {
            store.put(address, &Value::Object(serde_json::Map::new()))?;
            let map = MapNode::new(store, address.clone());
            map.init_node()?;
            for (key, child) in entries {
                map.put(key, child)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            store.put(address, &Value::Array(Vec::new()))?;
            let list = ListNode::new(store, address.clone());
            list.init_node()?;
            for item in items {
                list.append(item)?;
            }
            Ok(())
        }
        scalar => store.put(address, scalar),
    }
}

/// Delete the record at `address`, destroying the subtree first when the
/// record is a container marker. Fails with MissingRecord if absent.
pub fn remove(store: &Store, address: &Address) -> JsopResult<()> {
    match fetch(store, address)? {
        Node::Map(map) => map.destroy()?,
        Node::List(list) => list.destroy()?,
        Node::Value(_) => {}
    }
    store.delete(address)
}

// Assignment targets are the document root or the value record of an
// entry in a live container; anything else is not a legal creation
// target.
fn ensure_assignable(store: &Store, address: &Address) -> JsopResult<()> {
    if address.is_root() {
        return Ok(());
    }
    match address.parent_of_entry() {
        Some((container, _)) if store.contains(&container)? => Ok(()),
        _ => Err(JsopError::invalid_address(address.to_string())),
    }
}

use std::fmt::{Display, Formatter};

use crate::error::{JsopError, JsopResult};

/// Separator between address components in encoded keys. `0xFF` never
/// occurs in well-formed UTF-8, so user-supplied components cannot
/// contain it. The choice is a format commitment: files written with a
/// different separator are not readable by this crate.
pub(crate) const SEPARATOR: u8 = 0xFF;

/// Structured key of one record: an ordered sequence of text components.
/// The root of the document is the empty sequence. Container metadata and
/// entry records hang off a container's address using the reserved
/// components `p` (tail), `n` (head), `s` (size), `k`/`v` (entry), `m`
/// (format metadata).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Address(Vec<String>);

impl Address {
    /// The address of the document root.
    pub fn root() -> Self {
        Address(Vec::new())
    }

    pub fn of<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Address(components.into_iter().map(Into::into).collect())
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &Address) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    pub fn child(&self, component: impl Into<String>) -> Address {
        let mut components = self.0.clone();
        components.push(component.into());
        Address(components)
    }

    /// Address of the value record of entry `key` in the container rooted
    /// here. The value of a composite entry is the root of its subtree.
    pub fn entry_value(&self, key: &str) -> Address {
        self.entry_record(key, "v")
    }

    pub(crate) fn entry_prev(&self, key: &str) -> Address {
        self.entry_record(key, "p")
    }

    pub(crate) fn entry_next(&self, key: &str) -> Address {
        self.entry_record(key, "n")
    }

    fn entry_record(&self, key: &str, slot: &str) -> Address {
        let mut components = self.0.clone();
        components.push("k".to_string());
        components.push(key.to_string());
        components.push(slot.to_string());
        Address(components)
    }

    /// Tail-key record of the container rooted here.
    pub(crate) fn tail(&self) -> Address {
        self.child("p")
    }

    /// Head-key record of the container rooted here.
    pub(crate) fn head(&self) -> Address {
        self.child("n")
    }

    /// Size record of the container rooted here.
    pub(crate) fn size(&self) -> Address {
        self.child("s")
    }

    /// If this address names an entry value record `A·(k, key, v)`,
    /// return the container address `A` and the entry key.
    pub(crate) fn parent_of_entry(&self) -> Option<(Address, String)> {
        let n = self.0.len();
        if n >= 3 && self.0[n - 3] == "k" && self.0[n - 1] == "v" {
            Some((Address(self.0[..n - 3].to_vec()), self.0[n - 2].clone()))
        } else {
            None
        }
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(SEPARATOR);
            }
            out.extend_from_slice(component.as_bytes());
        }
        out
    }

    pub(crate) fn decode(bytes: &[u8]) -> JsopResult<Address> {
        if bytes.is_empty() {
            return Ok(Address::root());
        }
        let mut components = Vec::new();
        for part in bytes.split(|b| *b == SEPARATOR) {
            let text = std::str::from_utf8(part)
                .map_err(|_| JsopError::corrupt("record key component is not UTF-8"))?;
            components.push(text.to_string());
        }
        Ok(Address(components))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.0.join("/"))
    }
}

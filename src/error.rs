//! Unified error model for the jsop crate.
//! This module provides a common error enum used across the record store,
//! the container nodes and the session layer, along with a result alias.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsopError {
    /// No record exists at the given address.
    MissingRecord { address: String },
    /// A map was asked for a key it does not hold.
    MissingKey { key: String },
    /// A list index fell outside the current bounds.
    OutOfRange { index: i64, len: usize },
    /// A linear search over a list found no matching element.
    NotFound { message: String },
    /// A pop-style operation was applied to an empty container.
    EmptyContainer { message: String },
    /// A mutation was attempted through a read-only session.
    NotWritable { message: String },
    /// Metadata or linkage records are missing or malformed.
    Corrupt { message: String },
    /// The format metadata is readable but not supported by this build.
    UnsupportedFormat { message: String },
    /// The address is neither an existing record nor a legal creation target.
    InvalidAddress { address: String },
    /// A failure in the underlying store or the filesystem.
    Io { message: String },
}

impl JsopError {
    pub fn missing_record<S: Into<String>>(address: S) -> Self {
        JsopError::MissingRecord { address: address.into() }
    }
    pub fn missing_key<S: Into<String>>(key: S) -> Self {
        JsopError::MissingKey { key: key.into() }
    }
    pub fn out_of_range(index: i64, len: usize) -> Self {
        JsopError::OutOfRange { index, len }
    }
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        JsopError::NotFound { message: msg.into() }
    }
    pub fn empty<S: Into<String>>(msg: S) -> Self {
        JsopError::EmptyContainer { message: msg.into() }
    }
    pub fn not_writable<S: Into<String>>(msg: S) -> Self {
        JsopError::NotWritable { message: msg.into() }
    }
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        JsopError::Corrupt { message: msg.into() }
    }
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        JsopError::UnsupportedFormat { message: msg.into() }
    }
    pub fn invalid_address<S: Into<String>>(address: S) -> Self {
        JsopError::InvalidAddress { address: address.into() }
    }
    pub fn io<S: Into<String>>(msg: S) -> Self {
        JsopError::Io { message: msg.into() }
    }
}

impl Display for JsopError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JsopError::MissingRecord { address } => write!(f, "missing record at {}", address),
            JsopError::MissingKey { key } => write!(f, "missing key '{}'", key),
            JsopError::OutOfRange { index, len } => {
                write!(f, "index {} out of range for length {}", index, len)
            }
            JsopError::NotFound { message } => write!(f, "not found: {}", message),
            JsopError::EmptyContainer { message } => write!(f, "empty container: {}", message),
            JsopError::NotWritable { message } => write!(f, "not writable: {}", message),
            JsopError::Corrupt { message } => write!(f, "corrupt database: {}", message),
            JsopError::UnsupportedFormat { message } => {
                write!(f, "unsupported format: {}", message)
            }
            JsopError::InvalidAddress { address } => write!(f, "invalid address {}", address),
            JsopError::Io { message } => write!(f, "io error: {}", message),
        }
    }
}

impl std::error::Error for JsopError {}

pub type JsopResult<T> = Result<T, JsopError>;

impl From<sled::Error> for JsopError {
    fn from(err: sled::Error) -> Self {
        JsopError::Io { message: err.to_string() }
    }
}

impl From<std::io::Error> for JsopError {
    fn from(err: std::io::Error) -> Self {
        JsopError::Io { message: err.to_string() }
    }
}

impl From<serde_json::Error> for JsopError {
    fn from(err: serde_json::Error) -> Self {
        JsopError::Corrupt { message: format!("record is not valid JSON: {}", err) }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;

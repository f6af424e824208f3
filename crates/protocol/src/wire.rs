//! Dynamic wire values
//!
//! # Purpose
//! The remote interface is defined per protocol generation and loaded by the
//! transport at runtime, so call arguments and results cross the seam as a small
//! self-describing value tree rather than generated types.
//!
//! # Shapes
//! - `Struct`: named-field record (channel, user, ACL rule, ban, ...)
//! - `Map`: dictionary with arbitrary keys, kept in wire order
//! - `List`: sequence
//! - `Bytes` / `Text`: string data; older generations send raw UTF-8 bytes

use bytes::Bytes;
use mctl_core::{CtlError, Result};
use std::collections::BTreeMap;

/// Named fields of a wire record
pub type Fields = BTreeMap<String, WireValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    Unit,
    Bool(bool),
    Int(i64),
    Bytes(Bytes),
    Text(String),
    List(Vec<WireValue>),
    Map(Vec<(WireValue, WireValue)>),
    Struct(Fields),
}

impl WireValue {
    pub fn text(s: impl Into<String>) -> Self {
        WireValue::Text(s.into())
    }

    pub fn bytes(b: impl Into<Bytes>) -> Self {
        WireValue::Bytes(b.into())
    }

    /// Build a record from `(field, value)` pairs
    pub fn record<'a>(fields: impl IntoIterator<Item = (&'a str, WireValue)>) -> Self {
        WireValue::Struct(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WireValue::Unit => "unit",
            WireValue::Bool(_) => "bool",
            WireValue::Int(_) => "int",
            WireValue::Bytes(_) => "bytes",
            WireValue::Text(_) => "text",
            WireValue::List(_) => "list",
            WireValue::Map(_) => "map",
            WireValue::Struct(_) => "struct",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            WireValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            WireValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            WireValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            WireValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn expect_int(&self, what: &str) -> Result<i64> {
        self.as_int().ok_or_else(|| mismatch(what, "int", self))
    }

    pub fn expect_bool(&self, what: &str) -> Result<bool> {
        self.as_bool().ok_or_else(|| mismatch(what, "bool", self))
    }

    pub fn into_list(self, what: &str) -> Result<Vec<WireValue>> {
        match self {
            WireValue::List(items) => Ok(items),
            other => Err(mismatch(what, "list", &other)),
        }
    }

    pub fn into_map(self, what: &str) -> Result<Vec<(WireValue, WireValue)>> {
        match self {
            WireValue::Map(entries) => Ok(entries),
            other => Err(mismatch(what, "map", &other)),
        }
    }

    pub fn into_struct(self, what: &str) -> Result<Fields> {
        match self {
            WireValue::Struct(fields) => Ok(fields),
            other => Err(mismatch(what, "struct", &other)),
        }
    }

    /// Raw byte payload; accepts text as its UTF-8 encoding
    pub fn into_payload(self, what: &str) -> Result<Bytes> {
        match self {
            WireValue::Bytes(b) => Ok(b),
            WireValue::Text(s) => Ok(Bytes::from(s.into_bytes())),
            other => Err(mismatch(what, "bytes", &other)),
        }
    }
}

impl From<bool> for WireValue {
    fn from(v: bool) -> Self {
        WireValue::Bool(v)
    }
}

impl From<i64> for WireValue {
    fn from(v: i64) -> Self {
        WireValue::Int(v)
    }
}

impl From<u32> for WireValue {
    fn from(v: u32) -> Self {
        WireValue::Int(v as i64)
    }
}

impl From<i32> for WireValue {
    fn from(v: i32) -> Self {
        WireValue::Int(v as i64)
    }
}

fn mismatch(what: &str, expected: &str, got: &WireValue) -> CtlError {
    CtlError::Protocol(format!("{}: expected {}, got {}", what, expected, got.kind()))
}

/// Read-only view over a wire record with typed field access
pub struct Record<'a> {
    name: &'a str,
    fields: &'a Fields,
}

impl<'a> Record<'a> {
    pub fn new(name: &'a str, fields: &'a Fields) -> Self {
        Self { name, fields }
    }

    pub fn get(&self, field: &str) -> Option<&'a WireValue> {
        self.fields.get(field)
    }

    pub fn require(&self, field: &str) -> Result<&'a WireValue> {
        self.fields.get(field).ok_or_else(|| {
            CtlError::Protocol(format!("{} record has no field '{}'", self.name, field))
        })
    }

    pub fn int(&self, field: &str) -> Result<i64> {
        self.require(field)?.expect_int(&self.path(field))
    }

    /// Integer field, `default` when the generation does not send it
    pub fn int_or(&self, field: &str, default: i64) -> Result<i64> {
        match self.get(field) {
            Some(v) => v.expect_int(&self.path(field)),
            None => Ok(default),
        }
    }

    pub fn bool_or(&self, field: &str, default: bool) -> Result<bool> {
        match self.get(field) {
            Some(v) => v.expect_bool(&self.path(field)),
            None => Ok(default),
        }
    }

    pub fn ints_or_empty(&self, field: &str) -> Result<Vec<i64>> {
        match self.get(field) {
            Some(v) => v
                .clone()
                .into_list(&self.path(field))?
                .iter()
                .map(|item| item.expect_int(&self.path(field)))
                .collect(),
            None => Ok(Vec::new()),
        }
    }

    pub fn path(&self, field: &str) -> String {
        format!("{}.{}", self.name, field)
    }
}

//! String encoding normalization
//!
//! Generations before 1.5 put raw UTF-8 byte strings on the wire; 1.5 and later
//! are text-native. [`normalize`] is the one place bytes become text, and it is
//! only applied at ingestion for the generations that need it.

use crate::wire::WireValue;
use mctl_core::{CtlError, Result};

/// Recursively convert a wire value to its text form
///
/// Byte strings decode as UTF-8 (invalid sequences become U+FFFD), containers are
/// normalized element-wise keeping their shape, and every other scalar becomes
/// its text representation. The output only contains `Text`, `List`, `Map` and
/// `Struct`, so normalizing twice is the same as normalizing once.
pub fn normalize(value: WireValue) -> WireValue {
    match value {
        WireValue::Text(s) => WireValue::Text(s),
        WireValue::Bytes(b) => WireValue::Text(decode_utf8(&b)),
        WireValue::Int(v) => WireValue::Text(v.to_string()),
        WireValue::Bool(v) => WireValue::Text(v.to_string()),
        WireValue::Unit => WireValue::Text(String::new()),
        WireValue::List(items) => WireValue::List(items.into_iter().map(normalize).collect()),
        WireValue::Map(entries) => WireValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (normalize(k), normalize(v)))
                .collect(),
        ),
        WireValue::Struct(fields) => WireValue::Struct(
            fields
                .into_iter()
                .map(|(k, v)| (k, normalize(v)))
                .collect(),
        ),
    }
}

fn decode_utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// How a generation puts strings on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    /// Raw UTF-8 byte sequences
    Utf8Bytes,
    /// Already-decoded text
    Native,
}

impl StringEncoding {
    pub fn encode(&self, s: &str) -> WireValue {
        match self {
            StringEncoding::Utf8Bytes => WireValue::bytes(s.as_bytes().to_vec()),
            StringEncoding::Native => WireValue::text(s),
        }
    }

    /// Decode one string value received from the wire
    pub fn decode(&self, value: &WireValue, what: &str) -> Result<String> {
        match (self, value) {
            (_, WireValue::Text(s)) => Ok(s.clone()),
            (StringEncoding::Utf8Bytes, WireValue::Bytes(b)) => Ok(decode_utf8(b)),
            (StringEncoding::Native, WireValue::Bytes(_)) => Err(CtlError::Protocol(format!(
                "{}: byte string from a text-native endpoint",
                what
            ))),
            (_, other) => Err(CtlError::Protocol(format!(
                "{}: expected string, got {}",
                what,
                other.kind()
            ))),
        }
    }

    /// Apply [`normalize`] where this encoding needs it
    pub fn ingest(&self, value: WireValue) -> WireValue {
        match self {
            StringEncoding::Utf8Bytes => normalize(value),
            StringEncoding::Native => value,
        }
    }
}

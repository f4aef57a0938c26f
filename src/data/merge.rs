//! Recombines the two partial detail fetches into one record.
//!
//! The upstream API caps each request at ten fields, so a full detail record
//! arrives as two JSON objects over disjoint field sets. Merging happens at
//! the JSON level, before decoding, because neither half is a valid
//! `Country` on its own.

use serde_json::{Map, Value};

use super::source::UpstreamError;
use super::types::Country;

/// One field-limited JSON object for a single country.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartialRecord(Map<String, Value>);

impl PartialRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Normalizes a by-code response body.
    ///
    /// The API answers with either a bare object or a one-element array
    /// depending on the endpoint version; both collapse to the object.
    pub fn from_response(body: Value) -> Result<Self, UpstreamError> {
        match body {
            Value::Object(map) => Ok(Self(map)),
            Value::Array(items) => match items.into_iter().next() {
                Some(Value::Object(map)) => Ok(Self(map)),
                Some(other) => Err(UpstreamError::Decode(format!(
                    "expected a country object, got {other}"
                ))),
                None => Err(UpstreamError::Decode("empty country list".to_string())),
            },
            other => Err(UpstreamError::Decode(format!(
                "expected a country object or list, got {other}"
            ))),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Decodes the (merged) record into a `Country`.
    pub fn into_country(self) -> Result<Country, UpstreamError> {
        serde_json::from_value(Value::Object(self.0))
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

/// Shallow union of two partials; keys in `second` replace keys in `first`.
///
/// Composite values (e.g. `flags`) are replaced whole, never combined. Both
/// partials are assumed to describe the same country; this is not checked.
pub fn merge(first: PartialRecord, second: PartialRecord) -> PartialRecord {
    let PartialRecord(mut fields) = first;
    for (key, value) in second.0 {
        fields.insert(key, value);
    }
    PartialRecord(fields)
}

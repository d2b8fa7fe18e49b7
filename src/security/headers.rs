//! Header scrubbing for outbound risk payloads.
//!
//! # Responsibilities
//! - Snapshot inbound headers into a name → value map
//! - Replace the value of every configured sensitive header with a marker
//! - Keep every header name present (redaction, not removal)
//!
//! # Design Decisions
//! - Sensitive names compare case-insensitively
//! - Names are emitted in canonical Title-Case ("User-Agent")
//! - Repeated headers are joined with ", "
//! - Scrubbing never mutates its input and is idempotent

use std::collections::{BTreeMap, HashSet};

use axum::http::HeaderMap;
use serde::{Serialize, Serializer};

/// A header value after scrubbing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrubbedValue {
    /// Passed through verbatim.
    Value(String),
    /// Redacted. Serialized as `true`.
    Redacted,
}

impl Serialize for ScrubbedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ScrubbedValue::Value(v) => serializer.serialize_str(v),
            ScrubbedValue::Redacted => serializer.serialize_bool(true),
        }
    }
}

/// Header set safe to send across the trust boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScrubbedHeaders(BTreeMap<String, ScrubbedValue>);

impl ScrubbedHeaders {
    pub fn get(&self, name: &str) -> Option<&ScrubbedValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ScrubbedValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, ScrubbedValue)> for ScrubbedHeaders {
    fn from_iter<I: IntoIterator<Item = (String, ScrubbedValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Redacts configured sensitive headers.
#[derive(Debug, Clone)]
pub struct HeaderScrubber {
    sensitive: HashSet<String>,
}

impl HeaderScrubber {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            sensitive: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_ascii_lowercase())
                .collect(),
        }
    }

    fn is_sensitive(&self, name: &str) -> bool {
        self.sensitive.contains(&name.to_ascii_lowercase())
    }

    /// Snapshot and scrub an inbound header map.
    pub fn scrub(&self, headers: &HeaderMap) -> ScrubbedHeaders {
        let mut entries: BTreeMap<String, ScrubbedValue> = BTreeMap::new();

        for name in headers.keys() {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");

            let value = if self.is_sensitive(name.as_str()) {
                ScrubbedValue::Redacted
            } else {
                ScrubbedValue::Value(joined)
            };
            entries.insert(canonical_name(name.as_str()), value);
        }

        ScrubbedHeaders(entries)
    }

    /// Scrub an already-snapshotted header set.
    pub fn scrub_entries(&self, headers: &ScrubbedHeaders) -> ScrubbedHeaders {
        headers
            .iter()
            .map(|(name, value)| {
                let value = if self.is_sensitive(name) {
                    ScrubbedValue::Redacted
                } else {
                    value.clone()
                };
                (name.clone(), value)
            })
            .collect()
    }
}

/// "x-forwarded-for" → "X-Forwarded-For".
fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

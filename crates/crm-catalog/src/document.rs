//! On-storage layout of a catalog list.
//!
//! Lists are written inside a versioned envelope:
//!
//! ```json
//! { "version": 1, "saved_at": "2026-01-01T00:00:00Z", "items": [ ... ] }
//! ```
//!
//! A bare JSON array (the original, unversioned layout) is still accepted on
//! read. An envelope from a newer version is refused rather than guessed at.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crm_contracts::{CrmError, CrmResult};

/// Version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    version: u32,
    items: Vec<T>,
}

#[derive(Debug, Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    saved_at: DateTime<Utc>,
    items: &'a [T],
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Stored<T> {
    Envelope(Envelope<T>),
    Bare(Vec<T>),
}

/// Encode `items` in the current envelope.
pub fn encode<T: Serialize>(items: &[T]) -> CrmResult<String> {
    let doc = EnvelopeRef {
        version: SCHEMA_VERSION,
        saved_at: Utc::now(),
        items,
    };
    Ok(serde_json::to_string(&doc)?)
}

/// Decode either layout.
pub fn decode<T: DeserializeOwned>(raw: &str) -> CrmResult<Vec<T>> {
    let stored: Stored<T> = serde_json::from_str(raw)?;
    match stored {
        Stored::Bare(items) => Ok(items),
        Stored::Envelope(doc) if doc.version <= SCHEMA_VERSION => Ok(doc.items),
        Stored::Envelope(doc) => Err(CrmError::Serialization {
            reason: format!(
                "stored schema version {} is newer than supported version {}",
                doc.version, SCHEMA_VERSION
            ),
        }),
    }
}

//! Resource-type names ("subjects") that permissions are granted on.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::error::CrmError;

/// A trimmed, non-blank subject name compared case-insensitively.
///
/// The original spelling is kept for display and serialization; equality,
/// ordering and hashing use the lower-cased key. The literal `*` is stored as
/// the wildcard `all`, which matches every subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject {
    name: String,
    key: String,
}

impl Subject {
    /// Key of the wildcard subject.
    pub const WILDCARD: &'static str = "all";

    /// Normalize a free-form subject. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let name = if trimmed == "*" { Self::WILDCARD } else { trimmed };
        Some(Self {
            name: name.to_string(),
            key: name.to_lowercase(),
        })
    }

    /// The wildcard subject.
    pub fn all() -> Self {
        Self {
            name: Self::WILDCARD.to_string(),
            key: Self::WILDCARD.to_string(),
        }
    }

    /// The spelling the subject was declared with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lower-cased comparison key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_wildcard(&self) -> bool {
        self.key == Self::WILDCARD
    }

    /// True when a permission declared on `self` applies to `requested`.
    pub fn covers(&self, requested: &Subject) -> bool {
        self.is_wildcard() || self.key == requested.key
    }
}

impl PartialEq for Subject {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Subject {}

impl Hash for Subject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for Subject {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Subject {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl TryFrom<String> for Subject {
    type Error = CrmError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Subject::parse(&raw).ok_or_else(|| CrmError::InvalidInput {
            reason: "subject must not be blank".to_string(),
        })
    }
}

impl From<Subject> for String {
    fn from(subject: Subject) -> Self {
        subject.name
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

//! Subject catalog types: the built-in screens plus operator additions.

use serde::{Deserialize, Serialize};

use crate::subject::Subject;

/// Built-in subjects as `(key, label)`. Not editable at runtime.
pub const BUILTIN_SUBJECTS: [(&str, &str); 8] = [
    ("Dashboard", "Dashboard"),
    ("Customer", "Customers"),
    ("Opportunity", "Opportunities"),
    ("Product", "Products"),
    ("File", "Files"),
    ("Note", "Notes"),
    ("User", "Users"),
    ("Role", "Roles"),
];

/// An operator-registered resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSubject {
    /// Subject key, matched case-insensitively.
    pub subject: String,
    /// Display name.
    pub label: String,
}

impl CustomSubject {
    /// Same case folding as `Subject`, so non-ASCII keys match too.
    pub fn key_matches(&self, key: &str) -> bool {
        self.subject.trim().to_lowercase() == key.trim().to_lowercase()
    }
}

/// One row of the merged catalog shown in list displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub subject: Subject,
    pub label: String,
    /// True when the label comes from a custom entry.
    pub custom: bool,
}

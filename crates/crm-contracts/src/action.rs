//! The action vocabulary.
//!
//! Five tokens are known. Anything else is carried verbatim (lower-cased) in
//! `Action::Other` so operator-invented actions still match literally.

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// An action a role may perform on a subject.
///
/// `Manage` absorbs every other action on the same subject.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
    Manage,
    /// Any token outside the known vocabulary, lower-cased and trimmed.
    Other(String),
}

impl Action {
    /// The four CRUD actions. Holding all of them is equivalent to `Manage`.
    pub const CRUD: [Action; 4] = [Action::View, Action::Create, Action::Update, Action::Delete];

    /// Every known action, in matrix column order.
    pub const KNOWN: [Action; 5] = [
        Action::View,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Manage,
    ];

    /// Normalize a free-form token.
    ///
    /// Lower-cases and trims, then maps the legacy synonyms `read` → `view`
    /// and `write` → `update`. Never fails.
    pub fn parse(token: &str) -> Self {
        let token = token.trim().to_lowercase();
        match token.as_str() {
            "view" | "read" => Action::View,
            "create" => Action::Create,
            "update" | "write" => Action::Update,
            "delete" => Action::Delete,
            "manage" => Action::Manage,
            _ => Action::Other(token),
        }
    }

    /// The canonical token for this action.
    pub fn as_str(&self) -> &str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Manage => "manage",
            Action::Other(token) => token,
        }
    }

    /// True when the token was blank before normalization.
    pub fn is_blank(&self) -> bool {
        matches!(self, Action::Other(token) if token.is_empty())
    }
}

impl From<String> for Action {
    fn from(token: String) -> Self {
        Action::parse(&token)
    }
}

impl From<&str> for Action {
    fn from(token: &str) -> Self {
        Action::parse(token)
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        match action {
            Action::Other(token) => token,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Action {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Action::parse(s))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Permission records: one subject and the actions granted on it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{action::Action, subject::Subject};

/// A `(subject, action-set)` pair.
///
/// A permission never holds an empty action set. Constructors return `None`
/// instead, and `Role` removes a record whose last action is revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub subject: Subject,
    pub actions: BTreeSet<Action>,
}

impl Permission {
    /// Build a permission, dropping blank action tokens.
    pub fn new(subject: Subject, actions: impl IntoIterator<Item = Action>) -> Option<Self> {
        let actions: BTreeSet<Action> = actions.into_iter().filter(|a| !a.is_blank()).collect();
        if actions.is_empty() {
            return None;
        }
        Some(Self { subject, actions })
    }

    /// True when `manage` is listed explicitly.
    pub fn has_manage(&self) -> bool {
        self.actions.contains(&Action::Manage)
    }

    /// True when every CRUD action is listed individually.
    pub fn covers_crud(&self) -> bool {
        Action::CRUD.iter().all(|a| self.actions.contains(a))
    }

    pub fn lists(&self, action: &Action) -> bool {
        self.actions.contains(action)
    }
}

//! Role definitions.
//!
//! A role is a name plus a list of permissions. Only `superadmin` carries
//! implicit privilege; every other role is defined entirely by its list.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{action::Action, permission::Permission, subject::Subject};

/// Conventional role names shipped with the CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemRole {
    Superadmin,
    Admin,
    Manager,
    Sales,
}

impl SystemRole {
    pub const ALL: [SystemRole; 4] = [
        SystemRole::Superadmin,
        SystemRole::Admin,
        SystemRole::Manager,
        SystemRole::Sales,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SystemRole::Superadmin => "superadmin",
            SystemRole::Admin => "admin",
            SystemRole::Manager => "manager",
            SystemRole::Sales => "sales",
        }
    }

    /// Exact, case-insensitive lookup by role name. Whitespace is not
    /// stripped; ingestion trims role names before they get here.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(name))
    }
}

/// True when `name` is the universal override role.
pub fn is_superadmin(name: &str) -> bool {
    SystemRole::from_name(name) == Some(SystemRole::Superadmin)
}

/// An operator-defined or preset role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Opaque identifier; UUID v4 for roles created here.
    pub id: String,
    /// Role identifier, compared case-insensitively, conventionally lowercase.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    /// Create an empty role with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            permissions: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_superadmin(&self) -> bool {
        is_superadmin(&self.name)
    }

    /// Case-insensitive name comparison.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }

    /// The actions granted on exactly `subject` (no wildcard expansion).
    pub fn actions_for(&self, subject: &Subject) -> Option<&BTreeSet<Action>> {
        self.permissions
            .iter()
            .find(|p| &p.subject == subject)
            .map(|p| &p.actions)
    }

    /// Replace the actions on `subject`.
    ///
    /// Updates the existing record in place, appends a new one, or removes
    /// the record when `actions` is empty.
    pub fn set_actions(&mut self, subject: Subject, actions: impl IntoIterator<Item = Action>) {
        let position = self.permissions.iter().position(|p| p.subject == subject);
        match (Permission::new(subject, actions), position) {
            (Some(permission), Some(idx)) => self.permissions[idx] = permission,
            (Some(permission), None) => self.permissions.push(permission),
            (None, Some(idx)) => {
                self.permissions.remove(idx);
            }
            (None, None) => {}
        }
    }

    pub fn grant(&mut self, subject: Subject, action: Action) {
        let mut actions = self.actions_for(&subject).cloned().unwrap_or_default();
        actions.insert(action);
        self.set_actions(subject, actions);
    }

    pub fn revoke(&mut self, subject: Subject, action: &Action) {
        let mut actions = self.actions_for(&subject).cloned().unwrap_or_default();
        actions.remove(action);
        self.set_actions(subject, actions);
    }

    /// Restore the one-record-per-subject and non-empty invariants.
    ///
    /// Duplicate subjects are merged into the first occurrence; blank action
    /// tokens are removed and records left with no actions are dropped. Used
    /// on data read back from storage.
    pub fn normalize(&mut self) {
        let mut merged: Vec<Permission> = Vec::with_capacity(self.permissions.len());
        for mut permission in self.permissions.drain(..) {
            permission.actions.retain(|a| !a.is_blank());
            match merged.iter_mut().find(|p| p.subject == permission.subject) {
                Some(existing) => existing.actions.extend(permission.actions),
                None => merged.push(permission),
            }
        }
        merged.retain(|p| !p.actions.is_empty());
        self.permissions = merged;
    }
}

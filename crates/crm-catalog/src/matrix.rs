//! Checkbox-matrix editing model for one role.
//!
//! Rows are subjects, columns are the five known actions. Rows come from the
//! merged catalog plus any subject the role already holds that the catalog
//! does not list (a deleted custom subject, or the `all` wildcard), so no
//! existing grant becomes invisible or uneditable.

use std::collections::BTreeSet;

use crm_contracts::{Action, CatalogEntry, Role};

#[derive(Debug, Clone)]
pub struct PermissionMatrix {
    role: Role,
    rows: Vec<CatalogEntry>,
}

impl PermissionMatrix {
    pub fn new(role: Role, catalog: &[CatalogEntry]) -> Self {
        let mut rows = catalog.to_vec();
        for permission in &role.permissions {
            if !rows.iter().any(|r| r.subject == permission.subject) {
                rows.push(CatalogEntry {
                    subject: permission.subject.clone(),
                    label: permission.subject.name().to_string(),
                    custom: true,
                });
            }
        }
        Self { role, rows }
    }

    /// Column order.
    pub fn columns() -> [Action; 5] {
        Action::KNOWN
    }

    pub fn rows(&self) -> &[CatalogEntry] {
        &self.rows
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn into_role(self) -> Role {
        self.role
    }

    pub fn is_checked(&self, row: usize, action: &Action) -> bool {
        self.rows
            .get(row)
            .and_then(|entry| self.role.actions_for(&entry.subject))
            .is_some_and(|actions| actions.contains(action))
    }

    /// Flip one checkbox. Returns the new state; out-of-range rows stay `false`.
    pub fn toggle(&mut self, row: usize, action: &Action) -> bool {
        let Some(entry) = self.rows.get(row) else {
            return false;
        };
        let subject = entry.subject.clone();
        if self.is_checked(row, action) {
            self.role.revoke(subject, action);
            false
        } else {
            self.role.grant(subject, action.clone());
            true
        }
    }

    /// Replace a whole row. An empty set removes the subject's permission.
    pub fn set_row(&mut self, row: usize, actions: BTreeSet<Action>) {
        if let Some(entry) = self.rows.get(row) {
            self.role.set_actions(entry.subject.clone(), actions);
        }
    }

    /// Count of checked boxes in a row, for compact displays.
    pub fn row_count(&self, row: usize) -> usize {
        self.rows
            .get(row)
            .and_then(|entry| self.role.actions_for(&entry.subject))
            .map_or(0, BTreeSet::len)
    }
}

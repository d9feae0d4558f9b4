//! The role and custom-subject catalog over a `KeyValueStore`.
//!
//! Two independent keys hold the two lists. Every mutation is a plain
//! read-modify-write with no transaction around it: two stores sharing one
//! backend overwrite each other, last writer wins.
//!
//! Reads never fail. A missing key, an adapter error, or a value that does
//! not decode all read as an empty list (the latter two with a warning).

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

use crm_contracts::{
    CatalogEntry, CrmError, CrmResult, CustomSubject, Role, Subject, BUILTIN_SUBJECTS,
};
use crm_core::traits::{KeyValueStore, RoleRepository, SubjectRepository};

use crate::document::{decode, encode};

/// Storage key of the operator-defined role list.
pub const ROLES_KEY: &str = "crm.roles";

/// Storage key of the custom subject list.
pub const CUSTOM_SUBJECTS_KEY: &str = "crm.custom_subjects";

/// Role and subject registries backed by an injected storage adapter.
#[derive(Clone)]
pub struct CatalogStore {
    storage: Arc<dyn KeyValueStore>,
}

impl CatalogStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "storage read failed; treating as empty");
                return Vec::new();
            }
        };
        match decode(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(key, error = %e, "stored value is unreadable; treating as empty");
                Vec::new()
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, items: &[T]) -> CrmResult<()> {
        let encoded = encode(items)?;
        self.storage.set(key, &encoded)?;
        info!(key, count = items.len(), "catalog list saved");
        Ok(())
    }

    pub fn find_role(&self, id: &str) -> Option<Role> {
        self.list_roles().into_iter().find(|r| r.id == id)
    }

    /// Case-insensitive lookup by role name.
    pub fn find_role_by_name(&self, name: &str) -> Option<Role> {
        self.list_roles().into_iter().find(|r| r.has_name(name))
    }

    /// Insert every default role whose name is not stored yet.
    ///
    /// Idempotent: a second call with the same defaults changes nothing and
    /// does not touch storage.
    pub fn seed_roles(&self, defaults: impl IntoIterator<Item = Role>) -> CrmResult<Vec<Role>> {
        let mut roles = self.list_roles();
        let mut added = 0usize;
        for role in defaults {
            if roles.iter().any(|r| r.has_name(&role.name)) {
                continue;
            }
            roles.push(prepare(role)?);
            added += 1;
        }
        if added > 0 {
            self.write(ROLES_KEY, &roles)?;
            info!(added, "seeded default roles");
        }
        Ok(roles)
    }

    /// Built-in subjects merged with custom ones, sorted by label.
    ///
    /// A custom entry whose key matches a built-in replaces the built-in's
    /// label in this listing only.
    pub fn subject_catalog(&self) -> Vec<CatalogEntry> {
        merge_catalog(&self.list_custom_subjects())
    }
}

/// Merge the built-in subjects with `custom`, sorted by label.
pub fn merge_catalog(custom: &[CustomSubject]) -> Vec<CatalogEntry> {
    let mut entries: Vec<CatalogEntry> = BUILTIN_SUBJECTS
        .iter()
        .filter_map(|(key, label)| {
            Subject::parse(key).map(|subject| CatalogEntry {
                subject,
                label: label.to_string(),
                custom: false,
            })
        })
        .collect();

    for item in custom {
        let Some(subject) = Subject::parse(&item.subject) else {
            continue;
        };
        let entry = CatalogEntry {
            subject,
            label: item.label.clone(),
            custom: true,
        };
        match entries.iter_mut().find(|e| e.subject == entry.subject) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
    }

    entries.sort_by(|a, b| {
        a.label
            .to_lowercase()
            .cmp(&b.label.to_lowercase())
            .then_with(|| a.subject.cmp(&b.subject))
    });
    entries
}

/// Validate and normalize a role before it is stored.
fn prepare(mut role: Role) -> CrmResult<Role> {
    role.name = role.name.trim().to_string();
    if role.name.is_empty() {
        return Err(CrmError::InvalidInput {
            reason: "role name must not be blank".to_string(),
        });
    }
    if role.id.trim().is_empty() {
        role.id = uuid::Uuid::new_v4().to_string();
    }
    role.normalize();
    Ok(role)
}

impl RoleRepository for CatalogStore {
    fn list_roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = self.read(ROLES_KEY);
        for role in &mut roles {
            role.normalize();
        }
        roles
    }

    fn upsert_role(&self, role: Role) -> CrmResult<Vec<Role>> {
        let role = prepare(role)?;
        let mut roles = self.list_roles();
        match roles.iter_mut().find(|r| r.id == role.id) {
            Some(existing) => *existing = role,
            None => roles.push(role),
        }
        self.write(ROLES_KEY, &roles)?;
        Ok(roles)
    }

    fn delete_role(&self, id: &str) -> CrmResult<Vec<Role>> {
        let mut roles = self.list_roles();
        let before = roles.len();
        roles.retain(|r| r.id != id);
        if roles.len() != before {
            self.write(ROLES_KEY, &roles)?;
        }
        Ok(roles)
    }
}

impl SubjectRepository for CatalogStore {
    fn list_custom_subjects(&self) -> Vec<CustomSubject> {
        self.read(CUSTOM_SUBJECTS_KEY)
    }

    fn add_custom_subject(&self, key: &str, label: Option<&str>) -> CrmResult<Vec<CustomSubject>> {
        let mut subjects = self.list_custom_subjects();
        let key = key.trim();
        if key.is_empty() {
            return Ok(subjects);
        }
        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(key)
            .to_string();

        match subjects.iter_mut().find(|s| s.key_matches(key)) {
            Some(existing) => existing.label = label,
            None => subjects.push(CustomSubject {
                subject: key.to_string(),
                label,
            }),
        }
        self.write(CUSTOM_SUBJECTS_KEY, &subjects)?;
        Ok(subjects)
    }

    fn delete_custom_subject(&self, key: &str) -> CrmResult<Vec<CustomSubject>> {
        let mut subjects = self.list_custom_subjects();
        let before = subjects.len();
        subjects.retain(|s| !s.key_matches(key));
        if subjects.len() != before {
            self.write(CUSTOM_SUBJECTS_KEY, &subjects)?;
        }
        Ok(subjects)
    }
}

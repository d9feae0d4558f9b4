//! # crm-catalog
//!
//! Client-local storage of operator-defined roles and custom subjects.
//!
//! ## Overview
//!
//! [`CatalogStore`] implements [`RoleRepository`] and [`SubjectRepository`]
//! over any [`KeyValueStore`](crm_core::traits::KeyValueStore). Two adapters
//! ship here: [`MemoryStore`] and [`FileStore`]. Reads favour availability:
//! missing or corrupt data reads as an empty list, never as an error.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crm_catalog::{CatalogStore, FileStore};
//! use crm_core::traits::RoleRepository;
//!
//! let store = CatalogStore::new(Arc::new(FileStore::new(".crm")));
//! let roles = store.upsert_role(role)?;
//! ```

pub mod document;
pub mod matrix;
pub mod storage;
pub mod store;

pub use document::SCHEMA_VERSION;
pub use matrix::PermissionMatrix;
pub use storage::{open_storage, FileStore, MemoryStore};
pub use store::{merge_catalog, CatalogStore, CUSTOM_SUBJECTS_KEY, ROLES_KEY};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{
        collections::{BTreeSet, HashMap},
        sync::Arc,
    };

    use crm_contracts::{Action, CrmError, CrmResult, Role, Subject};
    use crm_core::{
        config::{StorageBackend, StorageConfig},
        traits::{KeyValueStore, RoleRepository, SubjectRepository},
    };

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn memory_store() -> (MemoryStore, CatalogStore) {
        let backend = MemoryStore::new();
        let store = CatalogStore::new(Arc::new(backend.clone()));
        (backend, store)
    }

    fn subject(name: &str) -> Subject {
        Subject::parse(name).unwrap()
    }

    fn role(id: &str, name: &str) -> Role {
        Role {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            permissions: Vec::new(),
        }
    }

    // ── 1. roles: insert and replace ──────────────────────────────────────────

    #[test]
    fn test_upsert_role_inserts_then_replaces() {
        let (_, store) = memory_store();
        assert!(store.list_roles().is_empty());

        let roles = store.upsert_role(role("r-1", "sales")).unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles.iter().filter(|r| r.id == "r-1").count(), 1);

        let roles = store.upsert_role(role("r-2", "manager")).unwrap();
        assert_eq!(roles.len(), 2);

        let mut changed = role("r-1", "sales-senior");
        changed.description = Some("Senior reps".to_string());
        changed.grant(subject("Opportunity"), Action::Delete);
        let roles = store.upsert_role(changed).unwrap();

        assert_eq!(roles.len(), 2, "replace must not change the length");
        assert_eq!(roles[0].id, "r-1", "replace keeps the position");
        assert_eq!(roles[0].name, "sales-senior");
        assert_eq!(roles[0].description.as_deref(), Some("Senior reps"));
        assert_eq!(store.list_roles(), roles);
    }

    #[test]
    fn test_upsert_role_assigns_id_and_rejects_blank_name() {
        let (_, store) = memory_store();

        let roles = store.upsert_role(role("", "support")).unwrap();
        assert!(!roles[0].id.is_empty());

        match store.upsert_role(role("r-9", "   ")) {
            Err(CrmError::InvalidInput { reason }) => assert!(reason.contains("blank")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
        assert_eq!(store.list_roles().len(), 1);
    }

    #[test]
    fn test_delete_role() {
        let (_, store) = memory_store();
        store.upsert_role(role("r-1", "sales")).unwrap();
        store.upsert_role(role("r-2", "manager")).unwrap();

        let roles = store.delete_role("r-1").unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].id, "r-2");

        let unchanged = store.delete_role("missing").unwrap();
        assert_eq!(unchanged, roles);
    }

    // ── 2. corrupt data reads as empty ────────────────────────────────────────

    #[test]
    fn test_truncated_role_storage_reads_empty() {
        let (backend, store) = memory_store();
        store.upsert_role(role("r-1", "sales")).unwrap();

        let raw = backend.get(ROLES_KEY).unwrap().unwrap();
        backend.set(ROLES_KEY, &raw[..raw.len() / 2]).unwrap();

        assert!(store.list_roles().is_empty());
    }

    #[test]
    fn test_blank_stored_action_tokens_are_dropped() {
        let (backend, store) = memory_store();
        backend
            .set(
                ROLES_KEY,
                r#"[{"id":"r-1","name":"sales","permissions":[
                    {"subject":"Note","actions":["  "]},
                    {"subject":"File","actions":["view",""]}
                ]}]"#,
            )
            .unwrap();

        let roles = store.list_roles();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].permissions.len(), 1);
        assert_eq!(roles[0].permissions[0].subject, subject("File"));
        assert!(roles[0].permissions[0].actions.iter().all(|a| !a.is_blank()));
    }

    #[test]
    fn test_wrong_shape_reads_empty() {
        let (backend, store) = memory_store();
        backend.set(ROLES_KEY, r#"{"hello":"world"}"#).unwrap();
        backend.set(CUSTOM_SUBJECTS_KEY, "42").unwrap();

        assert!(store.list_roles().is_empty());
        assert!(store.list_custom_subjects().is_empty());
    }

    #[test]
    fn test_bare_array_layout_is_readable() {
        let (backend, store) = memory_store();
        backend
            .set(
                ROLES_KEY,
                r#"[{"id":"r-1","name":"sales","permissions":[
                    {"subject":"Note","actions":["read"]},
                    {"subject":"note","actions":["create"]}
                ]}]"#,
            )
            .unwrap();

        let roles = store.list_roles();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].permissions.len(), 1, "duplicate subjects merge on read");
    }

    #[test]
    fn test_future_schema_version_reads_empty() {
        let (backend, store) = memory_store();
        backend
            .set(CUSTOM_SUBJECTS_KEY, r#"{"version":99,"items":[{"subject":"x","label":"X"}]}"#)
            .unwrap();

        assert!(store.list_custom_subjects().is_empty());
    }

    #[test]
    fn test_written_layout_is_versioned_envelope() {
        let (backend, store) = memory_store();
        store.add_custom_subject("Invoice", Some("Invoices")).unwrap();

        let raw = backend.get(CUSTOM_SUBJECTS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], SCHEMA_VERSION);
        assert!(value["saved_at"].is_string());
        assert_eq!(value["items"][0]["subject"], "Invoice");
    }

    // ── 3. custom subjects ────────────────────────────────────────────────────

    #[test]
    fn test_blank_custom_subject_is_noop() {
        let (backend, store) = memory_store();
        store.add_custom_subject("Invoice", None).unwrap();
        let before = store.list_custom_subjects();
        let raw_before = backend.get(CUSTOM_SUBJECTS_KEY).unwrap();

        let after = store.add_custom_subject("", Some("Label")).unwrap();
        assert_eq!(after, before);
        assert_eq!(store.add_custom_subject("   ", None).unwrap(), before);
        assert_eq!(backend.get(CUSTOM_SUBJECTS_KEY).unwrap(), raw_before);
    }

    #[test]
    fn test_custom_subject_upsert_is_case_insensitive() {
        let (_, store) = memory_store();
        store.add_custom_subject("Foo", Some("A")).unwrap();
        let subjects = store.add_custom_subject("foo", Some("B")).unwrap();

        assert_eq!(subjects.len(), 1);
        assert!(subjects[0].subject.eq_ignore_ascii_case("foo"));
        assert_eq!(subjects[0].label, "B");
    }

    #[test]
    fn test_custom_subject_label_defaults_to_key() {
        let (_, store) = memory_store();
        let subjects = store.add_custom_subject("  Invoice ", Some("  ")).unwrap();
        assert_eq!(subjects[0].subject, "Invoice");
        assert_eq!(subjects[0].label, "Invoice");
    }

    #[test]
    fn test_delete_custom_subject_is_case_insensitive() {
        let (_, store) = memory_store();
        store.add_custom_subject("customer_portal", Some("Portal")).unwrap();
        store.add_custom_subject("Invoice", None).unwrap();

        let subjects = store.delete_custom_subject("CUSTOMER_portal").unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].subject, "Invoice");
    }

    #[test]
    fn test_custom_subject_keys_fold_non_ascii_case() {
        let (_, store) = memory_store();
        store.add_custom_subject("Équipe", Some("A")).unwrap();
        let subjects = store.add_custom_subject("équipe", Some("B")).unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].subject, "Équipe", "first spelling is kept");
        assert_eq!(subjects[0].label, "B");

        // The catalog hands back the folded key; it must find the entry.
        let entry = store
            .subject_catalog()
            .into_iter()
            .find(|e| e.custom)
            .unwrap();
        assert!(subjects[0].key_matches(entry.subject.key()));

        let subjects = store.delete_custom_subject("ÉQUIPE").unwrap();
        assert!(subjects.is_empty());
    }

    // ── 4. merged catalog ─────────────────────────────────────────────────────

    #[test]
    fn test_catalog_sorted_with_custom_override() {
        let (_, store) = memory_store();
        store.add_custom_subject("customer", Some("Accounts")).unwrap();
        store.add_custom_subject("Invoice", Some("Invoices")).unwrap();

        let catalog = store.subject_catalog();
        let labels: Vec<&str> = catalog.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Accounts",
                "Dashboard",
                "Files",
                "Invoices",
                "Notes",
                "Opportunities",
                "Products",
                "Roles",
                "Users"
            ]
        );

        let accounts = &catalog[0];
        assert!(accounts.custom);
        assert_eq!(accounts.subject, subject("Customer"));
        assert_eq!(catalog.iter().filter(|e| e.subject == subject("Customer")).count(), 1);
    }

    // ── 5. last writer wins ───────────────────────────────────────────────────

    /// Adapter that answers every read with the value it held when
    /// `freeze` was called, like a tab that loaded the list earlier.
    #[derive(Clone)]
    struct StaleReads {
        inner: MemoryStore,
        frozen: Arc<std::sync::Mutex<HashMap<String, Option<String>>>>,
    }

    impl StaleReads {
        fn new(inner: MemoryStore) -> Self {
            Self {
                inner,
                frozen: Arc::default(),
            }
        }

        fn freeze(&self, key: &str) {
            let value = self.inner.get(key).unwrap();
            self.frozen.lock().unwrap().insert(key.to_string(), value);
        }
    }

    impl KeyValueStore for StaleReads {
        fn get(&self, key: &str) -> CrmResult<Option<String>> {
            match self.frozen.lock().unwrap().get(key) {
                Some(value) => Ok(value.clone()),
                None => self.inner.get(key),
            }
        }

        fn set(&self, key: &str, value: &str) -> CrmResult<()> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> CrmResult<()> {
            self.inner.remove(key)
        }
    }

    /// Two stores over one backend (two tabs) silently clobber each other:
    /// each upsert rewrites the whole list from what that tab last read.
    #[test]
    fn test_concurrent_handles_last_writer_wins() {
        let backend = MemoryStore::new();
        let tab_a = CatalogStore::new(Arc::new(backend.clone()));
        let stale = StaleReads::new(backend.clone());
        let tab_b = CatalogStore::new(Arc::new(stale.clone()));

        tab_a.upsert_role(role("r-0", "admin")).unwrap();
        // Tab B loaded the list here and never reloads it.
        stale.freeze(ROLES_KEY);
        assert_eq!(tab_b.list_roles().len(), 1);

        let after_a = tab_a.upsert_role(role("r-1", "sales")).unwrap();
        assert_eq!(after_a.len(), 2);

        let after_b = tab_b.upsert_role(role("r-2", "manager")).unwrap();
        let ids: Vec<&str> = after_b.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r-0", "r-2"]);

        let stored: Vec<String> = tab_a.list_roles().into_iter().map(|r| r.id).collect();
        assert_eq!(stored, vec!["r-0", "r-2"], "tab A's 'sales' was lost");

        // The same read-modify-write applies to custom subjects.
        tab_a.add_custom_subject("Invoice", None).unwrap();
        stale.freeze(CUSTOM_SUBJECTS_KEY);
        tab_a.add_custom_subject("Contract", None).unwrap();
        let subjects = tab_b.add_custom_subject("Quote", None).unwrap();
        let keys: Vec<&str> = subjects.iter().map(|s| s.subject.as_str()).collect();
        assert_eq!(keys, vec!["Invoice", "Quote"]);
        assert_eq!(tab_a.list_custom_subjects().len(), 2);
    }

    // ── 6. seeding ────────────────────────────────────────────────────────────

    #[test]
    fn test_seed_roles_is_idempotent() {
        let (_, store) = memory_store();
        store.upsert_role(role("custom-sales", "Sales")).unwrap();

        let defaults = || vec![Role::new("admin"), Role::new("sales"), Role::new("manager")];
        let roles = store.seed_roles(defaults()).unwrap();
        assert_eq!(roles.len(), 3, "existing 'Sales' is not duplicated");
        assert_eq!(roles[0].id, "custom-sales");

        let again = store.seed_roles(defaults()).unwrap();
        assert_eq!(again, roles);
    }

    // ── 7. matrix ─────────────────────────────────────────────────────────────

    #[test]
    fn test_matrix_toggle_round_trip() {
        let catalog = merge_catalog(&[]);
        let mut matrix = PermissionMatrix::new(Role::new("sales"), &catalog);
        let row = matrix
            .rows()
            .iter()
            .position(|e| e.subject == subject("Opportunity"))
            .unwrap();

        assert!(matrix.toggle(row, &Action::View));
        assert!(matrix.toggle(row, &Action::Create));
        assert!(matrix.is_checked(row, &Action::View));
        assert_eq!(matrix.row_count(row), 2);

        assert!(!matrix.toggle(row, &Action::View));
        assert!(!matrix.toggle(row, &Action::Create));
        assert!(matrix.role().permissions.is_empty(), "empty record is removed");
        assert!(!matrix.toggle(999, &Action::View));
    }

    #[test]
    fn test_matrix_set_row_replaces_and_clears() {
        let catalog = merge_catalog(&[]);
        let mut matrix = PermissionMatrix::new(Role::new("manager"), &catalog);
        let row = matrix
            .rows()
            .iter()
            .position(|e| e.subject == subject("Product"))
            .unwrap();

        matrix.set_row(row, BTreeSet::from([Action::View, Action::Update]));
        assert_eq!(matrix.row_count(row), 2);

        matrix.set_row(row, BTreeSet::from([Action::Manage]));
        assert_eq!(matrix.row_count(row), 1);
        assert!(matrix.is_checked(row, &Action::Manage));
        assert!(!matrix.is_checked(row, &Action::View), "row is replaced, not merged");
        assert_eq!(matrix.role().permissions.len(), 1);

        matrix.set_row(row, BTreeSet::new());
        assert!(matrix.role().permissions.is_empty(), "empty set removes the record");

        matrix.set_row(999, BTreeSet::from([Action::View]));
        assert!(matrix.role().permissions.is_empty());
    }

    #[test]
    fn test_matrix_keeps_subjects_missing_from_catalog() {
        let mut role = Role::new("auditor");
        role.grant(Subject::all(), Action::View);
        role.grant(subject("RetiredScreen"), Action::Delete);

        let catalog = merge_catalog(&[]);
        let matrix = PermissionMatrix::new(role, &catalog);
        assert_eq!(matrix.rows().len(), catalog.len() + 2);

        let last = matrix.rows().len() - 1;
        assert!(matrix.is_checked(last, &Action::Delete));
        assert_eq!(PermissionMatrix::columns().len(), 5);
    }

    // ── 8. file adapter ───────────────────────────────────────────────────────

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("crm");

        let first = CatalogStore::new(Arc::new(FileStore::new(&root)));
        assert!(first.list_roles().is_empty(), "missing directory reads empty");
        first.upsert_role(role("r-1", "sales")).unwrap();

        let second = CatalogStore::new(Arc::new(FileStore::new(&root)));
        assert_eq!(second.list_roles().len(), 1);
        assert!(root.join("crm.roles.json").is_file());
    }

    #[test]
    fn test_file_store_remove_and_invalid_keys() {
        let dir = tempfile::tempdir().unwrap();
        let files = FileStore::new(dir.path());

        files.set("crm.roles", "[]").unwrap();
        assert_eq!(files.get("crm.roles").unwrap().as_deref(), Some("[]"));
        files.remove("crm.roles").unwrap();
        files.remove("crm.roles").unwrap();
        assert!(files.get("crm.roles").unwrap().is_none());

        assert!(matches!(files.get("../escape"), Err(CrmError::InvalidInput { .. })));
        assert!(matches!(files.set("", "x"), Err(CrmError::InvalidInput { .. })));
    }

    #[test]
    fn test_open_storage_memory_backend() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            ..StorageConfig::default()
        };
        let storage = open_storage(&config);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    }
}

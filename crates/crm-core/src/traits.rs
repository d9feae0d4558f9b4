//! Trait seams of the authorization core.
//!
//! - `AbilityCheck`      — the predicate every UI affordance consults
//! - `KeyValueStore`     — pluggable client-local storage
//! - `RoleRepository`    — CRUD over operator-defined roles
//! - `SubjectRepository` — CRUD over custom subjects
//!
//! The evaluator, the storage adapters and the catalog store implement these
//! in their own crates so a backend-synced store can replace the local one
//! without touching call sites.

use crm_contracts::{is_superadmin, CrmResult, CustomSubject, Role};

/// Answers "may the current user perform `action` on `subject`?".
///
/// Implementations never fail: unknown or malformed input is simply denied.
pub trait AbilityCheck: Send + Sync {
    /// Free-form entry point; both arguments are normalized before matching.
    fn can(&self, action: &str, subject: &str) -> bool;

    /// The role name of the snapshot this check was built from.
    fn role_name(&self) -> &str;

    fn is_superadmin(&self) -> bool {
        is_superadmin(self.role_name())
    }
}

/// String key-value storage with last-writer-wins semantics.
///
/// A missing key reads as `Ok(None)`. Errors are reserved for adapter
/// failures (I/O, poisoned locks).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> CrmResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> CrmResult<()>;

    fn remove(&self, key: &str) -> CrmResult<()>;
}

/// Operator-defined roles.
///
/// Reads never fail: unreadable storage yields an empty list. Mutations
/// return the complete new list so callers resynchronize in one step.
pub trait RoleRepository: Send + Sync {
    fn list_roles(&self) -> Vec<Role>;

    /// Insert when `role.id` is unseen, otherwise replace that entry in place.
    fn upsert_role(&self, role: Role) -> CrmResult<Vec<Role>>;

    fn delete_role(&self, id: &str) -> CrmResult<Vec<Role>>;
}

/// Operator-registered custom subjects, keyed case-insensitively.
pub trait SubjectRepository: Send + Sync {
    fn list_custom_subjects(&self) -> Vec<CustomSubject>;

    /// Case-insensitive upsert. A blank key is a no-op returning the
    /// unchanged list.
    fn add_custom_subject(&self, key: &str, label: Option<&str>) -> CrmResult<Vec<CustomSubject>>;

    fn delete_custom_subject(&self, key: &str) -> CrmResult<Vec<CustomSubject>>;
}

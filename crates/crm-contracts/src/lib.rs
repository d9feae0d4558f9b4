//! # crm-contracts
//!
//! Shared types and error contracts for the sales CRM authorization core.
//!
//! Every crate in the workspace imports from here. No rule evaluation or
//! storage lives in this crate — only data definitions, the invariants they
//! maintain on themselves, and the error type.

pub mod action;
pub mod catalog;
pub mod error;
pub mod permission;
pub mod role;
pub mod subject;
pub mod user;

pub use action::Action;
pub use catalog::{CatalogEntry, CustomSubject, BUILTIN_SUBJECTS};
pub use error::{CrmError, CrmResult};
pub use permission::Permission;
pub use role::{is_superadmin, Role, SystemRole};
pub use subject::Subject;
pub use user::{AuthUser, RawAuthUser, RawPermission};

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(name: &str) -> Subject {
        Subject::parse(name).unwrap()
    }

    // ── Action ───────────────────────────────────────────────────────────────

    #[test]
    fn action_parse_maps_synonyms_and_case() {
        assert_eq!(Action::parse(" READ "), Action::View);
        assert_eq!(Action::parse("Write"), Action::Update);
        assert_eq!(Action::parse("MANAGE"), Action::Manage);
        assert_eq!(Action::parse("export"), Action::Other("export".to_string()));
    }

    #[test]
    fn action_serializes_as_canonical_token() {
        let json = serde_json::to_string(&vec![Action::View, Action::parse("Export")]).unwrap();
        assert_eq!(json, r#"["view","export"]"#);

        let decoded: Vec<Action> = serde_json::from_str(r#"["read","write"]"#).unwrap();
        assert_eq!(decoded, vec![Action::View, Action::Update]);
    }

    // ── Subject ──────────────────────────────────────────────────────────────

    #[test]
    fn subject_compares_case_insensitively_but_keeps_spelling() {
        let a = subject("  Customer ");
        let b = subject("customer");
        assert_eq!(a, b);
        assert_eq!(a.name(), "Customer");
        assert_eq!(a.key(), "customer");
    }

    #[test]
    fn subject_star_and_all_are_the_wildcard() {
        assert!(subject("*").is_wildcard());
        assert!(subject("ALL").is_wildcard());
        assert_eq!(subject("*").name(), "all");

        let decoded: Subject = serde_json::from_str(r#""*""#).unwrap();
        assert!(decoded.is_wildcard());
        assert!(decoded.covers(&subject("AnythingAtAll")));
    }

    #[test]
    fn subject_rejects_blank() {
        assert!(Subject::parse("   ").is_none());
        assert!(serde_json::from_str::<Subject>(r#""  ""#).is_err());
    }

    // ── Permission ───────────────────────────────────────────────────────────

    #[test]
    fn permission_with_no_actions_is_not_constructed() {
        assert!(Permission::new(subject("Note"), Vec::new()).is_none());
        assert!(Permission::new(subject("Note"), vec![Action::parse("  ")]).is_none());
    }

    #[test]
    fn permission_covers_crud_only_with_all_four() {
        let full = Permission::new(subject("Opportunity"), Action::CRUD).unwrap();
        assert!(full.covers_crud());
        assert!(!full.has_manage());

        let partial =
            Permission::new(subject("Opportunity"), [Action::View, Action::Create, Action::Update])
                .unwrap();
        assert!(!partial.covers_crud());
    }

    // ── Role ─────────────────────────────────────────────────────────────────

    #[test]
    fn role_set_actions_replaces_instead_of_appending() {
        let mut role = Role::new("sales");
        role.set_actions(subject("Customer"), [Action::View]);
        role.set_actions(subject("CUSTOMER"), [Action::View, Action::Update]);

        assert_eq!(role.permissions.len(), 1);
        let actions = role.actions_for(&subject("customer")).unwrap();
        assert!(actions.contains(&Action::Update));
    }

    #[test]
    fn role_revoking_last_action_removes_record() {
        let mut role = Role::new("sales");
        role.grant(subject("Note"), Action::View);
        role.grant(subject("File"), Action::View);
        role.revoke(subject("Note"), &Action::View);

        assert_eq!(role.permissions.len(), 1);
        assert!(role.actions_for(&subject("Note")).is_none());
    }

    #[test]
    fn role_normalize_merges_duplicates_and_drops_empty() {
        let json = r#"{
            "id": "r1",
            "name": "manager",
            "permissions": [
                {"subject": "Product", "actions": ["view"]},
                {"subject": "product", "actions": ["update"]},
                {"subject": "Note", "actions": []}
            ]
        }"#;
        let mut role: Role = serde_json::from_str(json).unwrap();
        role.normalize();

        assert_eq!(role.permissions.len(), 1);
        assert_eq!(role.permissions[0].actions.len(), 2);
    }

    #[test]
    fn role_normalize_strips_blank_action_tokens() {
        let json = r#"{
            "id": "r1",
            "name": "sales",
            "permissions": [
                {"subject": "Note", "actions": ["  "]},
                {"subject": "File", "actions": ["", "view"]}
            ]
        }"#;
        let mut role: Role = serde_json::from_str(json).unwrap();
        role.normalize();

        assert_eq!(role.permissions.len(), 1, "Note held only a blank token");
        assert_eq!(role.permissions[0].subject, subject("File"));
        assert_eq!(role.permissions[0].actions.len(), 1);
        assert!(role.permissions[0].lists(&Action::View));
    }

    #[test]
    fn superadmin_name_is_case_insensitive() {
        assert!(is_superadmin("SuperAdmin"));
        assert!(!is_superadmin(" superadmin "), "no whitespace normalization");
        assert!(!is_superadmin("super admin"));
        assert!(!is_superadmin("admin"));
        assert!(Role::new("SUPERADMIN").is_superadmin());
    }

    #[test]
    fn role_new_generates_distinct_ids() {
        let ids: std::collections::HashSet<String> =
            (0..50).map(|_| Role::new("x").id).collect();
        assert_eq!(ids.len(), 50);
    }

    // ── AuthUser ─────────────────────────────────────────────────────────────

    #[test]
    fn auth_user_uses_camel_case_role_name() {
        let user = AuthUser::new("sales", Vec::new());
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["roleName"], "sales");
    }

    #[test]
    fn raw_user_accepts_legacy_field_names() {
        let raw: RawAuthUser = serde_json::from_str(
            r#"{"role": "sales", "permissions": [{"subject": "Note", "action": "read"}]}"#,
        )
        .unwrap();
        assert_eq!(raw.role_name.as_deref(), Some("sales"));
        assert_eq!(raw.permissions[0].action.as_deref(), Some("read"));
        assert!(raw.permissions[0].actions.is_none());
    }

    // ── CrmError display messages ────────────────────────────────────────────

    #[test]
    fn error_storage_display() {
        let err = CrmError::Storage { reason: "disk full".to_string() };
        let msg = err.to_string();
        assert!(msg.contains("storage error"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn error_outside_provider_scope_display() {
        let msg = CrmError::OutsideProviderScope.to_string();
        assert!(msg.contains("outside of an ability provider scope"));
    }
}

//! Sample user payloads as the authentication service would deliver them.
//!
//! All data here is fictional. The payloads deliberately mix the modern
//! `actions` array with the legacy single `action` field so scenarios
//! exercise the ingestion boundary.

use std::path::Path;

use serde_json::{json, Value};

use crm_ability::ingest::parse_user_json;
use crm_contracts::{AuthUser, CrmError, CrmResult};

/// Prefix selecting a built-in sample user instead of a payload file.
pub const SAMPLE_PREFIX: &str = "sample:";

/// Names accepted by `sample_user`.
pub const SAMPLE_USERS: [&str; 6] = [
    "superadmin",
    "admin",
    "manager",
    "sales",
    "auditor",
    "legacy-sales",
];

/// Raw JSON payload for one of the sample users.
pub fn sample_payload(name: &str) -> Option<Value> {
    let payload = match name {
        "superadmin" => json!({
            "roleName": "superadmin",
            "permissions": []
        }),
        "admin" => json!({
            "roleName": "admin",
            "permissions": [
                { "subject": "Dashboard", "actions": ["view"] },
                { "subject": "Customer", "actions": ["manage"] },
                { "subject": "Opportunity", "actions": ["manage"] },
                { "subject": "Product", "actions": ["manage"] },
                { "subject": "User", "actions": ["manage"] },
                { "subject": "Role", "actions": ["view", "create", "update", "delete"] }
            ]
        }),
        "manager" => json!({
            "roleName": "manager",
            "permissions": [
                { "subject": "Dashboard", "actions": ["view"] },
                { "subject": "Opportunity", "actions": ["view", "create", "update", "delete"] },
                { "subject": "Customer", "actions": ["view", "update"] },
                { "subject": "Role", "actions": ["view"] }
            ]
        }),
        "sales" => json!({
            "roleName": "sales",
            "permissions": [
                { "subject": "Opportunity", "actions": ["view", "create"] }
            ]
        }),
        "auditor" => json!({
            "roleName": "auditor",
            "permissions": [
                { "subject": "*", "actions": ["read"] }
            ]
        }),
        "legacy-sales" => json!({
            "role": "sales",
            "permissions": [
                { "subject": "Customer", "action": "read" },
                { "subject": "customer", "action": "write" },
                { "subject": "Note", "action": "create" },
                { "action": "delete" },
                { "subject": "", "actions": ["view"] },
                { "subject": "File", "actions": [] }
            ]
        }),
        _ => return None,
    };
    Some(payload)
}

/// Ingest one of the sample users.
pub fn sample_user(name: &str) -> CrmResult<AuthUser> {
    let payload = sample_payload(name).ok_or_else(|| CrmError::NotFound {
        what: format!("sample user '{}'", name),
    })?;
    parse_user_json(&payload.to_string())
}

/// Load a user snapshot from `sample:<name>` or a JSON payload file.
pub fn load_user(source: &str) -> CrmResult<AuthUser> {
    if let Some(name) = source.strip_prefix(SAMPLE_PREFIX) {
        return sample_user(name);
    }
    let path = Path::new(source);
    let json = std::fs::read_to_string(path).map_err(|e| CrmError::InvalidInput {
        reason: format!("failed to read user payload '{}': {}", path.display(), e),
    })?;
    parse_user_json(&json)
}

//! Normalization of user payloads at the authentication boundary.
//!
//! The authentication service has shipped two permission shapes over time:
//! `{subject, actions: [..]}` and the legacy `{subject, action}`. Both are
//! folded into the canonical `Permission` here, once, so the evaluator only
//! ever sees one shape.
//!
//! Entries with no usable subject or no usable action are dropped. Entries
//! naming the same subject (case-insensitively) are merged.

use tracing::warn;

use crm_contracts::{
    Action, AuthUser, CrmResult, Permission, RawAuthUser, RawPermission, Subject,
};

/// Normalize a raw payload into an `AuthUser` snapshot.
pub fn ingest_user(raw: RawAuthUser) -> AuthUser {
    let role_name = raw
        .role_name
        .map(|name| name.trim().to_string())
        .unwrap_or_default();
    if role_name.is_empty() {
        warn!("user payload carries no role name; only explicit permissions apply");
    }
    AuthUser::new(role_name, ingest_permissions(raw.permissions))
}

/// Normalize a list of raw permission entries.
pub fn ingest_permissions(raw: Vec<RawPermission>) -> Vec<Permission> {
    let mut out: Vec<Permission> = Vec::with_capacity(raw.len());

    for (index, entry) in raw.into_iter().enumerate() {
        let Some(subject) = entry.subject.as_deref().and_then(Subject::parse) else {
            warn!(index, "dropping permission entry without a subject");
            continue;
        };

        let actions = entry
            .actions
            .into_iter()
            .flatten()
            .chain(entry.action)
            .map(|token| Action::parse(&token));

        let Some(permission) = Permission::new(subject, actions) else {
            warn!(index, "dropping permission entry without actions");
            continue;
        };

        match out.iter_mut().find(|p| p.subject == permission.subject) {
            Some(existing) => existing.actions.extend(permission.actions),
            None => out.push(permission),
        }
    }

    out
}

/// Parse a JSON user payload and normalize it.
///
/// Only JSON syntax errors surface; shape problems inside the permission
/// list are absorbed by `ingest_permissions`.
pub fn parse_user_json(json: &str) -> CrmResult<AuthUser> {
    let raw: RawAuthUser = serde_json::from_str(json)?;
    Ok(ingest_user(raw))
}

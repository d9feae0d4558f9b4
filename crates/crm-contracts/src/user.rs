//! The authenticated-user snapshot as the authorization core consumes it.
//!
//! `AuthUser` is the canonical shape. `RawAuthUser` and `RawPermission` mirror
//! what the authentication service actually sends, including legacy field
//! names; they are normalized into `AuthUser` at the ingestion boundary.

use serde::{Deserialize, Serialize};

use crate::permission::Permission;

/// Immutable per-session snapshot of the signed-in user's authorization data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub role_name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl AuthUser {
    pub fn new(role_name: impl Into<String>, permissions: Vec<Permission>) -> Self {
        Self {
            role_name: role_name.into(),
            permissions,
        }
    }
}

/// A user payload as received from the authentication service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAuthUser {
    #[serde(default, rename = "roleName", alias = "role_name", alias = "role")]
    pub role_name: Option<String>,
    #[serde(default)]
    pub permissions: Vec<RawPermission>,
}

/// A permission entry in either the modern (`actions` array) or legacy
/// (single `action` string) shape. Both may be present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPermission {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub actions: Option<Vec<String>>,
    #[serde(default)]
    pub action: Option<String>,
}

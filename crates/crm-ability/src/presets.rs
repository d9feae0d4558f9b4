//! Role presets loaded from TOML.
//!
//! Presets describe the conventional system roles so a fresh installation has
//! something sensible to edit. They are seeded into the catalog store once;
//! after that the stored copies are authoritative.
//!
//! Example:
//! ```toml
//! [[roles]]
//! name = "sales"
//! description = "Works opportunities"
//!
//! [[roles.permissions]]
//! subject = "Opportunity"
//! actions = ["view", "create"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crm_contracts::{Action, CrmError, CrmResult, Role, Subject};

/// Presets compiled into the binary.
const BUILTIN_PRESETS: &str = include_str!("../presets/default.toml");

/// A permission line inside a preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetPermission {
    pub subject: String,
    pub actions: Vec<String>,
}

/// One preset role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePreset {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<PresetPermission>,
}

/// The top-level structure deserialized from a preset file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePresets {
    pub roles: Vec<RolePreset>,
}

impl RolePresets {
    /// Parse and validate a preset document.
    ///
    /// Returns `CrmError::ConfigError` for malformed TOML, blank role names,
    /// duplicate role names, blank subjects, or empty action lists.
    pub fn from_toml_str(s: &str) -> CrmResult<Self> {
        let presets: RolePresets = toml::from_str(s).map_err(|e| CrmError::ConfigError {
            reason: format!("failed to parse presets TOML: {}", e),
        })?;
        presets.validate()?;
        Ok(presets)
    }

    pub fn from_file(path: &Path) -> CrmResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CrmError::ConfigError {
            reason: format!("failed to read presets file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The presets shipped with the crate.
    pub fn builtin() -> CrmResult<Self> {
        Self::from_toml_str(BUILTIN_PRESETS)
    }

    /// Load from `path` when given, otherwise the built-in presets.
    pub fn load(path: Option<&Path>) -> CrmResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    pub fn find(&self, name: &str) -> Option<&RolePreset> {
        self.roles
            .iter()
            .find(|r| r.name.trim().eq_ignore_ascii_case(name.trim()))
    }

    /// Materialize every preset as a `Role` with a fresh id.
    pub fn to_roles(&self) -> Vec<Role> {
        self.roles.iter().map(RolePreset::to_role).collect()
    }

    fn validate(&self) -> CrmResult<()> {
        let mut seen: Vec<String> = Vec::new();
        for preset in &self.roles {
            let name = preset.name.trim().to_lowercase();
            if name.is_empty() {
                return Err(invalid("preset role name must not be blank".to_string()));
            }
            if seen.contains(&name) {
                return Err(invalid(format!("duplicate preset role '{}'", preset.name)));
            }
            for line in &preset.permissions {
                if Subject::parse(&line.subject).is_none() {
                    return Err(invalid(format!(
                        "preset role '{}' has a permission with a blank subject",
                        preset.name
                    )));
                }
                if line.actions.iter().all(|a| a.trim().is_empty()) {
                    return Err(invalid(format!(
                        "preset role '{}' grants no actions on '{}'",
                        preset.name, line.subject
                    )));
                }
            }
            seen.push(name);
        }
        Ok(())
    }
}

impl RolePreset {
    pub fn to_role(&self) -> Role {
        let mut role = Role::new(self.name.trim());
        role.description = self.description.clone();
        for line in &self.permissions {
            if let Some(subject) = Subject::parse(&line.subject) {
                let mut actions = role.actions_for(&subject).cloned().unwrap_or_default();
                actions.extend(line.actions.iter().map(|a| Action::parse(a)));
                role.set_actions(subject, actions);
            }
        }
        role
    }
}

fn invalid(reason: String) -> CrmError {
    CrmError::ConfigError { reason }
}

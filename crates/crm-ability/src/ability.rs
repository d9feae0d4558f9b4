//! The ability evaluator.
//!
//! `Ability` is built from one authenticated-user snapshot and answers
//! `can(action, subject)`.
//!
//! Evaluation algorithm:
//!
//! 1. Role `superadmin` (case-insensitive) → allow, without looking at the
//!    permission list.
//! 2. Empty permission list, or a blank action → deny.
//! 3. Scan every permission whose subject is `all` or equals the requested
//!    subject (case-insensitive). The scan is existential; order is irrelevant.
//! 4. For each such permission:
//!    a. `manage` listed → allow.
//!    b. `manage` requested → allow only if all four CRUD actions are listed.
//!    c. Otherwise allow if the requested action is listed.
//! 5. Nothing granted → deny.

use tracing::debug;

use crm_contracts::{is_superadmin, Action, AuthUser, Permission, Subject};
use crm_core::traits::AbilityCheck;

/// Immutable permission evaluator for one user snapshot.
///
/// Cheap to share behind an `Arc`; it holds no interior mutability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ability {
    role_name: String,
    superadmin: bool,
    permissions: Vec<Permission>,
}

impl Ability {
    pub fn new(role_name: impl Into<String>, permissions: Vec<Permission>) -> Self {
        let role_name = role_name.into();
        let superadmin = is_superadmin(&role_name);
        Self {
            role_name,
            superadmin,
            permissions,
        }
    }

    /// Build the evaluator for an authenticated user.
    pub fn for_user(user: &AuthUser) -> Self {
        Self::new(user.role_name.clone(), user.permissions.clone())
    }

    /// The evaluator used while nobody is signed in: every check fails.
    pub fn deny_all() -> Self {
        Self::new(String::new(), Vec::new())
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Typed form of `can`.
    pub fn can_action(&self, action: &Action, subject: &Subject) -> bool {
        if self.superadmin {
            return true;
        }
        if self.permissions.is_empty() || action.is_blank() {
            return false;
        }

        let granted = self
            .permissions
            .iter()
            .filter(|p| p.subject.covers(subject))
            .any(|p| grants(p, action));

        debug!(
            role = %self.role_name,
            action = %action,
            subject = %subject,
            granted,
            "ability evaluated"
        );

        granted
    }

    pub fn cannot(&self, action: &str, subject: &str) -> bool {
        !self.can(action, subject)
    }
}

/// Step 4 for a single subject-matching permission.
fn grants(permission: &Permission, action: &Action) -> bool {
    if permission.has_manage() {
        return true;
    }
    match action {
        Action::Manage => permission.covers_crud(),
        other => permission.lists(other),
    }
}

impl AbilityCheck for Ability {
    /// Normalize both arguments and evaluate.
    ///
    /// A blank subject matches nothing; it is still allowed for `superadmin`.
    fn can(&self, action: &str, subject: &str) -> bool {
        if self.superadmin {
            return true;
        }
        match Subject::parse(subject) {
            Some(subject) => self.can_action(&Action::parse(action), &subject),
            None => false,
        }
    }

    fn role_name(&self) -> &str {
        &self.role_name
    }

    fn is_superadmin(&self) -> bool {
        self.superadmin
    }
}

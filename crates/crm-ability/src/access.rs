//! Gates for the role-management surface.

use crm_contracts::{CrmError, CrmResult};
use crm_core::traits::AbilityCheck;

/// Subjects whose `manage` right unlocks role management.
const ROLE_ADMIN_SUBJECTS: [&str; 2] = ["Role", "User"];

/// True for `superadmin`, or for a user holding `manage` on both `Role` and
/// `User`.
pub fn can_manage_roles(ability: &dyn AbilityCheck) -> bool {
    ability.is_superadmin()
        || ROLE_ADMIN_SUBJECTS
            .iter()
            .all(|subject| ability.can("manage", subject))
}

/// `can_manage_roles` as a `Result`, for command handlers.
pub fn require_role_management(ability: &dyn AbilityCheck) -> CrmResult<()> {
    if can_manage_roles(ability) {
        return Ok(());
    }
    Err(CrmError::Forbidden {
        reason: format!(
            "role '{}' may not manage roles (requires manage on Role and User)",
            ability.role_name()
        ),
    })
}

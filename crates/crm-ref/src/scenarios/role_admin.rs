//! Scenario 2: Role Administration
//!
//! An admin holding `manage` on User and full CRUD on Role (which counts as
//! `manage`) registers a custom `Invoice` subject, builds a `billing` role
//! through the permission matrix, and saves it. A billing user signed in with
//! that role can then manage invoices. A sales user is refused the
//! role-management surface altogether.

use std::sync::Arc;

use crm_ability::{can_manage_roles, require_role_management, Ability};
use crm_catalog::{CatalogStore, MemoryStore, PermissionMatrix};
use crm_contracts::{Action, AuthUser, CrmError, CrmResult, Role};
use crm_core::traits::{RoleRepository, SubjectRepository};

use crate::mock_data::sample_user;

use super::{print_checks, Check};

/// Result of the admin's edits, kept for display.
#[derive(Debug)]
pub struct RoleAdminOutcome {
    pub checks: Vec<Check>,
    pub saved_role: Role,
    pub catalog_size: usize,
}

pub fn run() -> CrmResult<RoleAdminOutcome> {
    let store = CatalogStore::new(Arc::new(MemoryStore::new()));

    let admin = Ability::for_user(&sample_user("admin")?);
    let sales = Ability::for_user(&sample_user("sales")?);

    // The admin passes the gate; the sales rep does not.
    require_role_management(&admin)?;
    let sales_refused = matches!(
        require_role_management(&sales),
        Err(CrmError::Forbidden { .. })
    );

    store.add_custom_subject("Invoice", Some("Invoices"))?;
    let catalog = store.subject_catalog();

    let mut matrix = PermissionMatrix::new(
        Role::new("billing").with_description("Raises and chases invoices"),
        &catalog,
    );
    for (index, entry) in catalog.iter().enumerate() {
        match entry.subject.key() {
            "invoice" => {
                matrix.toggle(index, &Action::Manage);
            }
            "customer" => {
                matrix.toggle(index, &Action::View);
            }
            _ => {}
        }
    }
    let saved_role = matrix.into_role();
    let roles = store.upsert_role(saved_role.clone())?;

    let stored = store
        .find_role_by_name("BILLING")
        .ok_or_else(|| CrmError::NotFound { what: "role 'billing'".to_string() })?;
    let billing = Ability::for_user(&AuthUser::new(stored.name.clone(), stored.permissions.clone()));

    let checks = vec![
        Check::fact("admin may manage roles", true, can_manage_roles(&admin)),
        Check::fact("sales is refused role management", true, sales_refused),
        Check::fact("billing role stored exactly once", true, roles.len() == 1),
        Check::can(&billing, "delete", "Invoice", true),
        Check::can(&billing, "manage", "invoice", true),
        Check::can(&billing, "view", "Customer", true),
        Check::can(&billing, "update", "Customer", false),
        Check::can(&billing, "view", "Opportunity", false),
    ];

    Ok(RoleAdminOutcome {
        checks,
        saved_role: stored,
        catalog_size: catalog.len(),
    })
}

pub fn checks() -> CrmResult<Vec<Check>> {
    Ok(run()?.checks)
}

/// Run Scenario 2 and print the saved role and decisions.
pub fn run_scenario() -> CrmResult<()> {
    println!("=== Scenario 2: Role Administration ===");
    let outcome = run()?;
    println!("  catalog subjects:   {}", outcome.catalog_size);
    println!("  saved role:         {} ({})", outcome.saved_role.name, outcome.saved_role.id);
    for permission in &outcome.saved_role.permissions {
        let actions: Vec<&str> = permission.actions.iter().map(|a| a.as_str()).collect();
        println!("    {:<16} [{}]", permission.subject.name(), actions.join(", "));
    }
    println!();
    print_checks(&outcome.checks);
    Ok(())
}

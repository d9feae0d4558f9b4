//! Scenario 3: Legacy Payload Ingestion
//!
//! The authentication service still emits the old single-`action` shape for
//! some accounts. The payload is normalized once at ingestion: synonyms are
//! folded, duplicate subjects merged, and entries with no subject or no
//! actions dropped.

use crm_ability::Ability;
use crm_contracts::{CrmResult, Subject};

use crate::mock_data::{sample_payload, sample_user};

use super::{print_checks, Check};

pub fn checks() -> CrmResult<Vec<Check>> {
    let user = sample_user("legacy-sales")?;
    let ability = Ability::for_user(&user);

    let customer_actions = Subject::parse("Customer")
        .and_then(|s| {
            user.permissions
                .iter()
                .find(|p| p.subject == s)
                .map(|p| p.actions.len())
        })
        .unwrap_or(0);

    Ok(vec![
        Check::fact("role name read from legacy 'role' field", true, user.role_name == "sales"),
        Check::fact("two records survive ingestion", true, user.permissions.len() == 2),
        Check::fact("Customer entries merged into one record", true, customer_actions == 2),
        Check::can(&ability, "view", "Customer", true),
        Check::can(&ability, "update", "Customer", true),
        Check::can(&ability, "delete", "Customer", false),
        Check::can(&ability, "create", "Note", true),
        Check::can(&ability, "view", "File", false),
    ])
}

/// Run Scenario 3 and print the normalized snapshot and decisions.
pub fn run_scenario() -> CrmResult<()> {
    println!("=== Scenario 3: Legacy Payload Ingestion ===");
    if let Some(payload) = sample_payload("legacy-sales") {
        println!("  raw payload:  {}", payload);
    }
    let user = sample_user("legacy-sales")?;
    for permission in &user.permissions {
        let actions: Vec<&str> = permission.actions.iter().map(|a| a.as_str()).collect();
        println!("  normalized:   {} -> [{}]", permission.subject, actions.join(", "));
    }
    println!();
    print_checks(&checks()?);
    Ok(())
}

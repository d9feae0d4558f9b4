//! Scenario 1: Sales Representative
//!
//! A `sales` user holding `view` and `create` on Opportunity and nothing
//! else. Shows deny-by-default for unlisted actions and subjects, and that
//! the role name itself grants nothing.

use crm_ability::Ability;
use crm_contracts::CrmResult;

use crate::mock_data::sample_user;

use super::{print_checks, Check};

pub fn checks() -> CrmResult<Vec<Check>> {
    let user = sample_user("sales")?;
    let ability = Ability::for_user(&user);

    Ok(vec![
        Check::can(&ability, "view", "Opportunity", true),
        Check::can(&ability, "create", "Opportunity", true),
        Check::can(&ability, "read", "opportunity", true),
        Check::can(&ability, "update", "Opportunity", false),
        Check::can(&ability, "delete", "Opportunity", false),
        Check::can(&ability, "manage", "Opportunity", false),
        Check::can(&ability, "view", "Customer", false),
        Check::can(&ability, "view", "Dashboard", false),
    ])
}

/// Run Scenario 1 and print the decisions.
pub fn run_scenario() -> CrmResult<()> {
    println!("=== Scenario 1: Sales Representative ===");
    println!("  roleName: sales");
    println!("  permissions: Opportunity -> [view, create]");
    println!();
    print_checks(&checks()?);
    Ok(())
}

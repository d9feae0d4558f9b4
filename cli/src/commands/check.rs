use crm_ability::{Ability, AbilityCheck};
use crm_catalog::PermissionMatrix;
use crm_contracts::CrmResult;

use super::{load_user, Context};

pub fn check(user: &str, action: &str, subject: &str) -> CrmResult<()> {
    let ability = Ability::for_user(&load_user(user)?);
    let allowed = ability.can(action, subject);
    println!("{}", if allowed { "allowed" } else { "denied" });
    Ok(())
}

pub fn abilities(ctx: &Context, user: &str) -> CrmResult<()> {
    let user = load_user(user)?;
    let ability = Ability::for_user(&user);
    let columns = PermissionMatrix::columns();

    println!("role: {}", if user.role_name.is_empty() { "-" } else { user.role_name.as_str() });
    print!("{:<24}", "SUBJECT");
    for action in &columns {
        print!(" {:<7}", action.as_str().to_uppercase());
    }
    println!();
    println!("{}", "-".repeat(24 + columns.len() * 8));

    for entry in ctx.store.subject_catalog() {
        print!("{:<24}", entry.label);
        for action in &columns {
            let mark = if ability.can_action(action, &entry.subject) { "yes" } else { "." };
            print!(" {:<7}", mark);
        }
        println!();
    }
    Ok(())
}

use clap::Subcommand;

use crm_catalog::CatalogStore;
use crm_contracts::{Action, CrmError, CrmResult, Role, Subject};
use crm_core::traits::RoleRepository;

use super::{load_operator, Context};

#[derive(Subcommand)]
pub enum RolesCommand {
    /// List stored roles.
    List,
    /// Show one role by id or name.
    Show { role: String },
    /// Create a role, or update the one matching --id / --name.
    Upsert {
        /// Acting user: JSON file path or `sample:<name>`.
        #[arg(long = "as")]
        operator: String,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// `Subject=action,action`; an empty list (`Subject=`) removes the grant.
        #[arg(long = "grant")]
        grants: Vec<String>,
    },
    /// Delete a role by id.
    Delete {
        #[arg(long = "as")]
        operator: String,
        id: String,
    },
}

pub fn run(ctx: &Context, command: RolesCommand) -> CrmResult<()> {
    match command {
        RolesCommand::List => {
            let roles = ctx.store.list_roles();
            if roles.is_empty() {
                println!("No roles stored.");
                return Ok(());
            }
            println!("{:<38} {:<16} {:>6} {}", "ID", "NAME", "GRANTS", "DESCRIPTION");
            println!("{}", "-".repeat(90));
            for role in &roles {
                println!(
                    "{:<38} {:<16} {:>6} {}",
                    role.id,
                    role.name,
                    role.permissions.len(),
                    role.description.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }
        RolesCommand::Show { role } => {
            let found = ctx
                .store
                .find_role(&role)
                .or_else(|| ctx.store.find_role_by_name(&role))
                .ok_or_else(|| CrmError::NotFound { what: format!("role '{}'", role) })?;
            print_role(&found);
            Ok(())
        }
        RolesCommand::Upsert { operator, id, name, description, grants } => {
            load_operator(&operator)?;
            let grants = grants
                .iter()
                .map(|g| parse_grant(g))
                .collect::<CrmResult<Vec<_>>>()?;

            let mut role = upsert_target(&ctx.store, id, name.as_deref())?;
            if let Some(description) = description {
                role.description = Some(description).filter(|d| !d.trim().is_empty());
            }
            for (subject, actions) in grants {
                role.set_actions(subject, actions);
            }

            let saved_id = role.id.clone();
            let roles = ctx.store.upsert_role(role)?;
            if let Some(saved) = roles.iter().find(|r| r.id == saved_id) {
                print_role(saved);
            }
            Ok(())
        }
        RolesCommand::Delete { operator, id } => {
            load_operator(&operator)?;
            if ctx.store.find_role(&id).is_none() {
                return Err(CrmError::NotFound { what: format!("role '{}'", id) });
            }
            let roles = ctx.store.delete_role(&id)?;
            println!("Deleted {}; {} role(s) remain.", id, roles.len());
            Ok(())
        }
    }
}

/// The role an upsert edits: the one with `id` when given (a new role under
/// that id if unseen), otherwise the one named `name`, otherwise a new role.
/// Never takes a name already held by a different role.
fn upsert_target(store: &CatalogStore, id: Option<String>, name: Option<&str>) -> CrmResult<Role> {
    let existing = match id.as_deref() {
        Some(id) => store.find_role(id),
        None => name.and_then(|n| store.find_role_by_name(n)),
    };

    let mut role = match (existing, id, name) {
        (Some(role), _, _) => role,
        (None, id, Some(name)) => {
            let mut role = Role::new(name);
            if let Some(id) = id {
                role.id = id;
            }
            role
        }
        (None, _, None) => {
            return Err(CrmError::InvalidInput {
                reason: "--name is required when creating a role".to_string(),
            })
        }
    };

    if let Some(name) = name {
        if let Some(other) = store.find_role_by_name(name).filter(|r| r.id != role.id) {
            return Err(CrmError::InvalidInput {
                reason: format!("a role named '{}' already exists (id {})", other.name, other.id),
            });
        }
        role.name = name.to_string();
    }
    Ok(role)
}

fn print_role(role: &Role) {
    println!("id:          {}", role.id);
    println!("name:        {}", role.name);
    if let Some(description) = &role.description {
        println!("description: {}", description);
    }
    if role.permissions.is_empty() {
        println!("permissions: (none)");
        return;
    }
    println!("permissions:");
    for permission in &role.permissions {
        let actions: Vec<&str> = permission.actions.iter().map(|a| a.as_str()).collect();
        println!("  {:<20} {}", permission.subject.name(), actions.join(", "));
    }
}

/// Parse `Subject=view,create` into a subject and its actions.
fn parse_grant(raw: &str) -> CrmResult<(Subject, Vec<Action>)> {
    let (subject, actions) = raw.split_once('=').ok_or_else(|| CrmError::InvalidInput {
        reason: format!("grant '{}' must look like Subject=action,action", raw),
    })?;
    let subject = Subject::parse(subject).ok_or_else(|| CrmError::InvalidInput {
        reason: format!("grant '{}' has a blank subject", raw),
    })?;
    let actions = actions
        .split(',')
        .filter(|a| !a.trim().is_empty())
        .map(Action::parse)
        .collect();
    Ok((subject, actions))
}

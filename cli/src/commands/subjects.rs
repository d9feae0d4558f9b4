use clap::Subcommand;

use crm_contracts::CrmResult;
use crm_core::traits::SubjectRepository;

use super::{load_operator, Context};

#[derive(Subcommand)]
pub enum SubjectsCommand {
    /// Show the merged catalog (built-in and custom), sorted by label.
    List,
    /// Register or relabel a custom subject.
    Add {
        /// Acting user: JSON file path or `sample:<name>`.
        #[arg(long = "as")]
        operator: String,
        key: String,
        #[arg(long)]
        label: Option<String>,
    },
    /// Remove a custom subject (case-insensitive key).
    Delete {
        #[arg(long = "as")]
        operator: String,
        key: String,
    },
}

pub fn run(ctx: &Context, command: SubjectsCommand) -> CrmResult<()> {
    match command {
        SubjectsCommand::List => list(ctx),
        SubjectsCommand::Add { operator, key, label } => {
            load_operator(&operator)?;
            let subjects = ctx.store.add_custom_subject(&key, label.as_deref())?;
            println!("{} custom subject(s)", subjects.len());
            Ok(())
        }
        SubjectsCommand::Delete { operator, key } => {
            load_operator(&operator)?;
            let subjects = ctx.store.delete_custom_subject(&key)?;
            println!("{} custom subject(s)", subjects.len());
            Ok(())
        }
    }
}

fn list(ctx: &Context) -> CrmResult<()> {
    println!("{:<24} {:<24} {}", "KEY", "LABEL", "SOURCE");
    println!("{}", "-".repeat(58));
    for entry in ctx.store.subject_catalog() {
        println!(
            "{:<24} {:<24} {}",
            entry.subject.name(),
            entry.label,
            if entry.custom { "custom" } else { "built-in" }
        );
    }
    Ok(())
}

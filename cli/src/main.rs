//! `crm` — command-line access to the sales CRM authorization core.
//!
//! Usage:
//!   crm check --user sample:sales --action delete --subject Opportunity
//!   crm abilities --user ./me.json
//!   crm roles list
//!   crm roles upsert --as sample:superadmin --name billing --grant Invoice=manage
//!   crm subjects add --as sample:superadmin Invoice --label Invoices
//!   crm demo run-all
//!
//! `--user` / `--as` take a path to a JSON user payload, or `sample:<name>`
//! for one of the built-in sample users.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crm_contracts::CrmResult;
use crm_core::config::AppConfig;
use crm_ref::scenarios::{legacy_payload, role_admin, sales_rep};

use commands::Context;

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "crm",
    version,
    about = "Sales CRM roles, subjects and ability checks",
    long_about = "Evaluates ability checks for user snapshots and manages the\n\
                  client-local role and custom-subject catalogs."
)]
struct Cli {
    /// Path to a TOML config file (default: ./crm.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer one can(action, subject) question.
    Check {
        /// User payload: JSON file path or `sample:<name>`.
        #[arg(long)]
        user: String,
        #[arg(long)]
        action: String,
        #[arg(long)]
        subject: String,
    },
    /// Print the subject x action grid for a user.
    Abilities {
        #[arg(long)]
        user: String,
    },
    /// List and edit stored roles.
    Roles {
        #[command(subcommand)]
        command: commands::roles::RolesCommand,
    },
    /// List and edit custom subjects.
    Subjects {
        #[command(subcommand)]
        command: commands::subjects::SubjectsCommand,
    },
    /// Run the reference scenarios.
    Demo {
        #[command(subcommand)]
        scenario: Scenario,
    },
}

#[derive(Subcommand)]
enum Scenario {
    /// Run all three scenarios in sequence.
    RunAll,
    /// Scenario 1: sales representative with a narrow grant.
    SalesRep,
    /// Scenario 2: role administration and the management gate.
    RoleAdmin,
    /// Scenario 3: legacy single-action payload ingestion.
    LegacyPayload,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("crm: {}", e);
            std::process::exit(2);
        }
    };

    // RUST_LOG wins over the configured filter.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.filter)),
        )
        .with_target(false)
        .compact()
        .init();

    if let Err(e) = run(cli.command, config) {
        eprintln!("crm: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command, config: AppConfig) -> CrmResult<()> {
    match command {
        Command::Check { user, action, subject } => commands::check::check(&user, &action, &subject),
        Command::Abilities { user } => commands::check::abilities(&Context::open(config)?, &user),
        Command::Roles { command } => commands::roles::run(&Context::open(config)?, command),
        Command::Subjects { command } => commands::subjects::run(&Context::open(config)?, command),
        Command::Demo { scenario } => run_demo(scenario),
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run_demo(scenario: Scenario) -> CrmResult<()> {
    match scenario {
        Scenario::RunAll => {
            sales_rep::run_scenario()?;
            role_admin::run_scenario()?;
            legacy_payload::run_scenario()
        }
        Scenario::SalesRep => sales_rep::run_scenario(),
        Scenario::RoleAdmin => role_admin::run_scenario(),
        Scenario::LegacyPayload => legacy_payload::run_scenario(),
    }
}

//! Runnable authorization scenarios.
//!
//! Each scenario exposes `checks()` returning every decision it made, and
//! `run_scenario()` which prints them.

pub mod legacy_payload;
pub mod role_admin;
pub mod sales_rep;

use crm_core::traits::AbilityCheck;

/// One evaluated expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub label: String,
    pub expected: bool,
    pub actual: bool,
}

impl Check {
    /// Evaluate `can(action, subject)` and record it against `expected`.
    pub fn can(ability: &dyn AbilityCheck, action: &str, subject: &str, expected: bool) -> Self {
        Self {
            label: format!("can({}, {})", action, subject),
            expected,
            actual: ability.can(action, subject),
        }
    }

    pub fn fact(label: impl Into<String>, expected: bool, actual: bool) -> Self {
        Self {
            label: label.into(),
            expected,
            actual,
        }
    }

    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

/// Print a block of checks and a one-line verdict.
pub(crate) fn print_checks(checks: &[Check]) {
    for check in checks {
        println!(
            "  {:<40} {:<6} {}",
            check.label,
            if check.actual { "true" } else { "false" },
            if check.passed() { "" } else { "<-- UNEXPECTED" }
        );
    }
    let failed = checks.iter().filter(|c| !c.passed()).count();
    if failed == 0 {
        println!("  RESULT: {} check(s) as expected", checks.len());
    } else {
        println!("  RESULT: {} of {} check(s) UNEXPECTED", failed, checks.len());
    }
    println!();
}

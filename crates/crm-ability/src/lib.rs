//! # crm-ability
//!
//! The deny-by-default ability evaluator for the sales CRM.
//!
//! ## Overview
//!
//! [`Ability`] implements [`AbilityCheck`](crm_core::traits::AbilityCheck).
//! It is built from an authenticated-user snapshot and answers
//! `can(action, subject)` for every button, menu item and route guard.
//! [`AbilityProvider`] keeps one evaluator per snapshot and makes it reachable
//! through [`use_ability`].
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use crm_ability::{parse_user_json, Ability};
//! use crm_core::traits::AbilityCheck;
//!
//! let user = parse_user_json(payload)?;
//! let ability = Ability::for_user(&user);
//! if ability.can("delete", "Opportunity") { /* render the button */ }
//! ```
//!
//! ## Rule matching
//!
//! Actions are lower-cased with `read` → `view` and `write` → `update`.
//! Subjects compare case-insensitively; `all` (or `*`) matches any subject.
//! `manage` grants everything on its subject, and asking for `manage`
//! succeeds when all four CRUD actions are granted individually. The model is
//! purely additive: there are no deny rules.

pub mod ability;
pub mod access;
pub mod ingest;
pub mod presets;
pub mod provider;

pub use ability::Ability;
pub use access::{can_manage_roles, require_role_management};
pub use crm_core::traits::AbilityCheck;
pub use ingest::{ingest_permissions, ingest_user, parse_user_json};
pub use presets::{PresetPermission, RolePreset, RolePresets};
pub use provider::{try_use_ability, use_ability, AbilityProvider};

// ── Tests ─────────────────────────────────────────────────────────────────────

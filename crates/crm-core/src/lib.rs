//! # crm-core
//!
//! Trait seams and configuration for the sales CRM authorization core.
//!
//! This crate provides:
//! - The four seam traits (`AbilityCheck`, `KeyValueStore`, `RoleRepository`,
//!   `SubjectRepository`)
//! - `AppConfig`, the TOML configuration shared by the binaries

pub mod config;
pub mod traits;

pub use config::{AppConfig, LogConfig, PresetsConfig, StorageBackend, StorageConfig};
pub use traits::{AbilityCheck, KeyValueStore, RoleRepository, SubjectRepository};

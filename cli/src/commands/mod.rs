pub mod check;
pub mod roles;
pub mod subjects;

use tracing::info;

use crm_ability::{require_role_management, Ability, RolePresets};
use crm_catalog::{open_storage, CatalogStore};
use crm_contracts::CrmResult;
use crm_core::config::AppConfig;
use crm_ref::mock_data::load_user;

/// Everything a catalog command needs.
pub struct Context {
    pub store: CatalogStore,
}

impl Context {
    /// Open the configured storage and seed missing preset roles.
    pub fn open(config: AppConfig) -> CrmResult<Self> {
        let store = CatalogStore::new(open_storage(&config.storage));
        if config.presets.seed {
            let presets = RolePresets::load(config.presets.path.as_deref())?;
            let roles = store.seed_roles(presets.to_roles())?;
            info!(roles = roles.len(), "catalog ready");
        }
        Ok(Self { store })
    }
}

/// Load the acting user and require the role-management gate.
pub fn load_operator(source: &str) -> CrmResult<Ability> {
    let ability = Ability::for_user(&load_user(source)?);
    require_role_management(&ability)?;
    Ok(ability)
}

//! Ability provider: one evaluator for the whole UI tree.
//!
//! The provider owns the current user snapshot and the `Ability` derived from
//! it. The ability is rebuilt only when the snapshot's `Arc` identity changes,
//! so re-publishing the same snapshot is free.
//!
//! Code running inside `AbilityProvider::scope` reaches the ability through
//! `use_ability()`. Calling it outside any scope panics: a screen that checks
//! permissions without a provider around it is a wiring bug, and answering
//! "no access" would hide it.

use std::{cell::RefCell, sync::Arc};

use tracing::debug;

use crm_contracts::{AuthUser, CrmError, CrmResult};

use crate::ability::Ability;

thread_local! {
    static ACTIVE: RefCell<Vec<Arc<Ability>>> = const { RefCell::new(Vec::new()) };
}

/// Holds the signed-in user's snapshot and its evaluator.
#[derive(Debug)]
pub struct AbilityProvider {
    user: Option<Arc<AuthUser>>,
    ability: Arc<Ability>,
}

impl AbilityProvider {
    pub fn new(user: Option<Arc<AuthUser>>) -> Self {
        let ability = Arc::new(build(user.as_deref()));
        Self { user, ability }
    }

    pub fn ability(&self) -> Arc<Ability> {
        Arc::clone(&self.ability)
    }

    /// Publish a new snapshot (or sign-out with `None`).
    ///
    /// Returns `true` when the ability was rebuilt.
    pub fn set_user(&mut self, user: Option<Arc<AuthUser>>) -> bool {
        let unchanged = match (&self.user, &user) {
            (Some(current), Some(next)) => Arc::ptr_eq(current, next),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return false;
        }

        self.ability = Arc::new(build(user.as_deref()));
        self.user = user;
        debug!(role = %self.ability_role(), "ability rebuilt for new user snapshot");
        true
    }

    /// Run `f` with this provider's ability reachable via `use_ability()`.
    ///
    /// Scopes nest; the innermost provider wins.
    pub fn scope<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = ScopeGuard::enter(self.ability());
        f()
    }

    fn ability_role(&self) -> &str {
        self.user.as_deref().map(|u| u.role_name.as_str()).unwrap_or("")
    }
}

fn build(user: Option<&AuthUser>) -> Ability {
    match user {
        Some(user) => Ability::for_user(user),
        None => Ability::deny_all(),
    }
}

/// Pops the scope on drop, including during unwinding.
struct ScopeGuard;

impl ScopeGuard {
    fn enter(ability: Arc<Ability>) -> Self {
        ACTIVE.with(|stack| stack.borrow_mut().push(ability));
        ScopeGuard
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        ACTIVE.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// The ability of the innermost enclosing provider scope.
pub fn try_use_ability() -> CrmResult<Arc<Ability>> {
    ACTIVE
        .with(|stack| stack.borrow().last().cloned())
        .ok_or(CrmError::OutsideProviderScope)
}

/// The ability of the innermost enclosing provider scope.
///
/// # Panics
///
/// Panics when no `AbilityProvider::scope` is active on this thread.
pub fn use_ability() -> Arc<Ability> {
    match try_use_ability() {
        Ok(ability) => ability,
        Err(e) => panic!("{}", e),
    }
}

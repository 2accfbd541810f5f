//! Collaborator interfaces for principal roles and custom grants

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use crate::catalog;
use crate::error::{RbacError, Result};
use crate::role::Role;

/// A custom grant: every principal holding `role` also holds `permission`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomGrant {
    pub role: Role,
    pub permission: String,
}

impl CustomGrant {
    pub fn new(role: Role, permission: impl Into<String>) -> Self {
        CustomGrant { role, permission: permission.into() }
    }
}

/// Read access to the externally owned user records.
pub trait UserStore: Send + Sync {
    /// The user's role, or `None` if no such user exists.
    fn role_of(&self, user_id: &str) -> Result<Option<Role>>;
}

/// Read access to the persisted role → extra permission relation.
pub trait CustomGrantStore: Send + Sync {
    /// All grants whose role is in `roles`.
    fn grants_for(&self, roles: &[Role]) -> Result<BTreeSet<CustomGrant>>;
}

/// Administrative writes to the custom grant relation. Never called by the
/// resolver.
pub trait AdminStore: UserStore + CustomGrantStore {
    /// Returns false if the grant already existed.
    fn add_custom_grant(&self, role: Role, permission: &str) -> Result<bool>;
    fn remove_custom_grant(&self, role: Role, permission: &str) -> Result<bool>;
    fn list_custom_grants(&self) -> Result<Vec<CustomGrant>>;
}

impl<T: UserStore + ?Sized> UserStore for std::sync::Arc<T> {
    fn role_of(&self, user_id: &str) -> Result<Option<Role>> {
        (**self).role_of(user_id)
    }
}

impl<T: CustomGrantStore + ?Sized> CustomGrantStore for std::sync::Arc<T> {
    fn grants_for(&self, roles: &[Role]) -> Result<BTreeSet<CustomGrant>> {
        (**self).grants_for(roles)
    }
}

/// Rejects identifiers the catalog does not know.
pub(crate) fn check_grant(permission: &str) -> Result<()> {
    catalog::get_permission(permission).map(|_| ())
}

fn poisoned<T>(_: T) -> RbacError {
    RbacError::Store("lock poisoned".into())
}

/// In-process store for tests and embedders without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, Role>>,
    grants: RwLock<BTreeSet<CustomGrant>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user_role(&self, user_id: &str, role: Role) -> Result<()> {
        self.users.write().map_err(poisoned)?.insert(user_id.to_string(), role);
        Ok(())
    }

    pub fn remove_user(&self, user_id: &str) -> Result<bool> {
        Ok(self.users.write().map_err(poisoned)?.remove(user_id).is_some())
    }

    /// Returns false if the grant already existed.
    pub fn add_custom_grant(&self, role: Role, permission: &str) -> Result<bool> {
        check_grant(permission)?;
        Ok(self.grants.write().map_err(poisoned)?.insert(CustomGrant::new(role, permission)))
    }

    pub fn remove_custom_grant(&self, role: Role, permission: &str) -> Result<bool> {
        Ok(self.grants.write().map_err(poisoned)?.remove(&CustomGrant::new(role, permission)))
    }
}

impl UserStore for MemoryStore {
    fn role_of(&self, user_id: &str) -> Result<Option<Role>> {
        Ok(self.users.read().map_err(poisoned)?.get(user_id).copied())
    }
}

impl CustomGrantStore for MemoryStore {
    fn grants_for(&self, roles: &[Role]) -> Result<BTreeSet<CustomGrant>> {
        Ok(self
            .grants
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|g| roles.contains(&g.role))
            .cloned()
            .collect())
    }
}

impl AdminStore for MemoryStore {
    fn add_custom_grant(&self, role: Role, permission: &str) -> Result<bool> {
        MemoryStore::add_custom_grant(self, role, permission)
    }

    fn remove_custom_grant(&self, role: Role, permission: &str) -> Result<bool> {
        MemoryStore::remove_custom_grant(self, role, permission)
    }

    fn list_custom_grants(&self) -> Result<Vec<CustomGrant>> {
        Ok(self.grants.read().map_err(poisoned)?.iter().cloned().collect())
    }
}

//! Authorization gate
//!
//! The boundary privileged code paths call. Every check resolves the
//! principal fresh; nothing is cached between calls.

use tracing::debug;

use crate::error::{RbacError, Result};
use crate::resolver::PermissionResolver;
use crate::role::Role;
use crate::store::{CustomGrantStore, UserStore};

pub struct AuthorizationGate<U, G> {
    resolver: PermissionResolver<U, G>,
}

impl<U: Clone, G: Clone> Clone for AuthorizationGate<U, G> {
    fn clone(&self) -> Self {
        AuthorizationGate { resolver: self.resolver.clone() }
    }
}

impl<U: UserStore, G: CustomGrantStore> AuthorizationGate<U, G> {
    pub fn new(resolver: PermissionResolver<U, G>) -> Self {
        AuthorizationGate { resolver }
    }

    pub fn resolver(&self) -> &PermissionResolver<U, G> {
        &self.resolver
    }

    pub fn has_permission(&self, user_id: &str, permission: &str) -> Result<bool> {
        Ok(self.resolver.resolve(user_id)?.contains(permission))
    }

    /// False for an empty `permissions` list.
    pub fn has_any_permission(&self, user_id: &str, permissions: &[&str]) -> Result<bool> {
        if permissions.is_empty() {
            debug!(user_id, "empty permission list denied");
            return Ok(false);
        }
        let held = self.resolver.resolve(user_id)?;
        Ok(permissions.iter().any(|p| held.contains(*p)))
    }

    /// False for an empty `permissions` list, same as `has_any_permission`.
    pub fn has_all_permissions(&self, user_id: &str, permissions: &[&str]) -> Result<bool> {
        if permissions.is_empty() {
            debug!(user_id, "empty permission list denied");
            return Ok(false);
        }
        let held = self.resolver.resolve(user_id)?;
        Ok(permissions.iter().all(|p| held.contains(*p)))
    }

    /// Inheritance-aware: a role satisfies a check for any role it inherits.
    pub fn has_role(&self, user_id: &str, roles: &[Role]) -> Result<bool> {
        let Some(role) = self.resolver.role_of(user_id)? else {
            return Ok(false);
        };
        if roles.contains(&role) {
            return Ok(true);
        }
        let expanded = self.resolver.policy().hierarchy().expand(role)?;
        Ok(roles.iter().any(|r| expanded.contains(r)))
    }

    /// `Ok(())` if allowed, `Forbidden` naming the missing permission otherwise.
    pub fn require_permission(&self, user_id: &str, permission: &str) -> Result<()> {
        if self.has_permission(user_id, permission)? {
            Ok(())
        } else {
            Err(RbacError::Forbidden(permission.to_string()))
        }
    }

    /// The principal owns the entity, or holds `permission` over others'.
    pub fn can_access_entity(&self, user_id: &str, owner_id: &str, permission: &str) -> Result<bool> {
        if user_id == owner_id && self.resolver.role_of(user_id)?.is_some() {
            return Ok(true);
        }
        self.has_permission(user_id, permission)
    }
}

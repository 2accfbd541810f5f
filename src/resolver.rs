//! Effective permission resolution

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::grants::PermissionSet;
use crate::policy::Policy;
use crate::role::Role;
use crate::store::{CustomGrantStore, UserStore};

/// Computes a principal's effective permission set from the policy and the
/// two external stores. Holds no per-request state; clone freely.
pub struct PermissionResolver<U, G> {
    policy: Arc<Policy>,
    users: U,
    grants: G,
}

impl<U: Clone, G: Clone> Clone for PermissionResolver<U, G> {
    fn clone(&self) -> Self {
        PermissionResolver {
            policy: self.policy.clone(),
            users: self.users.clone(),
            grants: self.grants.clone(),
        }
    }
}

impl<U: UserStore, G: CustomGrantStore> PermissionResolver<U, G> {
    pub fn new(policy: Arc<Policy>, users: U, grants: G) -> Self {
        PermissionResolver { policy, users, grants }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn users(&self) -> &U {
        &self.users
    }

    pub fn grant_store(&self) -> &G {
        &self.grants
    }

    /// The principal's own role, `None` for an unknown user.
    pub fn role_of(&self, user_id: &str) -> Result<Option<Role>> {
        self.users.role_of(user_id)
    }

    /// Effective permissions for `user_id`.
    ///
    /// An unknown user resolves to the empty set. Store and configuration
    /// failures are returned as errors, never as an empty set.
    pub fn resolve(&self, user_id: &str) -> Result<PermissionSet> {
        match self.users.role_of(user_id)? {
            Some(role) => self.resolve_for_role(role),
            None => {
                debug!(user_id, "unknown principal resolves to no permissions");
                Ok(PermissionSet::new())
            }
        }
    }

    /// Effective permissions for any principal holding `role`.
    pub fn resolve_for_role(&self, role: Role) -> Result<PermissionSet> {
        let all_roles = self.policy.hierarchy().expand(role)?;

        let mut perms = PermissionSet::new();
        for &r in &all_roles {
            perms.extend(self.policy.grants().default_permissions_for(r)?.iter().cloned());
        }

        let roles: Vec<Role> = all_roles.into_iter().collect();
        let custom = self.grants.grants_for(&roles)?;
        let custom_count = custom.len();
        perms.extend(custom.into_iter().map(|g| g.permission));

        debug!(%role, permissions = perms.len(), custom = custom_count, "resolved permissions");
        Ok(perms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::constants::*;
    use crate::error::RbacError;
    use crate::store::{CustomGrant, MemoryStore};
    use std::collections::BTreeSet;

    fn resolver() -> PermissionResolver<Arc<MemoryStore>, Arc<MemoryStore>> {
        let store = Arc::new(MemoryStore::new());
        PermissionResolver::new(Arc::new(Policy::builtin()), store.clone(), store)
    }

    #[test]
    fn unknown_user_is_empty() {
        assert!(resolver().resolve("ghost").unwrap().is_empty());
    }

    #[test]
    fn faculty_inherits_student() {
        let r = resolver();
        r.users().set_user_role("f1", Role::Faculty).unwrap();
        let perms = r.resolve("f1").unwrap();
        assert!(perms.contains(ASSIGNMENTS_READ));
        assert!(perms.contains(ASSIGNMENTS_GRADE));
        // student-only defaults arrive through inheritance
        assert!(perms.contains(FEES_PAY));
        assert!(!perms.contains(USERS_WRITE));
    }

    #[test]
    fn top_role_is_full_catalog() {
        let r = resolver();
        r.users().set_user_role("root", Role::SuperAdmin).unwrap();
        let all: PermissionSet = catalog::identifiers().map(String::from).collect();
        assert_eq!(r.resolve("root").unwrap(), all);
    }

    #[test]
    fn custom_grant_on_ancestor_reaches_descendant() {
        let r = resolver();
        r.users().set_user_role("a1", Role::Admin).unwrap();
        r.grant_store().add_custom_grant(Role::Student, AUDIT_READ).unwrap();
        assert!(r.resolve("a1").unwrap().contains(AUDIT_READ));
    }

    struct FailingGrants;

    impl CustomGrantStore for FailingGrants {
        fn grants_for(&self, _: &[Role]) -> Result<BTreeSet<CustomGrant>> {
            Err(RbacError::Store("connection refused".into()))
        }
    }

    #[test]
    fn store_failure_propagates() {
        let users = MemoryStore::new();
        users.set_user_role("s1", Role::Student).unwrap();
        let r = PermissionResolver::new(Arc::new(Policy::builtin()), users, FailingGrants);
        assert_eq!(r.resolve("s1"), Err(RbacError::Store("connection refused".into())));
        // unknown user never reaches the grant store
        assert!(r.resolve("ghost").unwrap().is_empty());
    }
}

//! Path-prefix route guard
//!
//! Maps dashboard areas to the roles allowed in them and sends a principal
//! without access to its own landing page.

use crate::error::Result;
use crate::gate::AuthorizationGate;
use crate::role::Role;
use crate::store::{CustomGrantStore, UserStore};

static PROTECTED_ROUTES: &[(&str, &[Role])] = &[
    ("/admin", &[Role::Admin, Role::SuperAdmin]),
    ("/faculty", &[Role::Faculty, Role::Admin, Role::SuperAdmin]),
    ("/student", &[Role::Student, Role::Faculty, Role::Admin, Role::SuperAdmin]),
];

static PUBLIC_ROUTES: &[&str] = &["/login", "/register", "/api/auth", "/api/webhook"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    /// Authenticated but not allowed here; send to this path instead.
    Redirect(&'static str),
    /// Unknown principal.
    Deny,
}

/// Landing page for a role.
pub fn dashboard_for(role: Role) -> &'static str {
    match role {
        Role::SuperAdmin | Role::Admin => "/admin/dashboard",
        Role::Faculty => "/faculty/dashboard",
        Role::Student => "/student/dashboard",
    }
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_ROUTES.iter().any(|p| path.starts_with(p))
}

/// Roles allowed under `path`, or `None` if no protected prefix matches.
pub fn required_roles(path: &str) -> Option<&'static [Role]> {
    PROTECTED_ROUTES
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map(|(_, roles)| *roles)
}

pub struct RouteGuard<U, G> {
    gate: AuthorizationGate<U, G>,
}

impl<U: UserStore, G: CustomGrantStore> RouteGuard<U, G> {
    pub fn new(gate: AuthorizationGate<U, G>) -> Self {
        RouteGuard { gate }
    }

    /// Public paths are always allowed. Protected paths go through the
    /// inheritance-aware role check.
    pub fn check(&self, user_id: &str, path: &str) -> Result<RouteDecision> {
        if is_public(path) {
            return Ok(RouteDecision::Allow);
        }
        let Some(role) = self.gate.resolver().role_of(user_id)? else {
            return Ok(RouteDecision::Deny);
        };
        match required_roles(path) {
            Some(roles) if !self.gate.has_role(user_id, roles)? => {
                Ok(RouteDecision::Redirect(dashboard_for(role)))
            }
            _ => Ok(RouteDecision::Allow),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Policy;
    use crate::resolver::PermissionResolver;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn guard() -> RouteGuard<Arc<MemoryStore>, Arc<MemoryStore>> {
        let store = Arc::new(MemoryStore::new());
        store.set_user_role("s1", Role::Student).unwrap();
        store.set_user_role("f1", Role::Faculty).unwrap();
        store.set_user_role("sa", Role::SuperAdmin).unwrap();
        let resolver = PermissionResolver::new(Arc::new(Policy::builtin()), store.clone(), store);
        RouteGuard::new(AuthorizationGate::new(resolver))
    }

    #[test]
    fn student_redirected_from_admin() {
        let g = guard();
        assert_eq!(g.check("s1", "/admin/users").unwrap(), RouteDecision::Redirect("/student/dashboard"));
        assert_eq!(g.check("s1", "/student/fees").unwrap(), RouteDecision::Allow);
    }

    #[test]
    fn higher_roles_pass_lower_areas() {
        let g = guard();
        assert_eq!(g.check("f1", "/student/fees").unwrap(), RouteDecision::Allow);
        assert_eq!(g.check("sa", "/faculty/attendance").unwrap(), RouteDecision::Allow);
        assert_eq!(g.check("f1", "/admin").unwrap(), RouteDecision::Redirect("/faculty/dashboard"));
    }

    #[test]
    fn unknown_user_is_denied_not_defaulted() {
        let g = guard();
        assert_eq!(g.check("ghost", "/student").unwrap(), RouteDecision::Deny);
        assert_eq!(g.check("ghost", "/login").unwrap(), RouteDecision::Allow);
    }

    #[test]
    fn unprotected_path_allows_known_user() {
        assert_eq!(required_roles("/settings"), None);
        assert_eq!(guard().check("s1", "/settings").unwrap(), RouteDecision::Allow);
    }
}

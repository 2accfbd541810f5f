//! Role hierarchy
//!
//! Declares which roles inherit which other roles' permissions. The relation is
//! declared, not inferred: a role's parents list may name transitive ancestors
//! directly, and expansion still walks every edge.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::constants::MAX_HIERARCHY_DEPTH;
use crate::error::{RbacError, Result};
use crate::role::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleHierarchy {
    parents: HashMap<Role, Vec<Role>>,
}

impl RoleHierarchy {
    /// The built-in college hierarchy.
    pub fn builtin() -> Self {
        let parents = HashMap::from([
            (Role::Student, vec![]),
            (Role::Faculty, vec![Role::Student]),
            (Role::Admin, vec![Role::Faculty, Role::Student]),
            (Role::SuperAdmin, vec![Role::Admin, Role::Faculty, Role::Student]),
        ]);
        RoleHierarchy { parents }
    }

    /// Build a hierarchy from an explicit parents table.
    ///
    /// Every role must have an entry (possibly empty) and the relation must be
    /// acyclic.
    pub fn new(parents: HashMap<Role, Vec<Role>>) -> Result<Self> {
        for role in Role::ALL {
            if !parents.contains_key(&role) {
                return Err(RbacError::Configuration(format!(
                    "role {} missing from hierarchy",
                    role
                )));
            }
        }
        let h = RoleHierarchy { parents };
        for role in Role::ALL {
            h.expand(role)?;
        }
        Ok(h)
    }

    /// Roles inherited directly, in declaration order.
    pub fn direct_parents(&self, role: Role) -> Result<&[Role]> {
        self.parents
            .get(&role)
            .map(Vec::as_slice)
            .ok_or_else(|| RbacError::Configuration(format!("role {} missing from hierarchy", role)))
    }

    /// Transitive closure of `direct_parents`, including `role` itself.
    pub fn expand(&self, role: Role) -> Result<BTreeSet<Role>> {
        let mut done = BTreeSet::new();
        let mut path = Vec::new();
        self.visit(role, &mut path, &mut done)?;
        debug!(%role, expanded = ?done, "expanded role");
        Ok(done)
    }

    /// Whether `role` inherits from `ancestor` (or is it).
    pub fn inherits(&self, role: Role, ancestor: Role) -> Result<bool> {
        Ok(self.expand(role)?.contains(&ancestor))
    }

    fn visit(&self, role: Role, path: &mut Vec<Role>, done: &mut BTreeSet<Role>) -> Result<()> {
        if path.contains(&role) {
            path.push(role);
            let chain: Vec<&str> = path.iter().map(Role::as_str).collect();
            return Err(RbacError::Configuration(format!(
                "cycle in role hierarchy: {}",
                chain.join(" -> ")
            )));
        }
        if done.contains(&role) {
            return Ok(());
        }
        if path.len() >= MAX_HIERARCHY_DEPTH {
            return Err(RbacError::Configuration("role hierarchy too deep".into()));
        }
        path.push(role);
        for &parent in self.direct_parents(role)? {
            self.visit(parent, path, done)?;
        }
        path.pop();
        done.insert(role);
        Ok(())
    }
}

impl Default for RoleHierarchy {
    fn default() -> Self {
        Self::builtin()
    }
}

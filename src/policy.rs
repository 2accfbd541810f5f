//! Validated policy: role hierarchy plus default grant table
//!
//! A `Policy` is built once at startup and shared read-only between requests.
//! Construction fails if the tables are inconsistent, so nothing downstream
//! ever sees an unvalidated policy.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{RbacError, Result};
use crate::grants::{DefaultGrants, PermissionSet};
use crate::hierarchy::RoleHierarchy;
use crate::role::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    hierarchy: RoleHierarchy,
    grants: DefaultGrants,
}

/// Per-role overrides read from a YAML policy file.
///
/// ```yaml
/// hierarchy:
///   ADMIN: [FACULTY]
/// default_grants:
///   FACULTY: ["assignments:read", "assignments:grade"]
/// ```
///
/// Roles not mentioned keep their built-in values. Grants for the top role
/// are not configurable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    #[serde(default)]
    pub hierarchy: HashMap<Role, Vec<Role>>,
    #[serde(default)]
    pub default_grants: HashMap<Role, Vec<String>>,
}

impl Policy {
    pub fn builtin() -> Self {
        Policy { hierarchy: RoleHierarchy::builtin(), grants: DefaultGrants::builtin() }
    }

    pub fn new(hierarchy: RoleHierarchy, grants: DefaultGrants) -> Result<Self> {
        let p = Policy { hierarchy, grants };
        p.validate()?;
        Ok(p)
    }

    pub fn from_config(config: PolicyConfig) -> Result<Self> {
        if config.default_grants.contains_key(&Role::TOP) {
            return Err(RbacError::Configuration(format!(
                "default grants for {} are derived from the catalog",
                Role::TOP
            )));
        }

        let mut parents = HashMap::new();
        let builtin = RoleHierarchy::builtin();
        for role in Role::ALL {
            let p = match config.hierarchy.get(&role) {
                Some(p) => p.clone(),
                None => builtin.direct_parents(role)?.to_vec(),
            };
            parents.insert(role, p);
        }

        let mut table = HashMap::new();
        let defaults = DefaultGrants::builtin();
        for role in Role::ALL {
            let set: PermissionSet = match config.default_grants.get(&role) {
                Some(ids) => ids.iter().cloned().collect(),
                None => defaults.default_permissions_for(role)?.clone(),
            };
            table.insert(role, set);
        }

        Policy::new(RoleHierarchy::new(parents)?, DefaultGrants::new(table)?)
    }

    /// Load and validate a YAML policy file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RbacError::Policy(format!("{}: {}", path.display(), e)))?;
        let config: PolicyConfig = serde_yaml::from_str(&text)
            .map_err(|e| RbacError::Policy(format!("{}: {}", path.display(), e)))?;
        let policy = Policy::from_config(config)?;
        info!(path = %path.display(), "loaded policy");
        Ok(policy)
    }

    /// Startup check: no missing roles, no cycles, defaults within the catalog.
    pub fn validate(&self) -> Result<()> {
        for role in Role::ALL {
            self.hierarchy.expand(role)?;
        }
        self.grants.validate()
    }

    pub fn hierarchy(&self) -> &RoleHierarchy {
        &self.hierarchy
    }

    pub fn grants(&self) -> &DefaultGrants {
        &self.grants
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::builtin()
    }
}

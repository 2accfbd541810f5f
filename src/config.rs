//! Process configuration read from the environment

use std::path::PathBuf;

use crate::constants::{ENV_DB_PATH, ENV_POLICY_PATH, ENV_PORT};
use crate::error::{RbacError, Result};
use crate::policy::Policy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    /// Optional YAML policy; built-in tables when unset.
    pub policy_path: Option<PathBuf>,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            db_path: PathBuf::from("./data/college-rbac.mdb"),
            policy_path: None,
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary key lookup so tests don't touch the process env.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> Result<Self> {
        let defaults = ServerConfig::default();
        let port = match get(ENV_PORT) {
            Some(p) => p
                .parse()
                .map_err(|_| RbacError::Configuration(format!("{} is not a port: {}", ENV_PORT, p)))?,
            None => defaults.port,
        };
        Ok(ServerConfig {
            db_path: get(ENV_DB_PATH).map(PathBuf::from).unwrap_or(defaults.db_path),
            policy_path: get(ENV_POLICY_PATH).filter(|s| !s.is_empty()).map(PathBuf::from),
            port,
        })
    }

    /// Load the configured policy, validated.
    pub fn policy(&self) -> Result<Policy> {
        match &self.policy_path {
            Some(path) => Policy::load(path),
            None => Ok(Policy::builtin()),
        }
    }
}

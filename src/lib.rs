//! college-rbac - Role-based access control for a college management system
//!
//! A closed set of roles with declared inheritance, a permission catalog,
//! default grants per role, and custom grants read from a store. The
//! [`AuthorizationGate`] is what request handlers call; it resolves a
//! principal's effective permissions on every check.

pub mod audit;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod gate;
pub mod grants;
pub mod hierarchy;
pub mod policy;
pub mod resolver;
pub mod role;
pub mod route;
pub mod store;

#[cfg(feature = "server")]
pub mod server;

pub use audit::{AuditAction, AuditEntry, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use catalog::{get_permission, list_permissions, Permission};
pub use config::ServerConfig;
pub use db::LmdbStore;
pub use error::{ErrorKind, RbacError, Result};
pub use gate::AuthorizationGate;
pub use grants::{DefaultGrants, PermissionSet};
pub use hierarchy::RoleHierarchy;
pub use policy::{Policy, PolicyConfig};
pub use resolver::PermissionResolver;
pub use role::Role;
pub use route::{dashboard_for, RouteDecision, RouteGuard};
pub use store::{AdminStore, CustomGrant, CustomGrantStore, MemoryStore, UserStore};

//! Audit sink for privileged actions
//!
//! Callers record an entry after an allowed action. Recording never feeds
//! back into an authorization decision.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{RbacError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Read,
    Login,
    Logout,
    Export,
    Import,
    Approve,
    Reject,
    Submit,
    Grade,
    MarkAttendance,
    Publish,
    Resolve,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Read => "read",
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::Export => "export",
            AuditAction::Import => "import",
            AuditAction::Approve => "approve",
            AuditAction::Reject => "reject",
            AuditAction::Submit => "submit",
            AuditAction::Grade => "grade",
            AuditAction::MarkAttendance => "mark_attendance",
            AuditAction::Publish => "publish",
            AuditAction::Resolve => "resolve",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub user_id: Option<String>,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub old_values: BTreeMap<String, String>,
    pub new_values: BTreeMap<String, String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl AuditEntry {
    pub fn new(action: AuditAction, entity_type: impl Into<String>) -> Self {
        AuditEntry {
            user_id: None,
            action,
            entity_type: entity_type.into(),
            entity_id: None,
            old_values: BTreeMap::new(),
            new_values: BTreeMap::new(),
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn by(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn entity(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn old(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.old_values.insert(key.into(), value.into());
        self
    }

    pub fn new_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.new_values.insert(key.into(), value.into());
        self
    }

    /// Attach the requesting client's address and user agent, when known.
    pub fn client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}

pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditEntry) -> Result<()>;
}

/// Record an entry, logging rather than returning a sink failure.
pub fn record_best_effort(sink: &dyn AuditSink, entry: &AuditEntry) {
    if let Err(e) = sink.record(entry) {
        warn!(error = %e, action = %entry.action, entity_type = %entry.entity_type, "failed to write audit record");
    }
}

/// Emits each entry as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: &AuditEntry) -> Result<()> {
        info!(
            target: "audit",
            user_id = entry.user_id.as_deref().unwrap_or("-"),
            action = %entry.action,
            entity_type = %entry.entity_type,
            entity_id = entry.entity_id.as_deref().unwrap_or("-"),
            old = ?entry.old_values,
            new = ?entry.new_values,
            ip = entry.ip_address.as_deref().unwrap_or("-"),
            user_agent = entry.user_agent.as_deref().unwrap_or("-"),
            "audit"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn entries(&self) -> Result<Vec<AuditEntry>> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .map_err(|_| RbacError::Store("audit sink lock poisoned".into()))
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, entry: &AuditEntry) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| RbacError::Store("audit sink lock poisoned".into()))?
            .push(entry.clone());
        Ok(())
    }
}

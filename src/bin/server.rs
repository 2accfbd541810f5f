//! college-rbac REST API Server
//!
//! Run with: cargo run --features server --bin college-rbac-server
//!
//! Endpoints:
//!   GET    /health                   - Liveness
//!   GET    /permissions              - Permission catalog
//!   GET    /permissions/:id          - Single permission
//!   GET    /roles/:role/permissions  - Effective permissions for a role
//!   GET    /me/permissions           - Effective permissions for the caller
//!   POST   /check                    - Check permissions (any/all)
//!   POST   /check-role               - Inheritance-aware role check
//!   GET    /grants                   - List custom grants (users:roles)
//!   POST   /grants                   - Add custom grant (users:roles)
//!   DELETE /grants                   - Remove custom grant (users:roles)

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use college_rbac::audit::TracingAuditSink;
use college_rbac::server::{router, AppState};
use college_rbac::{LmdbStore, RbacError, Result, ServerConfig};

async fn run() -> Result<()> {
    let config = ServerConfig::from_env()?;

    // Fail fast on an inconsistent policy before accepting any request
    let policy = Arc::new(config.policy()?);
    let store = Arc::new(LmdbStore::open(&config.db_path)?);

    let state = AppState::new(policy, store, Arc::new(TracingAuditSink));
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RbacError::Configuration(format!("cannot bind {}: {}", addr, e)))?;
    info!(%addr, db = %config.db_path.display(), "college-rbac server listening");
    axum::serve(listener, app)
        .await
        .map_err(college_rbac::error::store_err)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "server failed to start");
        std::process::exit(1);
    }
}

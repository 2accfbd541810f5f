//! HTTP surface over the authorization gate
//!
//! Principals arrive already authenticated in the `x-user-id` header. A
//! failed authorization is always answered with a plain 403; whether it was a
//! legitimate deny or a store/configuration failure is only visible in logs.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::audit::{record_best_effort, AuditAction, AuditEntry, AuditSink};
use crate::catalog::{self, Permission};
use crate::constants::{PRINCIPAL_HEADER, USERS_ROLES};
use crate::error::{ErrorKind, RbacError};
use crate::gate::AuthorizationGate;
use crate::policy::Policy;
use crate::resolver::PermissionResolver;
use crate::role::Role;
use crate::store::{AdminStore, CustomGrant};

pub type SharedStore = Arc<dyn AdminStore>;

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    gate: Arc<AuthorizationGate<SharedStore, SharedStore>>,
    store: SharedStore,
    audit: Arc<dyn AuditSink>,
}

impl AppState {
    pub fn new(policy: Arc<Policy>, store: SharedStore, audit: Arc<dyn AuditSink>) -> Self {
        let resolver = PermissionResolver::new(policy, store.clone(), store.clone());
        AppState { gate: Arc::new(AuthorizationGate::new(resolver)), store, audit }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    Any,
    #[default]
    All,
}

#[derive(Debug, Deserialize)]
pub struct CheckReq {
    pub permissions: Vec<String>,
    #[serde(default)]
    pub mode: CheckMode,
}

#[derive(Debug, Deserialize)]
pub struct CheckRoleReq {
    pub roles: Vec<Role>,
}

#[derive(Debug, Deserialize)]
pub struct GrantReq {
    pub role: Role,
    pub permission: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(msg.into()) }
    }
}

#[derive(Debug, Serialize)]
struct HealthRes {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PermissionsRes {
    pub role: Option<Role>,
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckRes {
    pub allowed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GrantRes {
    pub role: Role,
    pub permission: String,
    pub changed: bool,
}

// ============================================================================
// Errors
// ============================================================================

pub struct ApiError(RbacError);

impl From<RbacError> for ApiError {
    fn from(e: RbacError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self.0.kind() {
            ErrorKind::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ErrorKind::Denied => {
                warn!(error = %self.0, "request denied");
                (StatusCode::FORBIDDEN, "forbidden".to_string())
            }
            ErrorKind::Configuration | ErrorKind::Store => {
                error!(error = %self.0, kind = ?self.0.kind(), "authorization could not be determined");
                (StatusCode::FORBIDDEN, "forbidden".to_string())
            }
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, self.0.to_string()),
            ErrorKind::Invalid => (StatusCode::BAD_REQUEST, self.0.to_string()),
        };
        (status, Json(ApiResponse::<()>::err(msg))).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn principal(headers: &HeaderMap) -> Result<String, RbacError> {
    header_str(headers, PRINCIPAL_HEADER).ok_or(RbacError::Unauthenticated)
}

/// Client address (first `x-forwarded-for` hop, else `x-real-ip`) and user agent.
fn client_info(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip = header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
        .or_else(|| header_str(headers, "x-real-ip"));
    (ip, header_str(headers, "user-agent"))
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<HealthRes> {
    Json(HealthRes { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

async fn list_permissions() -> Json<ApiResponse<&'static [Permission]>> {
    Json(ApiResponse::ok(catalog::list_permissions()))
}

async fn get_permission(Path(id): Path<String>) -> ApiResult<&'static Permission> {
    Ok(Json(ApiResponse::ok(catalog::get_permission(&id)?)))
}

async fn role_permissions(State(state): State<AppState>, Path(role): Path<String>) -> ApiResult<PermissionsRes> {
    let role: Role = role.parse()?;
    let perms = state.gate.resolver().resolve_for_role(role)?;
    Ok(Json(ApiResponse::ok(PermissionsRes { role: Some(role), permissions: perms.into_iter().collect() })))
}

async fn my_permissions(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<PermissionsRes> {
    let user = principal(&headers)?;
    let resolver = state.gate.resolver();
    // single user-store read; role and permissions must describe the same record
    let role = resolver.role_of(&user)?;
    let perms = match role {
        Some(r) => resolver.resolve_for_role(r)?,
        None => Default::default(),
    };
    Ok(Json(ApiResponse::ok(PermissionsRes { role, permissions: perms.into_iter().collect() })))
}

async fn check(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<CheckReq>) -> ApiResult<CheckRes> {
    let user = principal(&headers)?;
    let perms: Vec<&str> = req.permissions.iter().map(String::as_str).collect();
    let allowed = match req.mode {
        CheckMode::Any => state.gate.has_any_permission(&user, &perms)?,
        CheckMode::All => state.gate.has_all_permissions(&user, &perms)?,
    };
    Ok(Json(ApiResponse::ok(CheckRes { allowed })))
}

async fn check_role(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<CheckRoleReq>) -> ApiResult<CheckRes> {
    let user = principal(&headers)?;
    let allowed = state.gate.has_role(&user, &req.roles)?;
    Ok(Json(ApiResponse::ok(CheckRes { allowed })))
}

async fn list_grants(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Vec<GrantRes>> {
    let user = principal(&headers)?;
    state.gate.require_permission(&user, USERS_ROLES)?;
    let grants = state
        .store
        .list_custom_grants()?
        .into_iter()
        .map(|CustomGrant { role, permission }| GrantRes { role, permission, changed: false })
        .collect();
    Ok(Json(ApiResponse::ok(grants)))
}

async fn add_grant(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<GrantReq>) -> ApiResult<GrantRes> {
    let user = principal(&headers)?;
    state.gate.require_permission(&user, USERS_ROLES)?;
    let changed = state.store.add_custom_grant(req.role, &req.permission)?;
    if changed {
        let (ip, user_agent) = client_info(&headers);
        let entry = AuditEntry::new(AuditAction::Create, "role_permission")
            .by(&user)
            .entity(req.role.as_str())
            .new_value("permission", &req.permission)
            .client(ip, user_agent);
        record_best_effort(state.audit.as_ref(), &entry);
    }
    Ok(Json(ApiResponse::ok(GrantRes { role: req.role, permission: req.permission, changed })))
}

async fn remove_grant(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<GrantReq>) -> ApiResult<GrantRes> {
    let user = principal(&headers)?;
    state.gate.require_permission(&user, USERS_ROLES)?;
    let changed = state.store.remove_custom_grant(req.role, &req.permission)?;
    if changed {
        let (ip, user_agent) = client_info(&headers);
        let entry = AuditEntry::new(AuditAction::Delete, "role_permission")
            .by(&user)
            .entity(req.role.as_str())
            .old("permission", &req.permission)
            .client(ip, user_agent);
        record_best_effort(state.audit.as_ref(), &entry);
    }
    Ok(Json(ApiResponse::ok(GrantRes { role: req.role, permission: req.permission, changed })))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/permissions", get(list_permissions))
        .route("/permissions/:id", get(get_permission))
        .route("/roles/:role/permissions", get(role_permissions))
        .route("/me/permissions", get(my_permissions))
        .route("/check", post(check))
        .route("/check-role", post(check_role))
        .route("/grants", get(list_grants).post(add_grant).delete(remove_grant))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

//! Error types for college-rbac

use thiserror::Error;

/// The main error type for RBAC operations.
///
/// A legitimate deny is never an error: resolution and gate checks return
/// `Ok(false)` / an empty set. Variants here mean "could not decide" or
/// "caller asked for something that does not exist".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RbacError {
    #[error("unauthenticated: no principal supplied")]
    Unauthenticated,

    #[error("permission denied: {0}")]
    Forbidden(String),

    #[error("permission not found: {0}")]
    NotFound(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("policy error: {0}")]
    Policy(String),
}

/// Coarse classification used by operators and the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthenticated,
    Denied,
    NotFound,
    Invalid,
    Configuration,
    Store,
}

impl RbacError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RbacError::Unauthenticated => ErrorKind::Unauthenticated,
            RbacError::Forbidden(_) => ErrorKind::Denied,
            RbacError::NotFound(_) => ErrorKind::NotFound,
            RbacError::InvalidRole(_) => ErrorKind::Invalid,
            RbacError::Configuration(_) | RbacError::Policy(_) => ErrorKind::Configuration,
            RbacError::Store(_) => ErrorKind::Store,
        }
    }

    /// True when the error means the decision could not be made at all.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration | ErrorKind::Store)
    }
}

/// Result type alias for RBAC operations
pub type Result<T> = std::result::Result<T, RbacError>;

/// Convert any storage-layer error to `RbacError::Store`
pub fn store_err<E: std::error::Error>(e: E) -> RbacError {
    RbacError::Store(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infrastructure_errors_are_distinguishable_from_denial() {
        assert!(RbacError::Store("io".into()).is_infrastructure());
        assert!(RbacError::Configuration("cycle".into()).is_infrastructure());
        assert!(!RbacError::Forbidden("users:write".into()).is_infrastructure());
        assert_eq!(RbacError::Forbidden("x".into()).kind(), ErrorKind::Denied);
    }

    #[test]
    fn store_err_keeps_message() {
        let e = store_err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        assert_eq!(e, RbacError::Store("disk gone".into()));
    }
}

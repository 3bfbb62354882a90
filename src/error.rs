//! Error taxonomy for the metadata store
//!
//! Every operation exposed by the facade fails with one of five error kinds.
//! Backend failures are normalized here and never re-exported with
//! backend-specific detail; callers only ever observe this taxonomy.

use thiserror::Error;

use crate::store::StoreError;

/// Error kinds surfaced by every metadata-store operation
#[derive(Debug, Error)]
pub enum MetastoreError {
    /// The target object (or its derived name) already exists
    #[error("already exists: {detail}")]
    AlreadyExists { detail: String },

    /// The request is invalid, including dangling references and malformed payloads
    #[error("bad request: {detail}")]
    BadRequest { detail: String },

    /// The requested object does not exist
    #[error("not found: {detail}")]
    NotFound { detail: String },

    /// The caller is not a known client
    #[error("unauthorized: {detail}")]
    Unauthorized { detail: String },

    /// Backend communication failures and kind mismatches
    #[error("internal error: {detail}")]
    Internal { detail: String },
}

impl MetastoreError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, MetastoreError::AlreadyExists { .. })
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, MetastoreError::BadRequest { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MetastoreError::NotFound { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, MetastoreError::Unauthorized { .. })
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, MetastoreError::Internal { .. })
    }

    /// Convert error kind to HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            MetastoreError::AlreadyExists { .. } => 409,
            MetastoreError::BadRequest { .. } => 400,
            MetastoreError::NotFound { .. } => 404,
            MetastoreError::Unauthorized { .. } => 401,
            MetastoreError::Internal { .. } => 500,
        }
    }
}

impl From<StoreError> for MetastoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists { name } => MetastoreError::AlreadyExists { detail: name },
            StoreError::NotFound { name } => MetastoreError::NotFound { detail: name },
            StoreError::Backend { message } => MetastoreError::Internal { detail: message },
        }
    }
}

//! Authorization layer: who is calling, what role they hold, and which rows they may touch.

pub mod gate;
pub mod scope;
pub mod session;
pub mod visibility;

use thiserror::Error;

use crate::database::DatabaseError;

pub use gate::{is_admin, is_psychiatrist, require_admin, require_psychiatrist};
pub use scope::{AuthorizedRepository, Capability};
pub use session::{Identity, RoleLookup, Session};
pub use visibility::{can_mutate_report, can_read_report};

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(DatabaseError),
}

impl AccessError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        AccessError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AccessError::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AccessError::Validation(message.into())
    }
}

impl From<DatabaseError> for AccessError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => AccessError::NotFound(msg),
            other => AccessError::Store(other),
        }
    }
}

pub type AccessResult<T> = Result<T, AccessError>;

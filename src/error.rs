// Error taxonomy shared by the repository, service and HTTP layers

use crate::validation::ValidationError;
use rusqlite::{ffi, ErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Malformed input, rejected before touching the store
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The resource addressed by the request does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A referenced company or bank does not exist
    #[error("{entity} {id} not found")]
    InvalidReference { entity: &'static str, id: i64 },

    /// Uniqueness collision, from a pre-check or from the store itself
    #[error("{0}")]
    ConstraintViolation(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("database connection unavailable")]
    ConnectionPoisoned,
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Which store constraint rejected a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Other,
}

pub fn constraint_kind(err: &rusqlite::Error) -> Option<ConstraintKind> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            Some(match e.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    ConstraintKind::Unique
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
                _ => ConstraintKind::Other,
            })
        }
        _ => None,
    }
}

pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    constraint_kind(err).is_some()
}

/// Converts a store constraint failure into a ConstraintViolation.
///
/// `duplicate` describes a uniqueness collision; foreign-key failures get a
/// generic missing-reference message. Every other error passes through as
/// Database.
pub fn map_constraint(err: rusqlite::Error, duplicate: &str) -> RegistryError {
    match constraint_kind(&err) {
        Some(ConstraintKind::Unique) => RegistryError::ConstraintViolation(duplicate.to_string()),
        Some(ConstraintKind::ForeignKey) => RegistryError::ConstraintViolation(
            "Referenced company or bank does not exist".to_string(),
        ),
        Some(ConstraintKind::Other) => RegistryError::ConstraintViolation(err.to_string()),
        None => RegistryError::Database(err),
    }
}

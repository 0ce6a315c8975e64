use std::fmt;

use rusqlite::{ffi, ErrorCode};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Which integrity rule rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// A required field was null or empty
    Required,
    /// A unique column or column pair already holds the value
    Unique,
    /// A foreign key did not resolve, or a delete would orphan rows
    ForeignKey,
    /// Any other CHECK rule (e.g. self-follow, length limits)
    Check,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::Required => "required",
            ConstraintKind::Unique => "unique",
            ConstraintKind::ForeignKey => "foreign_key",
            ConstraintKind::Check => "check",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("constraint violation ({kind}): {message}")]
    ConstraintViolation {
        kind: ConstraintKind,
        message: String,
    },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("stored row could not be decoded: {0}")]
    InvalidRow(String),

    #[error("failed to get database connection from pool: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("database error: {0}")]
    Sqlite(rusqlite::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl fmt::Display) -> Self {
        StoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            StoreError::ConstraintViolation { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        self.constraint_kind().is_some()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// CHECK constraints whose name ends with this suffix encode "required,
/// non-empty" and are reported as [`ConstraintKind::Required`].
pub(crate) const REQUIRED_CHECK_SUFFIX: &str = "_required";

/// Message SQLite attaches to every foreign key rejection. `ON DELETE
/// RESTRICT` is enforced through the trigger machinery, so a blocked delete
/// carries `SQLITE_CONSTRAINT_TRIGGER` rather than the foreign key code.
const FOREIGN_KEY_MESSAGE: &str = "FOREIGN KEY constraint failed";

fn classify_constraint(extended_code: i32, message: &str) -> ConstraintKind {
    match extended_code {
        ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintKind::Required,
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
            ConstraintKind::Unique
        }
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
        ffi::SQLITE_CONSTRAINT_TRIGGER if message.starts_with(FOREIGN_KEY_MESSAGE) => {
            ConstraintKind::ForeignKey
        }
        ffi::SQLITE_CONSTRAINT_CHECK if message.contains(REQUIRED_CHECK_SUFFIX) => {
            ConstraintKind::Required
        }
        _ => ConstraintKind::Check,
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                let message = message.unwrap_or_else(|| failure.to_string());
                StoreError::ConstraintViolation {
                    kind: classify_constraint(failure.extended_code, &message),
                    message,
                }
            }
            rusqlite::Error::FromSqlConversionFailure(idx, ty, cause) => {
                StoreError::InvalidRow(format!("column {} ({}): {}", idx, ty, cause))
            }
            other => StoreError::Sqlite(other),
        }
    }
}

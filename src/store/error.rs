use std::time::Duration;

const UNIQUE_VIOLATION: &str = "23505";
const DUPLICATE_TABLE: &str = "42P07";

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("Failed to create the subscriber table.")]
    Schema(#[source] sqlx::Error),
    #[error("{0} is already registered.")]
    DuplicateEmail(String),
    #[error("{0} is not registered.")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("The database is unreachable.")]
    TransientIo(#[source] sqlx::Error),
    #[error("{operation} did not complete within {limit:?}.")]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },
    #[error("Failed to decode a subscriber row: {0}")]
    Decode(String),
    #[error("Unexpected database error.")]
    Unexpected(#[source] sqlx::Error),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        if let Some(source) = std::error::Error::source(self) {
            write!(f, "\nCaused by:\n\t{}", source)?;
        }
        Ok(())
    }
}

impl StoreError {
    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::TransientIo(_) | StoreError::Timeout { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_connection_error(&err) {
            return StoreError::TransientIo(err);
        }

        match err {
            sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::Decode(_) => StoreError::Decode(err.to_string()),
            other => StoreError::Unexpected(other),
        }
    }
}

pub(crate) fn is_connection_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

/// Engine-independent classification of database errors, keyed on SQLSTATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    UniqueViolation,
    DuplicateTable,
    Other,
}

impl DbErrorKind {
    pub fn classify(err: &sqlx::Error) -> DbErrorKind {
        let code = match err {
            sqlx::Error::Database(db_err) => db_err.code(),
            _ => None,
        };

        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => DbErrorKind::UniqueViolation,
            Some(DUPLICATE_TABLE) => DbErrorKind::DuplicateTable,
            _ => DbErrorKind::Other,
        }
    }
}

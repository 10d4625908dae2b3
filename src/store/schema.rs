use sqlx::PgPool;

use crate::store::error::{is_connection_error, DbErrorKind, StoreError};

const CREATE_SUBSCRIBERS_TABLE: &str = r#"
    CREATE TABLE email_lists (
        id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
        email VARCHAR(255) UNIQUE NOT NULL,
        confirmed_at BIGINT NOT NULL DEFAULT 0,
        opt_out BOOLEAN NOT NULL DEFAULT FALSE
    )
"#;

/// Creates the subscriber table. A table that already exists counts as success.
#[tracing::instrument(name = "Ensure the subscriber table exists", skip(db_pool))]
pub async fn ensure_schema(db_pool: &PgPool) -> Result<(), StoreError> {
    match sqlx::query(CREATE_SUBSCRIBERS_TABLE).execute(db_pool).await {
        Ok(_) => {
            tracing::info!("Subscriber table created");
            Ok(())
        }
        Err(err) => match DbErrorKind::classify(&err) {
            kind if table_already_exists(kind) => {
                tracing::debug!("Subscriber table already exists");
                Ok(())
            }
            _ => {
                tracing::error!("Failed to create the subscriber table: {:?}", err);
                if is_connection_error(&err) {
                    Err(StoreError::TransientIo(err))
                } else {
                    Err(StoreError::Schema(err))
                }
            }
        },
    }
}

/// Two concurrent `CREATE TABLE` statements can collide on the `pg_type` entry of the new
/// table, which PostgreSQL reports as a unique violation instead of a duplicate table.
fn table_already_exists(kind: DbErrorKind) -> bool {
    matches!(
        kind,
        DbErrorKind::DuplicateTable | DbErrorKind::UniqueViolation
    )
}

//! PostgreSQL persistence for the subscriber registry.
//!
//! Every operation is a single parameterized statement against the shared pool and is bounded
//! by the store's query timeout. Listing is not transactional across pages: rows created or
//! opted out between two calls may shift the window.

pub mod error;
pub mod pagination;
pub mod row;
pub mod schema;

use sqlx::{PgPool, Row};
use std::future::Future;
use std::time::Duration;

use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_entry::SubscriberEntry;
use crate::domain::subscriber_upsert::SubscriberUpsert;

pub use error::{DbErrorKind, StoreError};
pub use pagination::Page;
pub use schema::ensure_schema;

use row::{confirmed_at_to_epoch, subscriber_from_row, UNCONFIRMED};

#[derive(Clone)]
pub struct SubscriberStore {
    db_pool: PgPool,
    query_timeout: Duration,
}

impl SubscriberStore {
    pub fn new(db_pool: PgPool, query_timeout: Duration) -> SubscriberStore {
        SubscriberStore {
            db_pool,
            query_timeout,
        }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        bounded(
            "ensure_schema",
            self.query_timeout,
            ensure_schema(&self.db_pool),
        )
        .await
    }

    /// Registers a new, unconfirmed subscriber and returns its id.
    ///
    /// Fails with [`StoreError::DuplicateEmail`] when the address is already known, even if it
    /// opted out. Re-activation goes through [`SubscriberStore::upsert`].
    #[tracing::instrument(
        name = "Insert a new subscriber into the database",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    pub async fn create(&self, email: &SubscriberEmail) -> Result<i64, StoreError> {
        bounded("create", self.query_timeout, async {
            let row = sqlx::query(
                r#"
                INSERT INTO email_lists (email, confirmed_at, opt_out)
                VALUES ($1, $2, FALSE)
                RETURNING id
                "#,
            )
            .bind(email.as_ref())
            .bind(UNCONFIRMED)
            .fetch_one(&self.db_pool)
            .await
            .map_err(|err| match DbErrorKind::classify(&err) {
                DbErrorKind::UniqueViolation => StoreError::DuplicateEmail(email.to_string()),
                _ => {
                    tracing::error!("Failed to execute query: {:?}", err);
                    StoreError::from(err)
                }
            })?;

            Ok(row.try_get::<i64, _>("id")?)
        })
        .await
    }

    #[tracing::instrument(
        name = "Fetch a subscriber by email",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    pub async fn get(&self, email: &SubscriberEmail) -> Result<SubscriberEntry, StoreError> {
        bounded("get", self.query_timeout, async {
            let row = sqlx::query(
                r#"
                SELECT id, email, confirmed_at, opt_out
                FROM email_lists
                WHERE email = $1
                "#,
            )
            .bind(email.as_ref())
            .fetch_optional(&self.db_pool)
            .await
            .map_err(log_query_error)?
            .ok_or_else(|| StoreError::NotFound(email.to_string()))?;

            subscriber_from_row(&row)
        })
        .await
    }

    /// Inserts the entry, or overwrites `confirmed_at` and `opt_out` of the row holding the
    /// same email. One statement, so concurrent callers cannot interleave.
    #[tracing::instrument(
        name = "Upsert a subscriber",
        skip(self, entry),
        fields(
            subscriber_email = %entry.email,
            opt_out = entry.opt_out
        )
    )]
    pub async fn upsert(&self, entry: &SubscriberUpsert) -> Result<(), StoreError> {
        bounded("upsert", self.query_timeout, async {
            sqlx::query(
                r#"
                INSERT INTO email_lists (email, confirmed_at, opt_out)
                VALUES ($1, $2, $3)
                ON CONFLICT (email) DO UPDATE
                SET confirmed_at = EXCLUDED.confirmed_at, opt_out = EXCLUDED.opt_out
                "#,
            )
            .bind(entry.email.as_ref())
            .bind(confirmed_at_to_epoch(entry.confirmed_at))
            .bind(entry.opt_out)
            .execute(&self.db_pool)
            .await
            .map_err(log_query_error)?;

            Ok(())
        })
        .await
    }

    /// Marks the subscriber as opted out. The row itself is kept.
    #[tracing::instrument(
        name = "Opt out a subscriber",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    pub async fn soft_delete(&self, email: &SubscriberEmail) -> Result<(), StoreError> {
        bounded("soft_delete", self.query_timeout, async {
            let result = sqlx::query(
                r#"
                UPDATE email_lists
                SET opt_out = TRUE
                WHERE email = $1
                "#,
            )
            .bind(email.as_ref())
            .execute(&self.db_pool)
            .await
            .map_err(log_query_error)?;

            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound(email.to_string()));
            }

            Ok(())
        })
        .await
    }

    /// Active subscribers in creation order, `count` at a time. `page` starts at 1.
    #[tracing::instrument(name = "List a page of active subscribers", skip(self))]
    pub async fn list_page(
        &self,
        page: i64,
        count: i64,
    ) -> Result<Vec<SubscriberEntry>, StoreError> {
        let page = Page::new(page, count)?;

        bounded("list_page", self.query_timeout, async {
            let rows = sqlx::query(
                r#"
                SELECT id, email, confirmed_at, opt_out
                FROM email_lists
                WHERE opt_out = FALSE
                ORDER BY id ASC
                LIMIT $1 OFFSET $2
                "#,
            )
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.db_pool)
            .await
            .map_err(log_query_error)?;

            rows.iter().map(subscriber_from_row).collect()
        })
        .await
    }
}

fn log_query_error(err: sqlx::Error) -> StoreError {
    tracing::error!("Failed to execute query: {:?}", err);
    StoreError::from(err)
}

/// Runs `future` to completion or fails with [`StoreError::Timeout`] once `limit` elapses.
/// The abandoned query is dropped with the future.
pub async fn bounded<T, F>(
    operation: &'static str,
    limit: Duration,
    future: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!("{} timed out after {:?}", operation, limit);
            Err(StoreError::Timeout { operation, limit })
        }
    }
}

//! Mapping between stored rows and [`SubscriberEntry`].
//!
//! The table keeps `confirmed_at` as unix epoch seconds with `0` meaning "not confirmed yet".
//! Only this module knows about that convention: everything above it works with
//! `Option<DateTime<Utc>>`, where `None` is the unconfirmed state.

use chrono::{DateTime, TimeZone, Utc};
use sqlx::{postgres::PgRow, Row};

use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_entry::SubscriberEntry;
use crate::store::error::StoreError;

pub(crate) const UNCONFIRMED: i64 = 0;

/// Columns of `email_lists` exactly as they are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberRow {
    pub id: i64,
    pub email: String,
    pub confirmed_at: i64,
    pub opt_out: bool,
}

impl SubscriberRow {
    pub fn from_pg_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(SubscriberRow {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            confirmed_at: row.try_get("confirmed_at")?,
            opt_out: row.try_get("opt_out")?,
        })
    }
}

impl TryFrom<SubscriberRow> for SubscriberEntry {
    type Error = StoreError;

    fn try_from(row: SubscriberRow) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::from_stored(row.email).map_err(StoreError::Decode)?;
        let confirmed_at = confirmed_at_from_epoch(row.confirmed_at)?;

        Ok(SubscriberEntry {
            id: row.id,
            email,
            confirmed_at,
            opt_out: row.opt_out,
        })
    }
}

/// Decodes a full row straight into an entry, used by every read query.
pub fn subscriber_from_row(row: &PgRow) -> Result<SubscriberEntry, StoreError> {
    SubscriberRow::from_pg_row(row)?.try_into()
}

pub fn confirmed_at_from_epoch(seconds: i64) -> Result<Option<DateTime<Utc>>, StoreError> {
    if seconds == UNCONFIRMED {
        return Ok(None);
    }

    Utc.timestamp_opt(seconds, 0)
        .single()
        .map(Some)
        .ok_or_else(|| StoreError::Decode(format!("{} is not a valid epoch timestamp", seconds)))
}

/// Sub-second precision is dropped. A confirmation exactly at the epoch reads back as `None`.
pub fn confirmed_at_to_epoch(confirmed_at: Option<DateTime<Utc>>) -> i64 {
    confirmed_at.map_or(UNCONFIRMED, |at| at.timestamp())
}

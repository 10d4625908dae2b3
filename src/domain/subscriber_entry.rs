use chrono::{DateTime, Utc};

use crate::domain::subscriber_email::SubscriberEmail;

/// A single record of the registry.
///
/// `confirmed_at` is `None` until the subscriber confirms. Opted-out entries are kept
/// around and only hidden from listings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SubscriberEntry {
    pub id: i64,
    pub email: SubscriberEmail,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub opt_out: bool,
}

impl SubscriberEntry {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }
}

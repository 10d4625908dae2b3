use actix_web::web;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::subscriber_email::SubscriberEmail;

/// Desired state for the entry identified by `email`, applied with an insert-or-update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberUpsert {
    pub email: SubscriberEmail,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub opt_out: bool,
}

#[derive(Deserialize)]
pub struct SubscriberUpsertBody {
    pub email: String,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub opt_out: bool,
}

impl TryFrom<web::Json<SubscriberUpsertBody>> for SubscriberUpsert {
    type Error = String;

    fn try_from(body: web::Json<SubscriberUpsertBody>) -> Result<Self, Self::Error> {
        let body = body.into_inner();
        let email = SubscriberEmail::parse(body.email)?;

        Ok(SubscriberUpsert {
            email,
            confirmed_at: body.confirmed_at,
            opt_out: body.opt_out,
        })
    }
}

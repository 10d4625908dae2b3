use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use serde::Deserialize;

use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_upsert::{SubscriberUpsert, SubscriberUpsertBody};
use crate::store::{StoreError, SubscriberStore};

#[derive(Deserialize, Debug)]
pub struct EmailBody {
    pub email: String,
}

#[derive(Deserialize, Debug)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Deserialize, Debug)]
pub struct BatchQuery {
    pub page: i64,
    pub count: i64,
}

#[derive(serde::Serialize)]
struct CreatedSubscriber {
    id: i64,
}

#[tracing::instrument(
    name = "Creating a new subscriber handler",
    skip(body, store),
    fields(subscriber_email = %body.email)
)]
pub async fn create_subscriber(
    body: web::Json<EmailBody>,
    store: web::Data<SubscriberStore>,
) -> Result<HttpResponse, SubscriberApiError> {
    let email = SubscriberEmail::parse(body.into_inner().email)
        .map_err(SubscriberApiError::InvalidInput)?;
    let id = store.create(&email).await?;

    Ok(HttpResponse::Created().json(CreatedSubscriber { id }))
}

#[tracing::instrument(
    name = "Fetching a subscriber handler",
    skip(query, store),
    fields(subscriber_email = %query.email)
)]
pub async fn get_subscriber(
    query: web::Query<EmailQuery>,
    store: web::Data<SubscriberStore>,
) -> Result<HttpResponse, SubscriberApiError> {
    let email = SubscriberEmail::parse(query.into_inner().email)
        .map_err(SubscriberApiError::InvalidInput)?;
    let entry = store.get(&email).await?;

    Ok(HttpResponse::Ok().json(entry))
}

/// Applies the body with an upsert and answers with the stored entry.
#[tracing::instrument(
    name = "Updating a subscriber handler",
    skip(body, store),
    fields(subscriber_email = %body.email)
)]
pub async fn update_subscriber(
    body: web::Json<SubscriberUpsertBody>,
    store: web::Data<SubscriberStore>,
) -> Result<HttpResponse, SubscriberApiError> {
    let upsert: SubscriberUpsert = body.try_into().map_err(SubscriberApiError::InvalidInput)?;

    store.upsert(&upsert).await?;
    let entry = store.get(&upsert.email).await?;

    Ok(HttpResponse::Ok().json(entry))
}

#[tracing::instrument(
    name = "Opting out a subscriber handler",
    skip(body, store),
    fields(subscriber_email = %body.email)
)]
pub async fn delete_subscriber(
    body: web::Json<EmailBody>,
    store: web::Data<SubscriberStore>,
) -> Result<HttpResponse, SubscriberApiError> {
    let email = SubscriberEmail::parse(body.into_inner().email)
        .map_err(SubscriberApiError::InvalidInput)?;
    store.soft_delete(&email).await?;

    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(name = "Listing a page of subscribers handler", skip(store))]
pub async fn get_subscriber_batch(
    query: web::Query<BatchQuery>,
    store: web::Data<SubscriberStore>,
) -> Result<HttpResponse, SubscriberApiError> {
    let entries = store.list_page(query.page, query.count).await?;

    Ok(HttpResponse::Ok().json(entries))
}

/// Rejected JSON bodies answer with the same `{"error": ..}` shape as every other failure.
pub fn json_error_handler(err: JsonPayloadError, _: &HttpRequest) -> actix_web::Error {
    SubscriberApiError::InvalidInput(err.to_string()).into()
}

pub fn query_error_handler(err: QueryPayloadError, _: &HttpRequest) -> actix_web::Error {
    SubscriberApiError::InvalidInput(err.to_string()).into()
}

#[derive(thiserror::Error)]
pub enum SubscriberApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl std::fmt::Debug for SubscriberApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriberApiError::InvalidInput(message) => write!(f, "Invalid input: {}", message),
            SubscriberApiError::Store(err) => write!(f, "Caused by:\n\t({:?})", err),
        }
    }
}

impl ResponseError for SubscriberApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscriberApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SubscriberApiError::Store(err) => match err {
                StoreError::Validation(_) => StatusCode::BAD_REQUEST,
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::DuplicateEmail(_) => StatusCode::CONFLICT,
                err if err.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Subscriber request failed: {:?}", self);
        } else {
            tracing::warn!("Subscriber request rejected: {:?}", self);
        }

        let message = if status.is_server_error() {
            String::from("The request could not be completed.")
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(serde_json::json!({ "error": message }))
    }
}

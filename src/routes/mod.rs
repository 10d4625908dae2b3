mod health_check;
mod subscribers;

pub use health_check::health_check;
pub use subscribers::{
    create_subscriber, delete_subscriber, get_subscriber, get_subscriber_batch,
    json_error_handler, query_error_handler, update_subscriber, SubscriberApiError,
};

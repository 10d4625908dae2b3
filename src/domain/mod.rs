pub mod subscriber_email;
pub mod subscriber_entry;
pub mod subscriber_upsert;

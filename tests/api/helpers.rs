use reqwest::Response;
use serde_json::Value;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

use mailing_list::{
    config::{get_configuration, DatabaseSettings},
    domain::subscriber_email::SubscriberEmail,
    startup::{get_connection_db_pool, get_store, Application},
    store::SubscriberStore,
};

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub store: SubscriberStore,
    pub http_client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        let mut config = get_configuration().expect("Missing configuration file.");
        let db_test_name = format!("db_{}", Uuid::new_v4().to_string().replace('-', "_"));

        // We are using port 0 as way to define a different port per each test. Port 0 is a special case that operating systems
        // take into account: when port is 0, the OS will search for the first available port
        config.set_app_port(0);

        let db_pool = configure_db(&mut config.database, db_test_name).await;
        let store = get_store(&config.database, db_pool.clone());

        let application = Application::build(config)
            .await
            .expect("Failed to build application.");

        let address = format!("http://127.0.0.1:{}", application.get_port());

        tokio::spawn(application.run_until_stop());

        TestApp {
            address,
            db_pool,
            store,
            http_client: reqwest::Client::new(),
        }
    }

    pub async fn post_create(&self, body: &Value) -> Response {
        self.http_client
            .post(&format!("{}/email/create", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_entry(&self, email: &str) -> Response {
        self.http_client
            .get(&format!("{}/email/get", self.address))
            .query(&[("email", email)])
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn put_update(&self, body: &Value) -> Response {
        self.http_client
            .put(&format!("{}/email/update", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_delete(&self, body: &Value) -> Response {
        self.http_client
            .post(&format!("{}/email/delete", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_batch(&self, page: &str, count: &str) -> Response {
        self.http_client
            .get(&format!("{}/email/get_batch", self.address))
            .query(&[("page", page), ("count", count)])
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub fn email(address: &str) -> SubscriberEmail {
    SubscriberEmail::parse(address.to_string()).expect("Test email is not valid.")
}

async fn configure_db(db_config: &mut DatabaseSettings, db_test_name: String) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect_with(&db_config.get_server_options())
        .await
        .expect("Failed to connect to Postgres.");

    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, db_test_name))
        .await
        .expect("Failed to create database.");

    connection
        .close()
        .await
        .expect("Failed to close connection.");

    db_config.set_name(db_test_name.clone());

    println!("Database {} created!!", db_test_name);

    get_connection_db_pool(db_config)
}

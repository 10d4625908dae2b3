use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Pool, Postgres};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::config::{DatabaseSettings, Settings};
use crate::routes::{
    create_subscriber, delete_subscriber, get_subscriber, get_subscriber_batch, health_check,
    json_error_handler, query_error_handler, update_subscriber,
};
use crate::store::{StoreError, SubscriberStore};

#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error("Failed to prepare the subscriber table: {0:?}")]
    Schema(#[from] StoreError),
    #[error("Failed to start the HTTP server.")]
    Io(#[from] std::io::Error),
}

pub struct Application {
    pub port: u16,
    pub server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, StartupError> {
        let db_pool = get_connection_db_pool(&config.database);
        let store = get_store(&config.database, db_pool);

        store.ensure_schema().await?;

        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();
        let server = run(listener, store)?;

        tracing::info!("Server listening on {}:{}", config.application.get_host(), port);

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(listener: TcpListener, store: SubscriberStore) -> Result<Server, std::io::Error> {
    let store = web::Data::new(store);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/email")
                    .route("/create", web::post().to(create_subscriber))
                    .route("/get", web::get().to(get_subscriber))
                    .route("/get_batch", web::get().to(get_subscriber_batch))
                    .route("/update", web::put().to(update_subscriber))
                    .route("/delete", web::post().to(delete_subscriber)),
            )
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> Pool<Postgres> {
    PgPoolOptions::new()
        .acquire_timeout(config.get_acquire_timeout())
        .connect_lazy_with(config.get_db_options())
}

pub fn get_store(config: &DatabaseSettings, db_pool: PgPool) -> SubscriberStore {
    SubscriberStore::new(db_pool, config.get_query_timeout())
}

use config::{Config, ConfigError, File};
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::{
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions,
};
use std::time::Duration;

const DEFAULT_QUERY_TIMEOUT_MILLISECONDS: u64 = 5000;
const DEFAULT_ACQUIRE_TIMEOUT_MILLISECONDS: u64 = 2000;

#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    // secrecy protects secret information and prevents them to be exposed (eg: via logs)
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub name: String,
    pub require_ssl: bool,
    #[serde(
        default = "default_query_timeout",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub query_timeout_milliseconds: u64,
    #[serde(
        default = "default_acquire_timeout",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub acquire_timeout_milliseconds: u64,
}

fn default_query_timeout() -> u64 {
    DEFAULT_QUERY_TIMEOUT_MILLISECONDS
}

fn default_acquire_timeout() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT_MILLISECONDS
}

impl Settings {
    pub fn get_address(&self) -> String {
        format!(
            "{}:{}",
            self.application.get_host(),
            self.application.get_port()
        )
    }

    pub fn get_db_options(&self) -> PgConnectOptions {
        self.database.get_db_options()
    }

    pub fn set_app_port(&mut self, port: u16) {
        self.application.port = port;
    }
}

impl DatabaseSettings {
    pub fn get_db_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        let mut db_options = PgConnectOptions::new()
            .host(&self.host)
            .password(self.password.expose_secret())
            .username(&self.username)
            .port(self.port)
            .database(&self.name)
            .ssl_mode(ssl_mode);

        db_options.log_statements(tracing::log::LevelFilter::Trace);

        db_options
    }

    /// Connection options without a database, used to create or drop databases.
    pub fn get_server_options(&self) -> PgConnectOptions {
        self.get_db_options().database("postgres")
    }

    pub fn get_query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_milliseconds)
    }

    pub fn get_acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_milliseconds)
    }

    pub fn set_name(&mut self, new_db_name: String) {
        self.name = new_db_name
    }
}

impl ApplicationSettings {
    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_host(&self) -> String {
        self.host.clone()
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let root_path = std::env::current_dir().map_err(|err| {
        ConfigError::Message(format!("Failed to determine the current directory: {}", err))
    })?;
    let config_directory = root_path.join("config");
    // Uses development environment by default
    let enviroment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "development".into())
        .try_into()
        .map_err(ConfigError::Message)?;
    let config_base_filepath = config_directory.join("base");
    let config_env_filepath = config_directory.join(enviroment.as_str());

    // It merges the base configuration file with the one from the specific environment (development or production)
    let settings = Config::builder()
        .add_source(File::from(config_base_filepath).required(true))
        .add_source(File::from(config_env_filepath).required(true))
        // Merge settings from environment variables with a prefix of APP and "__" separator
        // E.g APP_DATABASE__HOST would set Settings.database.host
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?;

    tracing::info!("Application environment = {:?}", enviroment);

    // Try to convert the value from the configuration file into a Settings type
    settings.try_deserialize()
}

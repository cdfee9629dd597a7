use rocket::figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub ingest: IngestConfig,
}

/// Connection settings for the Postgres instance holding `device_interactions` and `users`.
///
/// When `url` is set it wins over the individual parts.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IngestConfig {
    /// Write every device row of a submission inside a single transaction.
    /// When disabled, rows are committed one by one and a failure part-way
    /// through leaves the earlier rows in place.
    pub transactional_writes: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "127.0.0.1".to_string(),
            port: 5432,
            username: "postgres".to_string(),
            password: String::new(),
            database: "tech_test".to_string(),
            max_connections: 16,
            min_connections: 0,
            acquire_timeout: 5,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            address: "0.0.0.0".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { transactional_writes: true }
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = &self.url {
            return url.parse();
        }

        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .database(&self.database);

        if self.password.is_empty() {
            Ok(options)
        } else {
            Ok(options.password(&self.password))
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. Intake.toml (optional)
    /// 3. Environment variables prefixed with INTAKE_, nested with `__`
    ///    (e.g. INTAKE_DATABASE__MAX_CONNECTIONS)
    /// 4. DATABASE_URL
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("Intake.toml").nested())
            .merge(Env::prefixed("INTAKE_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_point_at_local_postgres() {
        let config = Config::default();
        assert_eq!(config.database.host, "127.0.0.1");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.database, "tech_test");
        assert_eq!(config.server.port, 8080);
        assert!(config.ingest.transactional_writes);
    }

    #[test]
    fn env_overrides_nested_keys() {
        Jail::expect_with(|jail| {
            jail.set_env("INTAKE_DATABASE__MAX_CONNECTIONS", "3");
            jail.set_env("INTAKE_INGEST__TRANSACTIONAL_WRITES", "false");
            jail.set_env("INTAKE_SERVER__PORT", "9090");

            let config = Config::load()?;
            assert_eq!(config.database.max_connections, 3);
            assert!(!config.ingest.transactional_writes);
            assert_eq!(config.server.port, 9090);
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_layered_under_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "Intake.toml",
                r#"
                [default.database]
                host = "db.internal"
                database = "iot"

                [default.logging]
                json_format = true
                "#,
            )?;
            jail.set_env("INTAKE_DATABASE__DATABASE", "iot_override");

            let config = Config::load()?;
            assert_eq!(config.database.host, "db.internal");
            assert_eq!(config.database.database, "iot_override");
            assert!(config.logging.json_format);
            Ok(())
        });
    }

    #[test]
    fn database_url_env_wins() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://iot:secret@db:5433/iot");

            let config = Config::load()?;
            assert_eq!(config.database.url.as_deref(), Some("postgres://iot:secret@db:5433/iot"));

            let options = config.database.connect_options().expect("valid url");
            assert_eq!(options.get_host(), "db");
            assert_eq!(options.get_port(), 5433);
            assert_eq!(options.get_database(), Some("iot"));
            Ok(())
        });
    }

    #[test]
    fn connect_options_from_parts() {
        let config = DatabaseConfig {
            host: "pg".to_string(),
            port: 6543,
            username: "writer".to_string(),
            password: "pw".to_string(),
            database: "telemetry".to_string(),
            ..DatabaseConfig::default()
        };

        let options = config.connect_options().expect("options");
        assert_eq!(options.get_host(), "pg");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "writer");
        assert_eq!(options.get_database(), Some("telemetry"));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let config = DatabaseConfig {
            url: Some("not a url".to_string()),
            ..DatabaseConfig::default()
        };
        assert!(config.connect_options().is_err());
    }
}

//! Configuration for the rewards API server.
//!
//! All configuration is loaded from environment variables. The server
//! needs its bind address and the `PostgreSQL` connection settings.

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),

    /// An environment variable holds an unparseable value.
    #[error("invalid value for {name}: {message}")]
    InvalidVar {
        /// The variable name.
        name: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

/// Complete server configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address to bind to.
    pub host: String,
    /// TCP port to listen on.
    pub port: u16,
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// Maximum connections in the database pool.
    pub db_max_connections: u32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `DATABASE_URL` -- `PostgreSQL` connection string
    ///
    /// Optional variables:
    /// - `PRAXIS_HTTP_HOST` -- bind address (default `0.0.0.0`)
    /// - `PRAXIS_HTTP_PORT` -- listen port (default `8080`)
    /// - `PRAXIS_DB_MAX_CONNECTIONS` -- pool size (default `10`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;

        let host =
            std::env::var("PRAXIS_HTTP_HOST").unwrap_or_else(|_| String::from("0.0.0.0"));

        let port: u16 = std::env::var("PRAXIS_HTTP_PORT")
            .unwrap_or_else(|_| String::from("8080"))
            .parse()
            .map_err(|e| ConfigError::InvalidVar {
                name: "PRAXIS_HTTP_PORT",
                message: format!("{e}"),
            })?;

        let db_max_connections: u32 = std::env::var("PRAXIS_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| String::from("10"))
            .parse()
            .map_err(|e| ConfigError::InvalidVar {
                name: "PRAXIS_DB_MAX_CONNECTIONS",
                message: format!("{e}"),
            })?;

        Ok(Self {
            host,
            port,
            database_url,
            db_max_connections,
        })
    }
}

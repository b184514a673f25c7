/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `API_PRODUCTION`: Production mode flag (default: false); defaults logs to JSON
///   and refuses the `memory` backend
/// - `STORE_BACKEND`: `postgres` (default) or `memory`
/// - `DATABASE_URL`: PostgreSQL connection string (required for `postgres`)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `RUST_LOG`: Log filter (default: taskboard_api=debug,taskboard_shared=debug,tower_http=debug)
/// - `LOG_FORMAT`: `json` for JSON log lines, anything else for text
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::{env, str::FromStr};
use taskboard_shared::db::pool;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Which document store backs the API
    pub store: StoreBackend,

    /// Database configuration (used by the `postgres` backend)
    pub database: DatabaseConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any origin
    pub cors_origins: Vec<String>,

    /// Production mode
    pub production: bool,
}

/// Document store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSONB documents in PostgreSQL
    Postgres,

    /// Process-local store, lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("Unknown STORE_BACKEND {:?} (expected postgres or memory)", other),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` is missing while the `postgres` backend is selected
    /// - A variable has an unparseable value
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = lookup("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let production = lookup("API_PRODUCTION")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let store = lookup("STORE_BACKEND")
            .map(|v| v.parse::<StoreBackend>())
            .transpose()?
            .unwrap_or(StoreBackend::Postgres);

        let database_url = match (lookup("DATABASE_URL"), store) {
            (Some(url), _) => url,
            (None, StoreBackend::Memory) => String::new(),
            (None, StoreBackend::Postgres) => {
                anyhow::bail!("DATABASE_URL environment variable is required")
            }
        };

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            store,
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Connection pool settings for the shared database layer
    pub fn pool_config(&self) -> pool::DatabaseConfig {
        pool::DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            ..Default::default()
        }
    }
}

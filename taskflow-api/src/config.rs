/// Configuration management for the API server
///
/// Loaded from environment variables; a `.env` file is honoured in
/// development.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any
///   (default: `http://localhost:5173,http://localhost:3000`)
/// - `STORE`: `postgres` (default) or `memory`
/// - `DATABASE_URL`: PostgreSQL connection string (required for `postgres`)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Token signing secret, at least 32 characters (required)
/// - `JWT_TTL_SECONDS`: Token lifetime, at most 30 days (default: 86400)
/// - `RUST_LOG`: Log filter
/// - `LOG_FORMAT`: `json` for JSON log lines
///
/// # Example
///
/// ```no_run
/// use taskflow_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::{env, str::FromStr};

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";
const DEFAULT_TTL_SECONDS: i64 = 86400;
const MAX_TTL_SECONDS: i64 = 30 * 86400;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Persistence backend
    pub store: StoreBackend,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Persistence backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("STORE must be 'postgres' or 'memory', got '{}'", other),
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

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Token lifetime in seconds
    pub ttl_seconds: i64,
}

fn parse_ttl(raw: Option<&str>) -> anyhow::Result<i64> {
    let ttl_seconds = match raw {
        Some(raw) => raw.trim().parse::<i64>()?,
        None => DEFAULT_TTL_SECONDS,
    };

    if ttl_seconds <= 0 {
        anyhow::bail!("JWT_TTL_SECONDS must be positive");
    }
    if ttl_seconds > MAX_TTL_SECONDS {
        anyhow::bail!("JWT_TTL_SECONDS must be at most {}", MAX_TTL_SECONDS);
    }

    Ok(ttl_seconds)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 characters
    /// - `DATABASE_URL` is missing while the postgres store is selected
    /// - `JWT_TTL_SECONDS` is not within 1 second to 30 days
    /// - A numeric variable does not parse
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;
        let cors_origins = parse_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
        );

        let store = env::var("STORE")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse::<StoreBackend>()?;

        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) if store == StoreBackend::Memory => String::new(),
            Err(_) => anyhow::bail!("DATABASE_URL environment variable is required"),
        };

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let ttl_seconds = parse_ttl(env::var("JWT_TTL_SECONDS").ok().as_deref())?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            store,
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                ttl_seconds,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin is allowed
    pub fn cors_permissive(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
            },
            store: StoreBackend::Memory,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                ttl_seconds: DEFAULT_TTL_SECONDS,
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test", "http://b.test"]
        );
        assert!(!config().cors_permissive());

        let mut permissive = config();
        permissive.api.cors_origins = parse_origins("*");
        assert!(permissive.cors_permissive());
    }

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!("Postgres".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_ttl_bounds() {
        assert_eq!(parse_ttl(None).unwrap(), 86400);
        assert_eq!(parse_ttl(Some("3600")).unwrap(), 3600);
        assert_eq!(parse_ttl(Some("2592000")).unwrap(), MAX_TTL_SECONDS);

        assert!(parse_ttl(Some("0")).is_err());
        assert!(parse_ttl(Some("-5")).is_err());
        assert!(parse_ttl(Some("2592001")).is_err());
        assert!(parse_ttl(Some("9223372036854775807")).is_err());
        assert!(parse_ttl(Some("a day")).is_err());
    }
}

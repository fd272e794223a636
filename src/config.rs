// src/config.rs

use std::{env, fmt, net::SocketAddr, str::FromStr, time::Duration};

use dotenvy::dotenv;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: &str = "5";
const DEFAULT_ATTEMPT_TTL_SECS: &str = "3600";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When absent the in-memory store is used.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// HS256 secret shared with the identity provider.
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
    /// Idle time after which an unsubmitted attempt is dropped.
    pub attempt_ttl: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has invalid value '{}'", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = parse_var("BIND_ADDR", env::var("BIND_ADDR").ok(), DEFAULT_BIND_ADDR)?;

        let database_max_connections = parse_var(
            "DATABASE_MAX_CONNECTIONS",
            env::var("DATABASE_MAX_CONNECTIONS").ok(),
            DEFAULT_MAX_CONNECTIONS,
        )?;

        let attempt_ttl = Duration::from_secs(parse_var(
            "ATTEMPT_TTL_SECS",
            env::var("ATTEMPT_TTL_SECS").ok(),
            DEFAULT_ATTEMPT_TTL_SECS,
        )?);

        let cors_origins = split_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
        );

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            rust_log,
            bind_addr,
            cors_origins,
            attempt_ttl,
        })
    }
}

fn parse_var<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: &str,
) -> Result<T, ConfigError> {
    let value = raw.unwrap_or_else(|| default.to_string());
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

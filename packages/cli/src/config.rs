// ABOUTME: Server configuration read from environment variables
// ABOUTME: Every setting has a default; malformed values fail startup

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::num::ParseIntError;

use thiserror::Error;
use tracing::warn;

pub const DEFAULT_SECRET_KEY: &str = "change-this-secret";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid host address: {0}")]
    InvalidHost(String),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub cors_origins: Vec<String>,
    pub seed_default_users: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host_str = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let host = host_str
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidHost(host_str.clone()))?;

        let port_str = env::var("PORT").unwrap_or_else(|_| "8001".to_string());
        let port = port_str.parse::<u16>()?;
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:plankit.db".to_string());

        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 10u32)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                name: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        let secret_key = env::var("SECRET_KEY").unwrap_or_else(|_| DEFAULT_SECRET_KEY.to_string());
        if secret_key == DEFAULT_SECRET_KEY {
            warn!("SECRET_KEY is not set; using the built-in development secret");
        }

        let access_token_expire_minutes = parse_var("ACCESS_TOKEN_EXPIRE_MINUTES", 1440i64)?;
        if access_token_expire_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: access_token_expire_minutes.to_string(),
            });
        }

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let seed_default_users = parse_var("SEED_DEFAULT_USERS", true)?;

        Ok(Config {
            host,
            port,
            database_url,
            max_connections,
            secret_key,
            access_token_expire_minutes,
            cors_origins,
            seed_default_users,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access_token_expire_minutes)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}

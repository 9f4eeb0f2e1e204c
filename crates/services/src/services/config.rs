//! Process configuration read from the environment (and `.env` via the binary).

use std::{fmt::Display, str::FromStr};

use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, warn};
use utils::password::DEFAULT_COST;

const DEV_JWT_SECRET: &str = "rakshak-development-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be set")]
    Missing { key: &'static str },
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Admin account created at startup when it does not exist yet.
#[derive(Debug)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub full_name: String,
}

#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: SecretString,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub admin: Option<AdminBootstrap>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => SecretString::from(secret),
            None if cfg!(debug_assertions) => {
                warn!("JWT_SECRET not set, using the development secret");
                SecretString::from(DEV_JWT_SECRET.to_string())
            }
            None => return Err(ConfigError::Missing { key: "JWT_SECRET" }),
        };

        let bcrypt_cost: u32 = parse_or(&lookup, "BCRYPT_COST", DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                reason: format!("{bcrypt_cost} is outside 4..=31"),
            });
        }

        let token_ttl_hours: i64 = parse_or(&lookup, "TOKEN_TTL_HOURS", 24)?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_HOURS",
                reason: "must be positive".to_string(),
            });
        }

        let db_max_connections: u32 = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?;
        if db_max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 3000)?,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://rakshak.db?mode=rwc".to_string()),
            db_max_connections,
            jwt_secret,
            token_ttl_hours,
            bcrypt_cost,
            admin: admin_bootstrap(&lookup),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn admin_bootstrap<F>(lookup: &F) -> Option<AdminBootstrap>
where
    F: Fn(&str) -> Option<String>,
{
    let username = lookup("ADMIN_USERNAME").filter(|s| !s.is_empty());
    let email = lookup("ADMIN_EMAIL").filter(|s| !s.is_empty());
    let password = lookup("ADMIN_PASSWORD").filter(|s| !s.is_empty());

    match (username, email, password) {
        (Some(username), Some(email), Some(password)) => Some(AdminBootstrap {
            full_name: lookup("ADMIN_FULL_NAME").unwrap_or_else(|| "Administrator".to_string()),
            username,
            email,
            password: SecretString::from(password),
        }),
        (None, None, None) => None,
        _ => {
            warn!("ADMIN_USERNAME, ADMIN_EMAIL and ADMIN_PASSWORD must all be set; skipping admin bootstrap");
            None
        }
    }
}

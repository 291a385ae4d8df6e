//! Process settings from the environment.

use crate::error::ConfigError;
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/ecommerce_api";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Settings {
    /// `DATABASE_URL`
    pub database_url: String,
    /// `BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `DB_MAX_CONNECTIONS`
    pub max_connections: u32,
    /// `DB_SCHEMA`: PostgreSQL schema holding the tables.
    pub db_schema: String,
    /// `CREATE_SCHEMA`: create missing tables at startup.
    pub create_schema: bool,
    /// `REQUEST_BODY_LIMIT` in bytes.
    pub body_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: DEFAULT_DATABASE_URL.into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            db_schema: DEFAULT_SCHEMA.into(),
            create_schema: true,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let bind_addr = parse(get("BIND_ADDR"), "BIND_ADDR", DEFAULT_BIND_ADDR)?;
        let max_connections = parse(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", "5")?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                value: "0".into(),
            });
        }
        let db_schema = get("DB_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.into());
        let create_schema = match get("CREATE_SCHEMA") {
            None => true,
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid {
                key: "CREATE_SCHEMA",
                value: v,
            })?,
        };
        let body_limit = parse(get("REQUEST_BODY_LIMIT"), "REQUEST_BODY_LIMIT", "1048576")?;

        Ok(Settings {
            database_url,
            bind_addr,
            max_connections,
            db_schema,
            create_schema,
            body_limit,
        })
    }
}

fn parse<T: std::str::FromStr>(
    value: Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError> {
    let raw = value.unwrap_or_else(|| default.to_string());
    raw.parse().map_err(|_| ConfigError::Invalid { key, value: raw.clone() })
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

use std::env;
use std::fmt;

const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_DATABASE_PORT: u16 = 5432;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 72;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Process-wide settings, built once at startup and passed to the components that need them.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    /// Symmetric secret used to sign and verify session tokens.
    pub jwt_secret: String,
    /// Lifetime of an issued session token.
    pub token_ttl_hours: i64,
    /// bcrypt work factor used when hashing new passwords.
    pub bcrypt_cost: u32,
}

/// Reasons the configuration could not be assembled.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has an invalid value: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// `DATABASE_URL` wins when present; otherwise the URL is assembled from
    /// `DATABASE_HOST`, `DATABASE_PORT`, `DATABASE_USER`, `DATABASE_PASS` and `DATABASE_NAME`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => {
                let host = get("DATABASE_HOST").ok_or(ConfigError::Missing("DATABASE_URL"))?;
                let port = parse_or("DATABASE_PORT", get("DATABASE_PORT"), DEFAULT_DATABASE_PORT)?;
                let user = get("DATABASE_USER").ok_or(ConfigError::Missing("DATABASE_USER"))?;
                let pass = get("DATABASE_PASS").unwrap_or_default();
                let name = get("DATABASE_NAME").ok_or(ConfigError::Missing("DATABASE_NAME"))?;
                format!("postgres://{}:{}@{}:{}/{}", user, pass, host, port, name)
            }
        };

        let bcrypt_cost = parse_or("BCRYPT_COST", get("BCRYPT_COST"), bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let token_ttl_hours = parse_or(
            "TOKEN_TTL_HOURS",
            get("TOKEN_TTL_HOURS"),
            DEFAULT_TOKEN_TTL_HOURS,
        )?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_HOURS",
                value: token_ttl_hours.to_string(),
            });
        }

        Ok(Self {
            database_url,
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            server_port: parse_or("SERVER_PORT", get("SERVER_PORT"), DEFAULT_SERVER_PORT)?,
            server_host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            token_ttl_hours,
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

use std::env;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_POOL_MAX_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub pool_max_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, value } => write!(f, "invalid value for {key}: {value}"),
        }
    }
}

impl Error for ConfigError {}

impl Config {
    pub fn new(database_url: impl Into<String>) -> Self {
        Config {
            database_url: database_url.into(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
        }
    }

    /// Reads the config from the process environment, picking up a `.env` file if present
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_addr.clone(),
        })?;

        let pool_max_size = match lookup("DB_POOL_MAX_SIZE") {
            Some(value) => value
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::Invalid {
                    key: "DB_POOL_MAX_SIZE",
                    value,
                })?,
            None => DEFAULT_POOL_MAX_SIZE,
        };

        Ok(Config {
            database_url,
            bind_addr,
            pool_max_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| vars.get(key).map(|v| v.to_string())
    }

    #[test]
    fn defaults_apply_when_only_the_database_is_set() {
        let vars = HashMap::from([("DATABASE_URL", "postgres://localhost/books")]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(Config::new("postgres://localhost/books"), config);
    }

    #[test]
    fn database_url_is_required() {
        let vars = HashMap::new();
        assert_eq!(
            Err(ConfigError::Missing("DATABASE_URL")),
            Config::from_lookup(lookup(&vars))
        );
    }

    #[test]
    fn bad_values_are_rejected() {
        let vars = HashMap::from([
            ("DATABASE_URL", "postgres://localhost/books"),
            ("BIND_ADDR", "not-an-address"),
        ]);
        assert!(matches!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { key: "BIND_ADDR", .. })
        ));

        let vars = HashMap::from([
            ("DATABASE_URL", "postgres://localhost/books"),
            ("DB_POOL_MAX_SIZE", "0"),
        ]);
        assert!(matches!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { key: "DB_POOL_MAX_SIZE", .. })
        ));
    }
}

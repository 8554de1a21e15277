use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        // argon2 crate defaults (OWASP minimum for Argon2id)
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Where the user table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    Url(String),
    Parts {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    /// Root certificate for verified TLS, applied to either database form.
    pub db_ssl_ca: Option<PathBuf>,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub hash: HashConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = match lookup("DATABASE_URL") {
            Some(url) => DatabaseConfig::Url(url),
            None => DatabaseConfig::Parts {
                host: lookup("DB_HOST").unwrap_or_else(|| "localhost".into()),
                port: parse_or(&lookup, "DB_PORT", 5432)?,
                user: lookup("DB_USER").unwrap_or_else(|| "cookbook_user".into()),
                password: lookup("DB_PASS").unwrap_or_else(|| "cookbook_pass".into()),
                database: lookup("DB_NAME").unwrap_or_else(|| "cookbook_db".into()),
            },
        };

        // APP_PORT wins over the PORT that hosting platforms inject
        let port = match lookup("APP_PORT") {
            Some(_) => parse_or(&lookup, "APP_PORT", 3000)?,
            None => parse_or(&lookup, "PORT", 3000)?,
        };

        let defaults = HashConfig::default();
        let hash = HashConfig {
            memory_kib: parse_or(&lookup, "HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "HASH_PARALLELISM", defaults.parallelism)?,
        };

        Ok(Self {
            database,
            db_ssl_ca: lookup("DB_SSL_CA").map(PathBuf::from),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            hash,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

use crate::auth::password::PasswordService;
use crate::auth::repo::{CredentialStore, PgCredentialStore};
use crate::config::{AppConfig, DatabaseConfig};
use anyhow::Context;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub hasher: Arc<PasswordService>,
}

impl AppState {
    /// Connects the pool and returns it alongside the state so the caller can
    /// run migrations on it.
    pub async fn init(config: &AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let hasher = Arc::new(PasswordService::new(config.hash)?);

        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(connect_options(
                &config.database,
                config.db_ssl_ca.as_deref(),
            )?)
            .await
            .context("connect to database")?;

        let store = Arc::new(PgCredentialStore::new(db.clone())) as Arc<dyn CredentialStore>;
        Ok((Self::from_parts(store, hasher), db))
    }

    pub fn from_parts(store: Arc<dyn CredentialStore>, hasher: Arc<PasswordService>) -> Self {
        Self { store, hasher }
    }
}

fn connect_options(
    cfg: &DatabaseConfig,
    ssl_ca: Option<&Path>,
) -> anyhow::Result<PgConnectOptions> {
    let opts = match cfg {
        DatabaseConfig::Url(url) => url.parse::<PgConnectOptions>().context("parse DATABASE_URL")?,
        DatabaseConfig::Parts {
            host,
            port,
            user,
            password,
            database,
        } => PgConnectOptions::new()
            .host(host)
            .port(*port)
            .username(user)
            .password(password)
            .database(database),
    };
    Ok(match ssl_ca {
        Some(ca) => opts.ssl_mode(PgSslMode::VerifyCa).ssl_root_cert(ca),
        None => opts,
    })
}

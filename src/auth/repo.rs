use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::{StoreError, User};

/// Persistence for user records. Insert-only: nothing here updates or deletes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create a user and return its id.
    ///
    /// Fails with [`StoreError::DuplicateIdentifier`] when the email is taken.
    /// The uniqueness check and the insert are a single atomic statement.
    async fn insert(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError>;

    /// Exact-match lookup by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

#[derive(Clone)]
pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn insert(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (full_name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateIdentifier
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

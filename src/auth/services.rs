use anyhow::Context;
use tracing::{info, warn};

use crate::auth::{
    dto::{AuthenticatedUser, LoginRequest, SignupRequest},
    errors::AuthError,
    password::PasswordService,
    repo::CredentialStore,
};

/// Returns the value when present and non-empty.
fn required(field: Option<String>) -> Result<String, AuthError> {
    match field {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AuthError::Validation),
    }
}

async fn hash_blocking(hasher: &PasswordService, password: String) -> Result<String, AuthError> {
    let hasher = hasher.clone();
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .context("hash task panicked")??;
    Ok(hash)
}

async fn verify_blocking(
    hasher: &PasswordService,
    password: String,
    hash: String,
) -> Result<bool, AuthError> {
    let hasher = hasher.clone();
    let ok = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .context("verify task panicked")??;
    Ok(ok)
}

/// Create a user. Returns the new record id.
///
/// Duplicate emails are rejected by the store's insert itself; there is no
/// separate existence check beforehand.
pub async fn register(
    store: &dyn CredentialStore,
    hasher: &PasswordService,
    req: SignupRequest,
) -> Result<i64, AuthError> {
    let full_name = required(req.full_name)?;
    let email = required(req.email)?;
    let password = required(req.password)?;

    let password_hash = hash_blocking(hasher, password).await?;

    match store.insert(&full_name, &email, &password_hash).await {
        Ok(id) => {
            info!(user_id = id, email = %email, "user registered");
            Ok(id)
        }
        Err(e) => {
            let e = AuthError::from(e);
            if matches!(e, AuthError::DuplicateIdentifier) {
                warn!(email = %email, "email already registered");
            }
            Err(e)
        }
    }
}

/// Check an email/password pair. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn authenticate(
    store: &dyn CredentialStore,
    hasher: &PasswordService,
    req: LoginRequest,
) -> Result<AuthenticatedUser, AuthError> {
    let email = required(req.email)?;
    let password = required(req.password)?;

    let Some(user) = store.find_by_email(&email).await? else {
        // same Argon2 work as a wrong password, so timing does not reveal the miss
        verify_blocking(hasher, password, hasher.dummy_hash().to_owned()).await?;
        warn!(email = %email, "login unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_blocking(hasher, password, user.password_hash).await? {
        warn!(email = %email, user_id = user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    info!(user_id = user.id, email = %email, "user logged in");
    Ok(AuthenticatedUser {
        full_name: user.full_name,
    })
}

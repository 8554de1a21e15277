use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::HashConfig;

/// Argon2id hashing with a configurable work factor.
///
/// Hashes are PHC strings, so the salt and cost parameters travel with the
/// stored value and `verify` keeps working after the costs are retuned.
#[derive(Clone)]
pub struct PasswordService {
    params: Params,
    dummy_hash: String,
}

impl PasswordService {
    pub fn new(cfg: HashConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 parameters: {e}"))?;
        let mut svc = Self {
            params,
            dummy_hash: String::new(),
        };
        let unguessable = SaltString::generate(&mut OsRng);
        svc.dummy_hash = svc.hash(unguessable.as_str())?;
        Ok(svc)
    }

    /// A valid hash at the configured cost that no submitted password matches.
    /// Verifying against it makes a lookup miss cost the same as a mismatch.
    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored hash cannot be parsed.
    pub fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(self
            .argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
impl PasswordService {
    pub(crate) fn with_dummy_hash(mut self, hash: &str) -> Self {
        self.dummy_hash = hash.to_owned();
        self
    }
}

#[cfg(test)]
pub(crate) fn test_service() -> PasswordService {
    PasswordService::new(HashConfig {
        memory_kib: 256,
        iterations: 1,
        parallelism: 1,
    })
    .expect("test params are valid")
}

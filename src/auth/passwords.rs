use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::auth::{AuthError, AuthResult};

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024, // 19 MiB
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl PasswordParams {
    /// Defaults overridden by `REGISTRATION_ARGON2_{MEMORY_KIB,ITERATIONS,PARALLELISM}`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |name: &str, fallback: u32| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(fallback)
        };

        Self {
            memory_kib: read("REGISTRATION_ARGON2_MEMORY_KIB", defaults.memory_kib),
            iterations: read("REGISTRATION_ARGON2_ITERATIONS", defaults.iterations),
            parallelism: read("REGISTRATION_ARGON2_PARALLELISM", defaults.parallelism),
        }
    }
}

/// Hashes new passwords into PHC strings and checks candidates against them.
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new() -> AuthResult<Self> {
        Self::with_params(PasswordParams::default())
    }

    pub fn with_params(params: PasswordParams) -> AuthResult<Self> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(AuthError::from)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        Ok(Self { argon2 })
    }

    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(AuthError::from)?
            .to_string();
        Ok(hash)
    }

    /// `Ok(false)` for a wrong password; `Err` only when `encoded` is not a
    /// usable hash.
    pub fn verify_password(&self, password: &str, encoded: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(encoded)?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(AuthError::from(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_service() -> PasswordService {
        PasswordService::with_params(PasswordParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("password service")
    }

    #[test]
    fn hashes_and_verifies_passwords() {
        let service = PasswordService::new().expect("password service");
        let hash = service.hash_password("Sup3r-secret!").expect("hash generation");
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert!(
            service
                .verify_password("Sup3r-secret!", &hash)
                .expect("verify succeeds")
        );
        assert!(
            !service
                .verify_password("wrong-password", &hash)
                .expect("verify runs")
        );
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let service = cheap_service();
        let first = service.hash_password("Passw0rd!").expect("hash");
        let second = service.hash_password("Passw0rd!").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let service = cheap_service();
        assert!(matches!(
            service.verify_password("Passw0rd!", "not-a-phc-string"),
            Err(AuthError::PasswordHash(_))
        ));
    }

    #[test]
    fn rejects_unusable_params() {
        let result = PasswordService::with_params(PasswordParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(AuthError::Argon2(_))));
    }
}

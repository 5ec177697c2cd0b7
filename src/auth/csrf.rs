//! Anti-forgery tokens for HTML forms.
//!
//! Each client gets a random secret in an HTTP-only cookie. Forms embed a
//! token derived from that secret and a per-render salt; a submission is
//! accepted only when its token re-derives from the cookie's secret.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};
use rocket::State;
use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::request::{FromRequest, Outcome, Request};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::auth::{AuthError, AuthResult};
use crate::config::AppConfig;

const SECRET_LEN: usize = 18;
const SALT_LEN: usize = 8;

/// Stateless token derivation and verification against a known secret.
pub struct CsrfService;

impl CsrfService {
    pub fn generate_secret() -> String {
        let mut bytes = [0u8; SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Mint a token for `secret`. Each call uses a fresh salt, so two tokens
    /// for the same secret differ but both verify.
    pub fn issue(secret: &str) -> String {
        let salt: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SALT_LEN)
            .map(char::from)
            .collect();
        format!("{salt}-{}", Self::digest(&salt, secret))
    }

    pub fn verify(secret: &str, token: &str) -> AuthResult<()> {
        if token.is_empty() {
            return Err(AuthError::CsrfMissing);
        }

        let Some((salt, digest)) = token.split_once('-') else {
            return Err(AuthError::CsrfMismatch);
        };

        let expected = Self::digest(salt, secret);
        if bool::from(expected.as_bytes().ct_eq(digest.as_bytes())) {
            Ok(())
        } else {
            Err(AuthError::CsrfMismatch)
        }
    }

    fn digest(salt: &str, secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(b"-");
        hasher.update(secret.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

/// Request guard carrying the client's CSRF secret, creating the secret
/// cookie on first contact.
#[derive(Debug)]
pub struct Csrf {
    secret: String,
}

impl Csrf {
    pub fn token(&self) -> String {
        CsrfService::issue(&self.secret)
    }

    pub fn verify(&self, submitted: Option<&str>) -> AuthResult<()> {
        CsrfService::verify(&self.secret, submitted.unwrap_or(""))
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Csrf {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match request.guard::<&State<AppConfig>>().await {
            Outcome::Success(config) => config,
            _ => {
                let err = AuthError::Config("AppConfig not available".into());
                return Outcome::Error((err.status(), err));
            }
        };

        let cookies = request.cookies();
        let existing = cookies
            .get(&config.csrf_cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty());

        let secret = match existing {
            Some(secret) => secret,
            None => {
                let secret = CsrfService::generate_secret();
                set_secret_cookie(cookies, config, &secret);
                secret
            }
        };

        Outcome::Success(Csrf { secret })
    }
}

fn set_secret_cookie(cookies: &CookieJar<'_>, config: &AppConfig, secret: &str) {
    let mut cookie = Cookie::build((config.csrf_cookie_name.clone(), secret.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .build();

    if let Some(domain) = &config.cookie_domain {
        cookie.set_domain(domain.clone());
    }

    cookies.add(cookie);
}

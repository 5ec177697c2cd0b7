//! Credential handling for the registration form: password hashing and
//! anti-forgery tokens.

pub mod csrf;
pub mod error;
pub mod passwords;

pub use csrf::{Csrf, CsrfService};
pub use error::{AuthError, AuthResult};
pub use passwords::PasswordService;

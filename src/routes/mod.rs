//! HTTP route handlers.
//!
//! `user` and `home` serve the HTML pages; `health` is a JSON endpoint
//! annotated with `#[openapi]` so `rocket_okapi` can document it.

pub mod catchers;
pub mod health;
pub mod home;
pub mod user;

//! Error pages for failures that never reach a handler, such as unknown
//! routes or request bodies Rocket could not parse.

use rocket::http::Status;
use rocket::{Catcher, Request};
use rocket_dyn_templates::Template;

use crate::error::render_error;

#[catch(default)]
pub fn default_catcher(status: Status, request: &Request<'_>) -> (Status, Template) {
    log::debug!("{} {} -> {}", request.method(), request.uri(), status.code);
    let message = match status.code {
        403 => "This form has expired or was not submitted from this site.",
        404 => "The page you were looking for does not exist.",
        422 => "The submitted form could not be read.",
        _ => "Something went wrong. Please try again.",
    };
    (status, render_error(status, message))
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

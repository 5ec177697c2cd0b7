use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::{Request, Response};
use rocket_dyn_templates::{Template, context};
use thiserror::Error;

use crate::auth::AuthError;
use crate::users::UserError;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rocket_db_pools::sqlx::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("validation could not run: {0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> Status {
        match self {
            AppError::Auth(err) => err.status(),
            AppError::NotFound(_) => Status::NotFound,
            AppError::Database(_) | AppError::Validation(_) | AppError::Internal(_) => {
                Status::InternalServerError
            }
        }
    }

    /// Text safe to show to the client; server-side failures stay generic.
    fn public_message(&self) -> String {
        match self {
            AppError::Auth(err) if err.status() == Status::Forbidden => err.to_string(),
            AppError::NotFound(msg) => msg.clone(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Sqlx(err) => AppError::Database(err),
            UserError::EmailTaken => AppError::Internal(err.to_string()),
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.code >= 500 {
            log::error!("{} {}: {}", request.method(), request.uri(), self);
        } else {
            log::debug!("{} {}: {}", request.method(), request.uri(), self);
        }

        let page = render_error(status, &self.public_message());
        Response::build_from(page.respond_to(request)?)
            .status(status)
            .ok()
    }
}

/// Render the shared error page for `status`.
pub fn render_error(status: Status, message: &str) -> Template {
    Template::render(
        "error",
        context! {
            title: status.reason().unwrap_or("Error"),
            status: status.code,
            message: message,
        },
    )
}

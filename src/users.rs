//! Queries over the `users` table.

use rocket_db_pools::sqlx::{self, PgPool};
use thiserror::Error;

use crate::models::{NewUser, User};

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_address_key";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("email address already registered")]
    EmailTaken,
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, first_name, last_name, email_address, hashed_password, created_at, updated_at
        FROM users
        WHERE email_address = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email_address = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

/// Insert a new user, mapping a lost race on the unique email constraint to
/// [`UserError::EmailTaken`].
pub async fn insert(pool: &PgPool, user: &NewUser) -> Result<User, UserError> {
    let result = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (first_name, last_name, email_address, hashed_password)
        VALUES ($1, $2, $3, $4)
        RETURNING id, first_name, last_name, email_address, hashed_password, created_at, updated_at
        "#,
    )
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email_address)
    .bind(&user.hashed_password)
    .fetch_one(pool)
    .await;

    match result {
        Ok(user) => Ok(user),
        Err(err) if is_email_conflict(&err) => Err(UserError::EmailTaken),
        Err(err) => Err(UserError::Sqlx(err)),
    }
}

fn is_email_conflict(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT)
    )
}

use chrono::{DateTime, Utc};
use rocket_db_pools::sqlx::FromRow;
use serde::{Deserialize, Serialize};

// ===== User Models =====

/// A persisted account row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a user row that has not been inserted yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub hashed_password: String,
}

// ===== Form Models =====

/// The non-secret registration fields echoed back into the form.
///
/// `Default` is the blank, unsaved user rendered on the first visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

/// Raw `application/x-www-form-urlencoded` body of `POST /user/register`.
///
/// Every field is optional so that missing inputs reach the validator chain
/// instead of failing form parsing.
#[derive(Debug, Clone, Default, rocket::form::FromForm)]
pub struct RegistrationForm {
    #[field(name = "firstName")]
    pub first_name: Option<String>,
    #[field(name = "lastName")]
    pub last_name: Option<String>,
    #[field(name = "emailAddress")]
    pub email_address: Option<String>,
    pub password: Option<String>,
    #[field(name = "confirmPassword")]
    pub confirm_password: Option<String>,
    #[field(name = "_csrf")]
    pub csrf_token: Option<String>,
}

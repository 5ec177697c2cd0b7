//! The registration flow: validate the submitted form, hash the password,
//! persist the user.

use std::sync::Arc;

use rocket_db_pools::sqlx::PgPool;

use crate::auth::PasswordService;
use crate::error::AppError;
use crate::models::{NewUser, RegistrationForm, User, UserForm};
use crate::users::{self, UserError};
use crate::validation::{AsyncCheck, FieldChain, FormInput, ValidationError, Validator};

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const EMAIL_ADDRESS: &str = "emailAddress";
pub const PASSWORD: &str = "password";
pub const CONFIRM_PASSWORD: &str = "confirmPassword";

pub const EMAIL_IN_USE: &str = "E-mail already in use";

/// Each class must appear before the first line break.
const PASSWORD_RULES: [&str; 4] = [
    r"^[^\r\n\x{2028}\x{2029}]*[a-z]",
    r"^[^\r\n\x{2028}\x{2029}]*[A-Z]",
    r"^[^\r\n\x{2028}\x{2029}]*[0-9]",
    r"^[^\r\n\x{2028}\x{2029}]*[!@#$%^&*]",
];

/// Passes when no stored user has the (already normalized) address.
pub struct EmailAvailable {
    pool: PgPool,
}

impl EmailAvailable {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[rocket::async_trait]
impl AsyncCheck for EmailAvailable {
    async fn check(&self, value: &str) -> Result<bool, ValidationError> {
        Ok(!users::email_exists(&self.pool, value).await?)
    }
}

/// Field rules for the registration form. `email_available` decides the
/// uniqueness rule so tests can run the chain without a database.
pub fn registration_validator(
    email_available: Arc<dyn AsyncCheck>,
) -> Result<Validator, ValidationError> {
    let password = FieldChain::new(PASSWORD)
        .exists()
        .with_message("Please enter a password")
        .max_length(50)
        .with_message("Must be less than 50 characters")
        .matches_all(PASSWORD_RULES)?
        .with_message(
            "Password must contain at least 1 lowercase letter, uppercase letter, number, and special character (i.e. \"!@#$%^&*\")",
        );

    Ok(Validator::new()
        .chain(
            FieldChain::new(FIRST_NAME)
                .strip_control()
                .exists()
                .with_message("Please enter a first name")
                .max_length(50)
                .with_message("First name must be shorter than 50 characters"),
        )
        .chain(
            FieldChain::new(LAST_NAME)
                .strip_control()
                .exists()
                .with_message("Please enter a last name")
                .max_length(50)
                .with_message("Last name must be shorter than 50 characters"),
        )
        .chain(
            FieldChain::new(EMAIL_ADDRESS)
                .strip_control()
                .exists()
                .with_message("Please enter an email address")
                // Lowercasing can lengthen the value, so measure what gets stored.
                .normalize_email()
                .max_length(255)
                .with_message("Email must be shorter than 255 characters")
                .is_email()
                .with_message("Please provide a valid email address")
                .custom(email_available)
                .with_message(EMAIL_IN_USE),
        )
        .chain(password)
        .chain(
            FieldChain::new(CONFIRM_PASSWORD)
                .exists()
                .with_message("Please confirm your password")
                .max_length(50)
                .with_message("Password confirmation must not be more than 50 characters long")
                .equals_field(PASSWORD)
                .with_message("Password confirmation does not match"),
        ))
}

#[derive(Debug)]
pub enum RegistrationOutcome {
    Created(User),
    /// Nothing was stored; `user` holds the sanitized values to re-display.
    Rejected { user: UserForm, errors: Vec<String> },
}

pub struct Registrar {
    pool: PgPool,
    validator: Validator,
    passwords: PasswordService,
}

impl Registrar {
    pub fn new(pool: PgPool, passwords: PasswordService) -> Result<Self, ValidationError> {
        let email_available = Arc::new(EmailAvailable::new(pool.clone()));
        Self::with_email_check(pool, passwords, email_available)
    }

    /// Like [`Registrar::new`], with a caller-supplied uniqueness rule.
    pub fn with_email_check(
        pool: PgPool,
        passwords: PasswordService,
        email_available: Arc<dyn AsyncCheck>,
    ) -> Result<Self, ValidationError> {
        let validator = registration_validator(email_available)?;
        Ok(Self {
            pool,
            validator,
            passwords,
        })
    }

    pub async fn register(&self, form: RegistrationForm) -> Result<RegistrationOutcome, AppError> {
        let mut input = form_input(form);
        let errors = self.validator.run(&mut input).await?;
        let user = user_form(&input);

        if !errors.is_empty() {
            log::debug!(
                "registration rejected for '{}': {} error(s)",
                user.email_address,
                errors.len()
            );
            return Ok(RegistrationOutcome::Rejected {
                user,
                errors: errors.into_iter().map(|err| err.message).collect(),
            });
        }

        let passwords = self.passwords.clone();
        let password = input.value(PASSWORD).to_string();
        let hashed_password =
            rocket::tokio::task::spawn_blocking(move || passwords.hash_password(&password))
                .await
                .map_err(|err| AppError::Internal(format!("hashing task failed: {err}")))??;

        let new_user = NewUser {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email_address: user.email_address.clone(),
            hashed_password,
        };

        match users::insert(&self.pool, &new_user).await {
            Ok(created) => {
                log::info!("registered user {} <{}>", created.id, created.email_address);
                Ok(RegistrationOutcome::Created(created))
            }
            Err(UserError::EmailTaken) => Ok(RegistrationOutcome::Rejected {
                user,
                errors: vec![EMAIL_IN_USE.to_string()],
            }),
            Err(err) => Err(err.into()),
        }
    }
}

fn form_input(form: RegistrationForm) -> FormInput {
    FormInput::new()
        .with(FIRST_NAME, form.first_name)
        .with(LAST_NAME, form.last_name)
        .with(EMAIL_ADDRESS, form.email_address)
        .with(PASSWORD, form.password)
        .with(CONFIRM_PASSWORD, form.confirm_password)
}

fn user_form(input: &FormInput) -> UserForm {
    UserForm {
        first_name: input.value(FIRST_NAME).to_string(),
        last_name: input.value(LAST_NAME).to_string(),
        email_address: input.value(EMAIL_ADDRESS).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Taken(Vec<&'static str>);

    #[rocket::async_trait]
    impl AsyncCheck for Taken {
        async fn check(&self, value: &str) -> Result<bool, ValidationError> {
            Ok(!self.0.iter().any(|taken| *taken == value))
        }
    }

    fn validator(taken: Vec<&'static str>) -> Validator {
        registration_validator(Arc::new(Taken(taken))).expect("valid rules")
    }

    fn complete_form() -> RegistrationForm {
        RegistrationForm {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            email_address: Some("Ada@Example.com".into()),
            password: Some("Engine#1843".into()),
            confirm_password: Some("Engine#1843".into()),
            csrf_token: None,
        }
    }

    async fn run(validator: &Validator, form: RegistrationForm) -> (Vec<String>, FormInput) {
        let mut input = form_input(form);
        let errors = validator.run(&mut input).await.expect("validation runs");
        (errors.into_iter().map(|err| err.message).collect(), input)
    }

    #[tokio::test]
    async fn complete_form_passes_and_normalizes_email() {
        let (errors, input) = run(&validator(vec![]), complete_form()).await;
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert_eq!(input.value(EMAIL_ADDRESS), "ada@example.com");
    }

    #[tokio::test]
    async fn empty_form_reports_every_field_in_order() {
        let (errors, _) = run(&validator(vec![]), RegistrationForm::default()).await;
        assert_eq!(
            errors,
            vec![
                "Please enter a first name",
                "Please enter a last name",
                "Please enter an email address",
                "Please provide a valid email address",
                "Please enter a password",
                "Password must contain at least 1 lowercase letter, uppercase letter, number, and special character (i.e. \"!@#$%^&*\")",
                "Please confirm your password",
            ]
        );
    }

    #[tokio::test]
    async fn overlong_names_are_rejected() {
        let mut form = complete_form();
        form.first_name = Some("a".repeat(51));
        form.last_name = Some("b".repeat(50));

        let (errors, _) = run(&validator(vec![]), form).await;
        assert_eq!(errors, vec!["First name must be shorter than 50 characters"]);
    }

    #[tokio::test]
    async fn weak_password_and_mismatch_are_reported() {
        let mut form = complete_form();
        form.password = Some("alllowercase1".into());
        form.confirm_password = Some("different".into());

        let (errors, _) = run(&validator(vec![]), form).await;
        assert_eq!(
            errors,
            vec![
                "Password must contain at least 1 lowercase letter, uppercase letter, number, and special character (i.e. \"!@#$%^&*\")",
                "Password confirmation does not match",
            ]
        );
    }

    #[tokio::test]
    async fn long_password_reports_both_fields() {
        let long = format!("Aa1!{}", "x".repeat(47));
        let mut form = complete_form();
        form.password = Some(long.clone());
        form.confirm_password = Some(long);

        let (errors, _) = run(&validator(vec![]), form).await;
        assert_eq!(
            errors,
            vec![
                "Must be less than 50 characters",
                "Password confirmation must not be more than 50 characters long",
            ]
        );
    }

    #[tokio::test]
    async fn uniqueness_is_checked_against_normalized_address() {
        let mut form = complete_form();
        form.email_address = Some("J.Doe+promo@googlemail.com".into());

        let (errors, input) = run(&validator(vec!["jdoe@gmail.com"]), form).await;
        assert_eq!(errors, vec![EMAIL_IN_USE]);
        assert_eq!(input.value(EMAIL_ADDRESS), "jdoe@gmail.com");
    }

    #[tokio::test]
    async fn malformed_email_is_reported() {
        let mut form = complete_form();
        form.email_address = Some("not an email".into());

        let (errors, _) = run(&validator(vec![]), form).await;
        assert_eq!(errors, vec!["Please provide a valid email address"]);
    }

    /// Fails the run if a value Postgres cannot store reaches the lookup.
    struct StorableOnly;

    #[rocket::async_trait]
    impl AsyncCheck for StorableOnly {
        async fn check(&self, value: &str) -> Result<bool, ValidationError> {
            assert!(!value.contains('\u{0}'), "NUL reached lookup: {value:?}");
            Ok(true)
        }
    }

    #[tokio::test]
    async fn nul_bytes_are_stripped_from_stored_fields() {
        let validator = registration_validator(Arc::new(StorableOnly)).expect("valid rules");
        let mut form = complete_form();
        form.first_name = Some("A\u{0}da".into());
        form.last_name = Some("Love\u{0}lace".into());
        form.email_address = Some("bad\u{0}email".into());

        let (errors, input) = run(&validator, form).await;
        assert_eq!(errors, vec!["Please provide a valid email address"]);
        assert_eq!(input.value(FIRST_NAME), "Ada");
        assert_eq!(input.value(LAST_NAME), "Lovelace");
        assert_eq!(input.value(EMAIL_ADDRESS), "bademail");
    }

    #[tokio::test]
    async fn email_length_is_measured_after_normalizing() {
        // U+0130 lowercases to two characters, pushing 255 to 256.
        let raw = format!("{}@{}.com", "a".repeat(60), "\u{130}".repeat(190));
        assert_eq!(raw.chars().count(), 255);
        let mut form = complete_form();
        form.email_address = Some(raw);

        let (errors, input) = run(&validator(vec![]), form).await;
        assert!(
            errors.contains(&"Email must be shorter than 255 characters".to_string()),
            "unexpected errors: {errors:?}"
        );
        assert_eq!(input.value(EMAIL_ADDRESS).chars().count(), 445);
    }

    #[tokio::test]
    async fn password_classes_must_appear_before_first_line_break() {
        let mut split = complete_form();
        split.password = Some("abc\nA1!".into());
        split.confirm_password = split.password.clone();
        let (errors, _) = run(&validator(vec![]), split).await;
        assert_eq!(
            errors,
            vec![
                "Password must contain at least 1 lowercase letter, uppercase letter, number, and special character (i.e. \"!@#$%^&*\")",
            ]
        );

        let mut leading = complete_form();
        leading.password = Some("Aa1!\nrest".into());
        leading.confirm_password = leading.password.clone();
        let (errors, _) = run(&validator(vec![]), leading).await;
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn user_form_echoes_only_public_fields() {
        let input = form_input(complete_form());
        let user = user_form(&input);
        assert_eq!(
            user,
            UserForm {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email_address: "Ada@Example.com".into(),
            }
        );
    }
}

//! Declarative field validation.
//!
//! A [`Validator`] is an ordered list of [`FieldChain`]s. Each chain names one
//! input field and lists the checks and sanitizers to apply to it, in order:
//!
//! ```rust,ignore
//! let chain = FieldChain::new("firstName")
//!     .exists()
//!     .with_message("Please enter a first name")
//!     .max_length(50)
//!     .with_message("First name must be shorter than 50 characters");
//! ```
//!
//! Every step of every chain runs, so a single field can report several
//! problems at once. Sanitizers rewrite the value in the shared [`FormInput`],
//! which means later steps, later chains and the caller all observe the
//! sanitized value.

pub mod email;

use std::collections::HashMap;
use std::sync::Arc;

use regex::RegexSet;
use serde::Serialize;
use thiserror::Error;
use validator::ValidateEmail;

pub use email::normalize_email;

const DEFAULT_MESSAGE: &str = "Invalid value";

/// Failure to *run* validation, as opposed to input failing a rule.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("database error: {0}")]
    Sqlx(#[from] rocket_db_pools::sqlx::Error),
}

/// Submitted form values keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    values: HashMap<String, String>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field; `None` leaves it absent.
    pub fn with(mut self, field: &str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.values.insert(field.to_string(), value);
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// The field value, with absent fields reading as the empty string.
    pub fn value(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn set(&mut self, field: &str, value: String) {
        self.values.insert(field.to_string(), value);
    }
}

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Asynchronous rule, e.g. a lookup against stored records.
///
/// Returns `Ok(true)` when the value is acceptable.
#[rocket::async_trait]
pub trait AsyncCheck: Send + Sync {
    async fn check(&self, value: &str) -> Result<bool, ValidationError>;
}

enum Rule {
    Exists,
    MaxLength(usize),
    IsEmail,
    Matches(RegexSet),
    EqualsField(String),
    Custom(Arc<dyn AsyncCheck>),
    NormalizeEmail,
    StripControl,
}

struct Step {
    rule: Rule,
    message: Option<String>,
}

/// Checks and sanitizers for a single field, applied in declaration order.
pub struct FieldChain {
    field: String,
    steps: Vec<Step>,
}

impl FieldChain {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            steps: Vec::new(),
        }
    }

    /// Field must be present and non-empty.
    pub fn exists(self) -> Self {
        self.push(Rule::Exists)
    }

    /// Field must not exceed `max` characters.
    pub fn max_length(self, max: usize) -> Self {
        self.push(Rule::MaxLength(max))
    }

    pub fn is_email(self) -> Self {
        self.push(Rule::IsEmail)
    }

    /// Every pattern must match somewhere in the value.
    pub fn matches_all<I, S>(self, patterns: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = RegexSet::new(patterns)?;
        Ok(self.push(Rule::Matches(set)))
    }

    /// Value must equal the raw value of `other`.
    pub fn equals_field(self, other: &str) -> Self {
        self.push(Rule::EqualsField(other.to_string()))
    }

    pub fn custom(self, check: Arc<dyn AsyncCheck>) -> Self {
        self.push(Rule::Custom(check))
    }

    /// Sanitizer: replace the value with [`normalize_email`] output when it
    /// parses as an address.
    pub fn normalize_email(self) -> Self {
        self.push(Rule::NormalizeEmail)
    }

    /// Sanitizer: drop control characters (NUL, line breaks, DEL and the C1
    /// range). Postgres refuses NUL in text values.
    pub fn strip_control(self) -> Self {
        self.push(Rule::StripControl)
    }

    /// Attach a message to the most recently added check.
    pub fn with_message(mut self, message: &str) -> Self {
        if let Some(step) = self.steps.last_mut() {
            step.message = Some(message.to_string());
        }
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    fn push(mut self, rule: Rule) -> Self {
        self.steps.push(Step {
            rule,
            message: None,
        });
        self
    }

    async fn run(
        &self,
        input: &mut FormInput,
        errors: &mut Vec<FieldError>,
    ) -> Result<(), ValidationError> {
        for step in &self.steps {
            let value = input.value(&self.field);
            let passed = match &step.rule {
                Rule::Exists => !value.is_empty(),
                Rule::MaxLength(max) => value.chars().count() <= *max,
                Rule::IsEmail => value.validate_email(),
                Rule::Matches(set) => set.matches(value).matched_all(),
                Rule::EqualsField(other) => value == input.value(other),
                Rule::Custom(check) => check.check(value).await?,
                Rule::NormalizeEmail => {
                    if let Some(normalized) = normalize_email(value) {
                        input.set(&self.field, normalized);
                    }
                    continue;
                }
                Rule::StripControl => {
                    if value.chars().any(char::is_control) {
                        let stripped = value.chars().filter(|c| !c.is_control()).collect();
                        input.set(&self.field, stripped);
                    }
                    continue;
                }
            };

            if !passed {
                errors.push(FieldError {
                    field: self.field.clone(),
                    message: step
                        .message
                        .clone()
                        .unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
                });
            }
        }

        Ok(())
    }
}

/// An ordered set of field chains.
#[derive(Default)]
pub struct Validator {
    chains: Vec<FieldChain>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain(mut self, chain: FieldChain) -> Self {
        self.chains.push(chain);
        self
    }

    /// Run all chains against `input`, sanitizing it in place, and return the
    /// failures in the order they were found.
    pub async fn run(&self, input: &mut FormInput) -> Result<Vec<FieldError>, ValidationError> {
        let mut errors = Vec::new();
        for chain in &self.chains {
            chain.run(input, &mut errors).await?;
        }
        Ok(errors)
    }
}

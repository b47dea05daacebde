//! User account domain model and registration rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Email suffix reserved for staff accounts.
pub const ADMIN_EMAIL_DOMAIN: &str = "@uwi.edu";

/// Email suffix reserved for student accounts.
pub const STUDENT_EMAIL_DOMAIN: &str = "@my.uwi.edu";

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length, bounds the hashing cost.
pub const MAX_PASSWORD_LENGTH: usize = 128;

lazy_static::lazy_static! {
    static ref EMAIL_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
}

/// Validation errors raised by the user aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("invalid email format")]
    InvalidEmail,

    #[error("invalid role")]
    InvalidRole,

    #[error("admin email must end with @uwi.edu")]
    EmailAdmin,

    #[error("student email must end with @my.uwi.edu")]
    EmailStudent,

    #[error("password must be at least 8 characters")]
    InvalidPasswordLength,

    #[error("password must be at most 128 characters")]
    PasswordTooLong,

    #[error("password must contain at least one letter and one digit")]
    InvalidPasswordComplexity,
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }
}

impl FromStr for Role {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            _ => Err(UserError::InvalidRole),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)] // Never serialize the digest to API responses
    pub password_digest: String,
    pub role: Role,
    pub is_active: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }
}

/// Canonical form used for storage and every lookup: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks email syntax and that the suffix is one of the two permitted domains.
pub fn validate_email(email: &str) -> Result<(), UserError> {
    if !EMAIL_REGEX.is_match(email) {
        return Err(UserError::InvalidEmail);
    }
    if !email.ends_with(ADMIN_EMAIL_DOMAIN) && !email.ends_with(STUDENT_EMAIL_DOMAIN) {
        return Err(UserError::InvalidEmail);
    }
    Ok(())
}

/// Checks that the email suffix permits the given role.
pub fn validate_role_for_email(role: Role, email: &str) -> Result<(), UserError> {
    match role {
        Role::Admin if !email.ends_with(ADMIN_EMAIL_DOMAIN) => Err(UserError::EmailAdmin),
        Role::Student if !email.ends_with(STUDENT_EMAIL_DOMAIN) => Err(UserError::EmailStudent),
        _ => Ok(()),
    }
}

/// Password policy: 8 to 128 characters with at least one letter and one digit.
pub fn validate_password(password: &str) -> Result<(), UserError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(UserError::InvalidPasswordLength);
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(UserError::PasswordTooLong);
    }

    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(UserError::InvalidPasswordComplexity);
    }
    Ok(())
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub role: Role,
}

impl Registration {
    /// Validates raw registration input.
    ///
    /// Checks run in a fixed order: email, role, role/email pairing, password.
    /// The returned email is normalized.
    pub fn parse(email: &str, password: &str, role: &str) -> Result<Self, UserError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        let role = Role::from_str(role.trim())?;
        validate_role_for_email(role, &email)?;
        validate_password(password)?;
        Ok(Self { email, role })
    }
}

//! Access token codec using HS256.
//!
//! Access tokens are short-lived, self-describing bearer credentials. They
//! carry the caller's identity (`sub`, `role`, optional `student_id`) so the
//! identity middleware can authenticate a request without a database read.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Access token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Caller role, `admin` or `student`
    pub role: String,
    /// External student identifier, only for the `student` role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Parses the subject as a user ID.
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }
}

/// Minimum secret length for HS256 signing.
pub const MIN_SECRET_BYTES: usize = 32;

/// Default leeway in seconds for clock skew tolerance.
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Upper bound for clock skew tolerance.
pub const MAX_LEEWAY_SECS: u64 = 30;

/// Default issuer claim.
pub const DEFAULT_ISSUER: &str = "helpdesk-api";

/// Configuration for access token issuing and validation.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    /// Access token lifetime in seconds (default: 900 = 15 minutes)
    pub access_token_expiry_secs: i64,
    /// Leeway in seconds for clock skew tolerance (default: 30)
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl JwtConfig {
    /// Creates a codec from a shared secret with the default leeway.
    ///
    /// # Arguments
    /// * `secret` - HMAC secret, at least 32 bytes
    /// * `issuer` - Value of the `iss` claim
    /// * `access_token_expiry_secs` - Access token lifetime in seconds
    pub fn new(
        secret: &str,
        issuer: &str,
        access_token_expiry_secs: i64,
    ) -> Result<Self, JwtError> {
        Self::with_leeway(secret, issuer, access_token_expiry_secs, DEFAULT_LEEWAY_SECS)
    }

    /// Creates a codec from a shared secret with a custom leeway.
    ///
    /// Rejects secrets shorter than [`MIN_SECRET_BYTES`], a leeway above
    /// [`MAX_LEEWAY_SECS`] and non-positive lifetimes.
    pub fn with_leeway(
        secret: &str,
        issuer: &str,
        access_token_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(JwtError::InvalidKey(format!(
                "secret must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }
        if leeway_secs > MAX_LEEWAY_SECS {
            return Err(JwtError::InvalidConfig(format!(
                "leeway must not exceed {} seconds",
                MAX_LEEWAY_SECS
            )));
        }
        if access_token_expiry_secs <= 0 {
            return Err(JwtError::InvalidConfig(
                "access token lifetime must be positive".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            access_token_expiry_secs,
            leeway_secs,
        })
    }

    /// Returns the issuer this codec stamps and expects.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issues an access token for the given identity.
    ///
    /// `student_id` is dropped unless `role` is `student`.
    pub fn issue_access_token(
        &self,
        user_id: Uuid,
        role: &str,
        student_id: Option<&str>,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            student_id: if role == "student" {
                student_id.map(str::to_string)
            } else {
                None
            },
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry_secs)).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates an access token and returns its claims.
    ///
    /// Fails on signature mismatch, any algorithm other than HS256, expiry,
    /// wrong issuer, malformed input, or an unexpected claim set.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "sub", "iss"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm
                | jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

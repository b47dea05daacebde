//! Identity service: account lifecycle and token issuance.
//!
//! Every operation runs as one unit of work inside a single `run_system`
//! transaction, except `me` (authenticated read) and access token
//! validation (no database access).

use chrono::{Duration, Utc};
use domain::models::{
    user::normalize_email, user::validate_password, AuthContext, RefreshToken, Registration,
    Role, SingleUseToken, TokenPurpose, TokenRejection, User, UserError,
};
use domain::services::{EmailMessage, EmailSender, EmailTemplate};
use metrics::counter;
use persistence::repositories::{
    is_unique_violation, RefreshTokenRepository, SingleUseTokenRepository, UserRepository,
};
use persistence::TxManager;
use serde::Serialize;
use shared::crypto::{generate_token_pair, sha256_hex};
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{hash_password, verify_against_dummy, verify_password, PasswordError};
use sqlx::PgConnection;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] UserError),

    #[error("email already exists")]
    EmailAlreadyExists,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("account is not active")]
    AccountInactive,

    #[error("email address has not been verified")]
    EmailNotVerified,

    #[error("invalid refresh token")]
    InvalidRefreshToken,

    #[error("refresh token has expired")]
    RefreshTokenExpired,

    #[error("refresh token reuse detected, all sessions revoked")]
    TokenReuse,

    #[error("invalid or expired token")]
    InvalidAccessToken,

    #[error("missing authentication context")]
    MissingAuthContext,

    #[error("current password is incorrect")]
    PasswordMismatch,

    #[error("new password must be different from current password")]
    PasswordSameAsOld,

    #[error("invalid verification token")]
    VerificationTokenInvalid,

    #[error("verification token has expired")]
    VerificationTokenExpired,

    #[error("verification token has already been used")]
    VerificationTokenUsed,

    #[error("email is already verified")]
    EmailAlreadyVerified,

    #[error("failed to send verification email")]
    SendVerificationFailed,

    #[error("failed to send password reset email")]
    SendResetFailed,

    #[error("user not found")]
    UserNotFound,

    #[error("invalid password reset token")]
    ResetTokenInvalid,

    #[error("password reset token has expired")]
    ResetTokenExpired,

    #[error("password reset token has already been used")]
    ResetTokenUsed,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl AuthError {
    /// Label for the `auth_logins_total` counter.
    fn login_outcome(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AccountInactive => "inactive",
            AuthError::EmailNotVerified => "unverified",
            _ => "error",
        }
    }
}

/// Access token plus the raw refresh token. The raw refresh token leaves the
/// service only through this value.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl TokenPair {
    fn bearer(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

/// Lifetimes and link settings used by the identity flows.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub refresh_token_ttl_secs: i64,
    pub verification_ttl_secs: i64,
    pub password_reset_ttl_secs: i64,
    pub from_email: String,
    pub frontend_url: String,
}

impl AuthSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            refresh_token_ttl_secs: config.jwt.refresh_token_ttl_secs,
            verification_ttl_secs: config.tokens.verification_ttl_secs,
            password_reset_ttl_secs: config.tokens.password_reset_ttl_secs,
            from_email: config.email.from_email.clone(),
            frontend_url: config.email.frontend_url.trim_end_matches('/').to_string(),
        }
    }
}

enum RefreshOutcome {
    Rotated(TokenPair),
    ReuseDetected { user_id: Uuid, revoked: u64 },
}

/// Identity service.
pub struct AuthService {
    tx: TxManager,
    jwt: Arc<JwtConfig>,
    email_sender: Arc<dyn EmailSender>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        tx: TxManager,
        jwt: Arc<JwtConfig>,
        email_sender: Arc<dyn EmailSender>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            tx,
            jwt,
            email_sender,
            settings,
        }
    }

    /// Registers an account and sends the verification email.
    ///
    /// A failed send rolls the registration back.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<User, AuthError> {
        let registration = Registration::parse(email, password, role)?;
        let digest = hash_password(password)?;

        let (raw_token, token_hash) = generate_token_pair();
        let expires_at = Utc::now() + Duration::seconds(self.settings.verification_ttl_secs);
        let message = self.verification_message(&registration.email, &raw_token);
        let sender = Arc::clone(&self.email_sender);

        let user = self
            .tx
            .run_system(move |conn| {
                Box::pin(async move {
                    if UserRepository::find_by_email(conn, &registration.email)
                        .await?
                        .is_some()
                    {
                        return Err(AuthError::EmailAlreadyExists);
                    }

                    let user: User = UserRepository::create(
                        conn,
                        &registration.email,
                        &digest,
                        registration.role,
                    )
                    .await
                    .map_err(|e| {
                        if is_unique_violation(&e) {
                            AuthError::EmailAlreadyExists
                        } else {
                            AuthError::DatabaseError(e)
                        }
                    })?
                    .into();

                    SingleUseTokenRepository::create(
                        conn,
                        user.id,
                        &token_hash,
                        TokenPurpose::VerifyEmail,
                        expires_at,
                    )
                    .await?;

                    sender.send(message).await.map_err(|e| {
                        error!(error = %e, "Failed to send verification email");
                        AuthError::SendVerificationFailed
                    })?;

                    Ok::<_, AuthError>(user)
                })
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Exchanges credentials for a token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let email = normalize_email(email);
        let password = password.to_string();
        let jwt = Arc::clone(&self.jwt);
        let refresh_ttl = self.settings.refresh_token_ttl_secs;

        let result = self
            .tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let user: User = match UserRepository::find_by_email(conn, &email).await? {
                        Some(entity) => entity.into(),
                        None => {
                            verify_against_dummy(&password);
                            return Err(AuthError::InvalidCredentials);
                        }
                    };

                    if !verify_password(&password, &user.password_digest)? {
                        return Err(AuthError::InvalidCredentials);
                    }
                    if !user.is_active {
                        return Err(AuthError::AccountInactive);
                    }
                    if !user.is_verified() {
                        return Err(AuthError::EmailNotVerified);
                    }

                    let (pair, _) = issue_session(conn, &jwt, &user, refresh_ttl).await?;
                    Ok::<_, AuthError>((user.id, pair))
                })
            })
            .await;

        match result {
            Ok((user_id, pair)) => {
                counter!("auth_logins_total", "outcome" => "success").increment(1);
                info!(user_id = %user_id, "User logged in");
                Ok(pair)
            }
            Err(e) => {
                counter!("auth_logins_total", "outcome" => e.login_outcome()).increment(1);
                warn!(reason = e.login_outcome(), "Login rejected");
                Err(e)
            }
        }
    }

    /// Rotates a refresh token.
    ///
    /// Presenting a revoked token proves theft: every live token of the user
    /// is revoked, the revocation is committed, and `TokenReuse` is returned.
    pub async fn refresh(&self, raw_refresh: &str) -> Result<TokenPair, AuthError> {
        let token_hash = sha256_hex(raw_refresh);
        let jwt = Arc::clone(&self.jwt);
        let refresh_ttl = self.settings.refresh_token_ttl_secs;

        let outcome = self
            .tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let stored: RefreshToken =
                        RefreshTokenRepository::find_by_hash_for_update(conn, &token_hash)
                            .await?
                            .ok_or(AuthError::InvalidRefreshToken)?
                            .into();

                    if stored.is_revoked() {
                        let revoked =
                            RefreshTokenRepository::revoke_all_for_user(conn, stored.user_id)
                                .await?;
                        return Ok(RefreshOutcome::ReuseDetected {
                            user_id: stored.user_id,
                            revoked,
                        });
                    }

                    if stored.is_expired(Utc::now()) {
                        return Err(AuthError::RefreshTokenExpired);
                    }

                    let user: User = UserRepository::find_by_id(conn, stored.user_id)
                        .await?
                        .ok_or(AuthError::InvalidRefreshToken)?
                        .into();

                    let (pair, successor_id) =
                        issue_session(conn, &jwt, &user, refresh_ttl).await?;
                    RefreshTokenRepository::revoke(conn, stored.id, Some(successor_id)).await?;

                    Ok::<_, AuthError>(RefreshOutcome::Rotated(pair))
                })
            })
            .await?;

        match outcome {
            RefreshOutcome::Rotated(pair) => Ok(pair),
            RefreshOutcome::ReuseDetected { user_id, revoked } => {
                counter!("refresh_token_reuse_total").increment(1);
                warn!(
                    user_id = %user_id,
                    revoked = revoked,
                    "Refresh token reuse detected, all sessions revoked"
                );
                Err(AuthError::TokenReuse)
            }
        }
    }

    /// Revokes a refresh token. Unknown and already revoked tokens succeed.
    pub async fn logout(&self, raw_refresh: &str) -> Result<(), AuthError> {
        let token_hash = sha256_hex(raw_refresh);

        self.tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let stored = RefreshTokenRepository::find_by_hash_for_update(conn, &token_hash)
                        .await?
                        .map(RefreshToken::from);

                    if let Some(token) = stored.filter(|t| !t.is_revoked()) {
                        RefreshTokenRepository::revoke(conn, token.id, None).await?;
                        info!(user_id = %token.user_id, "User logged out");
                    }

                    Ok::<_, AuthError>(())
                })
            })
            .await
    }

    /// Marks the email of the token's owner as verified.
    pub async fn verify_email(&self, raw_token: &str) -> Result<(), AuthError> {
        let token_hash = sha256_hex(raw_token);

        let user_id = self
            .tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let token: SingleUseToken = SingleUseTokenRepository::find_by_hash_for_update(
                        conn,
                        &token_hash,
                        TokenPurpose::VerifyEmail,
                    )
                    .await?
                    .ok_or(AuthError::VerificationTokenInvalid)?
                    .into();

                    token
                        .check_usable(Utc::now())
                        .map_err(|rejection| match rejection {
                            TokenRejection::Used => AuthError::VerificationTokenUsed,
                            TokenRejection::Expired => AuthError::VerificationTokenExpired,
                        })?;

                    let mut user: User = UserRepository::find_by_id(conn, token.user_id)
                        .await?
                        .ok_or(AuthError::UserNotFound)?
                        .into();

                    if user.is_verified() {
                        return Err(AuthError::EmailAlreadyVerified);
                    }

                    let now = Utc::now();
                    user.email_verified_at = Some(now);
                    user.updated_at = Some(now);
                    UserRepository::update(conn, &user)
                        .await?
                        .ok_or(AuthError::UserNotFound)?;

                    SingleUseTokenRepository::invalidate_all_for_user(
                        conn,
                        user.id,
                        TokenPurpose::VerifyEmail,
                    )
                    .await?;

                    Ok::<_, AuthError>(user.id)
                })
            })
            .await?;

        info!(user_id = %user_id, "Email verified");
        Ok(())
    }

    /// Replaces every outstanding verification token with a fresh one and
    /// sends it.
    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);
        let (raw_token, token_hash) = generate_token_pair();
        let expires_at = Utc::now() + Duration::seconds(self.settings.verification_ttl_secs);
        let message = self.verification_message(&email, &raw_token);
        let sender = Arc::clone(&self.email_sender);

        self.tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let user: User = UserRepository::find_by_email(conn, &email)
                        .await?
                        .ok_or(AuthError::UserNotFound)?
                        .into();

                    if user.is_verified() {
                        return Err(AuthError::EmailAlreadyVerified);
                    }

                    SingleUseTokenRepository::invalidate_all_for_user(
                        conn,
                        user.id,
                        TokenPurpose::VerifyEmail,
                    )
                    .await?;
                    SingleUseTokenRepository::create(
                        conn,
                        user.id,
                        &token_hash,
                        TokenPurpose::VerifyEmail,
                        expires_at,
                    )
                    .await?;

                    sender.send(message).await.map_err(|e| {
                        error!(error = %e, "Failed to resend verification email");
                        AuthError::SendVerificationFailed
                    })?;

                    Ok::<_, AuthError>(())
                })
            })
            .await
    }

    /// Replaces the caller's password and revokes all of their sessions.
    pub async fn change_password(
        &self,
        auth: &AuthContext,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;
        let new_digest = hash_password(new_password)?;
        let user_id = auth.user_id;
        let current_password = current_password.to_string();
        let new_password = new_password.to_string();

        let revoked = self
            .tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let mut user: User = UserRepository::find_by_id(conn, user_id)
                        .await?
                        .ok_or(AuthError::UserNotFound)?
                        .into();

                    if !verify_password(&current_password, &user.password_digest)? {
                        return Err(AuthError::PasswordMismatch);
                    }
                    if verify_password(&new_password, &user.password_digest)? {
                        return Err(AuthError::PasswordSameAsOld);
                    }

                    user.password_digest = new_digest;
                    user.updated_at = Some(Utc::now());
                    UserRepository::update(conn, &user)
                        .await?
                        .ok_or(AuthError::UserNotFound)?;

                    let revoked = RefreshTokenRepository::revoke_all_for_user(conn, user.id).await?;
                    Ok::<_, AuthError>(revoked)
                })
            })
            .await?;

        info!(user_id = %user_id, revoked = revoked, "Password changed");
        Ok(())
    }

    /// Sends a password reset link.
    ///
    /// Unknown or inactive accounts succeed silently so the response does
    /// not reveal which emails are registered.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);
        let (raw_token, token_hash) = generate_token_pair();
        let expires_at = Utc::now() + Duration::seconds(self.settings.password_reset_ttl_secs);
        let message = self.reset_message(&email, &raw_token);
        let sender = Arc::clone(&self.email_sender);

        self.tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let user: User = match UserRepository::find_by_email(conn, &email).await? {
                        Some(entity) => entity.into(),
                        None => return Ok(()),
                    };
                    if !user.is_active {
                        return Ok(());
                    }

                    SingleUseTokenRepository::invalidate_all_for_user(
                        conn,
                        user.id,
                        TokenPurpose::ResetPassword,
                    )
                    .await?;
                    SingleUseTokenRepository::create(
                        conn,
                        user.id,
                        &token_hash,
                        TokenPurpose::ResetPassword,
                        expires_at,
                    )
                    .await?;

                    sender.send(message).await.map_err(|e| {
                        error!(error = %e, "Failed to send password reset email");
                        AuthError::SendResetFailed
                    })?;

                    info!(user_id = %user.id, "Password reset requested");
                    Ok::<_, AuthError>(())
                })
            })
            .await
    }

    /// Sets a new password from a reset token and revokes all sessions.
    pub async fn reset_password(
        &self,
        raw_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;
        let new_digest = hash_password(new_password)?;
        let token_hash = sha256_hex(raw_token);

        let user_id = self
            .tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let token: SingleUseToken = SingleUseTokenRepository::find_by_hash_for_update(
                        conn,
                        &token_hash,
                        TokenPurpose::ResetPassword,
                    )
                    .await?
                    .ok_or(AuthError::ResetTokenInvalid)?
                    .into();

                    token
                        .check_usable(Utc::now())
                        .map_err(|rejection| match rejection {
                            TokenRejection::Used => AuthError::ResetTokenUsed,
                            TokenRejection::Expired => AuthError::ResetTokenExpired,
                        })?;

                    let mut user: User = UserRepository::find_by_id(conn, token.user_id)
                        .await?
                        .ok_or(AuthError::ResetTokenInvalid)?
                        .into();

                    user.password_digest = new_digest;
                    user.updated_at = Some(Utc::now());
                    UserRepository::update(conn, &user)
                        .await?
                        .ok_or(AuthError::UserNotFound)?;

                    // Marks this token used along with any siblings.
                    SingleUseTokenRepository::invalidate_all_for_user(
                        conn,
                        user.id,
                        TokenPurpose::ResetPassword,
                    )
                    .await?;
                    RefreshTokenRepository::revoke_all_for_user(conn, user.id).await?;

                    Ok::<_, AuthError>(user.id)
                })
            })
            .await?;

        info!(user_id = %user_id, "Password reset");
        Ok(())
    }

    /// Returns the caller's own user record, read under row-level policies.
    pub async fn me(&self, auth: &AuthContext) -> Result<User, AuthError> {
        let user_id = auth.user_id;

        self.tx
            .run_authenticated(auth, move |conn| {
                Box::pin(async move {
                    let user = UserRepository::find_by_id(conn, user_id)
                        .await?
                        .ok_or(AuthError::UserNotFound)?;
                    Ok::<_, AuthError>(User::from(user))
                })
            })
            .await
    }

    /// Validates an access token and returns the caller it names.
    pub fn validate_access_token(&self, raw: &str) -> Result<AuthContext, AuthError> {
        let claims = self.jwt.validate_access_token(raw).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            AuthError::InvalidAccessToken
        })?;

        let user_id = claims
            .user_id()
            .map_err(|_| AuthError::InvalidAccessToken)?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| AuthError::InvalidAccessToken)?;

        Ok(AuthContext::new(user_id, role, claims.student_id))
    }

    fn verification_message(&self, email: &str, raw_token: &str) -> EmailMessage {
        let mut variables = HashMap::new();
        variables.insert(
            "VERIFICATION_URL".to_string(),
            format!(
                "{}/verify-email?token={}",
                self.settings.frontend_url, raw_token
            ),
        );
        variables.insert("USER_EMAIL".to_string(), email.to_string());

        EmailMessage::from_template(
            EmailTemplate::VerifyEmail,
            &self.settings.from_email,
            email,
            variables,
        )
    }

    fn reset_message(&self, email: &str, raw_token: &str) -> EmailMessage {
        let mut variables = HashMap::new();
        variables.insert(
            "RESET_URL".to_string(),
            format!(
                "{}/reset-password?token={}",
                self.settings.frontend_url, raw_token
            ),
        );
        variables.insert("USER_EMAIL".to_string(), email.to_string());

        EmailMessage::from_template(
            EmailTemplate::PasswordReset,
            &self.settings.from_email,
            email,
            variables,
        )
    }
}

/// Issues an access token and stores a fresh refresh token.
///
/// Returns the pair and the id of the stored refresh token.
async fn issue_session(
    conn: &mut PgConnection,
    jwt: &JwtConfig,
    user: &User,
    refresh_ttl_secs: i64,
) -> Result<(TokenPair, Uuid), AuthError> {
    let student_id = match user.role {
        Role::Student => UserRepository::find_student_by_email(conn, &user.email)
            .await?
            .map(|student| student.student_id.to_string()),
        Role::Admin => None,
    };

    let access_token =
        jwt.issue_access_token(user.id, user.role.as_str(), student_id.as_deref())?;

    let (raw_refresh, refresh_hash) = generate_token_pair();
    let expires_at = Utc::now() + Duration::seconds(refresh_ttl_secs);
    let stored = RefreshTokenRepository::create(conn, user.id, &refresh_hash, expires_at).await?;

    Ok((
        TokenPair::bearer(access_token, raw_refresh, jwt.access_token_expiry_secs),
        stored.id,
    ))
}

//! Email dispatch contract.
//!
//! The identity flows only know `send(message)`; rendering and transport
//! belong to the concrete sender.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("email template error: {0}")]
    Template(String),

    #[error("email provider error: {0}")]
    Provider(String),

    #[error("email transport error: {0}")]
    Transport(String),
}

/// Known email templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplate {
    VerifyEmail,
    PasswordReset,
}

impl EmailTemplate {
    pub fn id(&self) -> &'static str {
        match self {
            EmailTemplate::VerifyEmail => "verify_email",
            EmailTemplate::PasswordReset => "password_reset",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "verify_email" => Some(EmailTemplate::VerifyEmail),
            "password_reset" => Some(EmailTemplate::PasswordReset),
            _ => None,
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            EmailTemplate::VerifyEmail => "Verify Your Email - DCIT Help Desk",
            EmailTemplate::PasswordReset => "Reset Your Password - DCIT Help Desk",
        }
    }

    pub fn required_variables(&self) -> &'static [&'static str] {
        match self {
            EmailTemplate::VerifyEmail => &["VERIFICATION_URL", "USER_EMAIL"],
            EmailTemplate::PasswordReset => &["RESET_URL", "USER_EMAIL"],
        }
    }

    fn text_body(&self) -> &'static str {
        match self {
            EmailTemplate::VerifyEmail => {
                "Hello {{USER_EMAIL}},\n\n\
                 Confirm your DCIT Help Desk account by opening the link below:\n\n\
                 {{VERIFICATION_URL}}\n\n\
                 If you did not create an account you can ignore this email.\n"
            }
            EmailTemplate::PasswordReset => {
                "Hello {{USER_EMAIL}},\n\n\
                 A password reset was requested for your DCIT Help Desk account. \
                 Open the link below to choose a new password:\n\n\
                 {{RESET_URL}}\n\n\
                 If you did not request a reset you can ignore this email.\n"
            }
        }
    }

    fn html_body(&self) -> &'static str {
        match self {
            EmailTemplate::VerifyEmail => {
                "<p>Hello {{USER_EMAIL}},</p>\
                 <p>Confirm your DCIT Help Desk account by clicking the link below:</p>\
                 <p><a href=\"{{VERIFICATION_URL}}\">Verify email</a></p>\
                 <p>If you did not create an account you can ignore this email.</p>"
            }
            EmailTemplate::PasswordReset => {
                "<p>Hello {{USER_EMAIL}},</p>\
                 <p>A password reset was requested for your DCIT Help Desk account.</p>\
                 <p><a href=\"{{RESET_URL}}\">Reset password</a></p>\
                 <p>If you did not request a reset you can ignore this email.</p>"
            }
        }
    }
}

/// Message handed to an [`EmailSender`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub template_id: String,
    pub variables: HashMap<String, String>,
}

impl EmailMessage {
    pub fn from_template(
        template: EmailTemplate,
        from: &str,
        to: &str,
        variables: HashMap<String, String>,
    ) -> Self {
        Self {
            from: from.to_string(),
            to: vec![to.to_string()],
            subject: template.subject().to_string(),
            template_id: template.id().to_string(),
            variables,
        }
    }
}

/// Rendered bodies of a templated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub html: String,
    pub text: String,
}

/// Renders a message's template with its variables.
pub fn render(message: &EmailMessage) -> Result<RenderedEmail, EmailError> {
    let template = EmailTemplate::from_id(&message.template_id)
        .ok_or_else(|| EmailError::Template(format!("unknown template: {}", message.template_id)))?;

    let mut html = template.html_body().to_string();
    let mut text = template.text_body().to_string();
    for name in template.required_variables() {
        let value = message
            .variables
            .get(*name)
            .ok_or_else(|| EmailError::Template(format!("missing variable: {}", name)))?;
        let placeholder = format!("{{{{{}}}}}", name);
        html = html.replace(&placeholder, value);
        text = text.replace(&placeholder, value);
    }

    Ok(RenderedEmail { html, text })
}

/// Sends templated email. Returns the provider's message id.
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<String, EmailError>;
}

/// In-memory sender that records every message.
#[derive(Debug, Clone, Default)]
pub struct MockEmailSender {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock sender whose every send fails.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Messages accepted so far, oldest first.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Variable `name` of the most recent message sent to `to`.
    pub fn last_variable_for(&self, to: &str, name: &str) -> Option<String> {
        self.sent()
            .iter()
            .rev()
            .find(|m| m.to.iter().any(|addr| addr == to))
            .and_then(|m| m.variables.get(name).cloned())
    }
}

#[async_trait::async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<String, EmailError> {
        if self.simulate_failure {
            tracing::warn!(
                template_id = %message.template_id,
                "Mock email sender simulating failure"
            );
            return Err(EmailError::Provider("Simulated failure".to_string()));
        }

        render(&message)?;
        tracing::info!(
            template_id = %message.template_id,
            recipients = message.to.len(),
            "Mock: Would send email"
        );

        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message);
        Ok(Uuid::new_v4().to_string())
    }
}

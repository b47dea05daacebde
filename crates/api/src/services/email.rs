//! Email delivery.
//!
//! Supports two providers:
//! - `console`: logs the rendered message (development)
//! - `resend`: posts the rendered message to the Resend HTTP API

use async_trait::async_trait;
use domain::services::{render, EmailError, EmailMessage, EmailSender};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::EmailConfig;

/// Builds the sender selected by `email.provider`.
pub fn build_email_sender(config: &EmailConfig) -> Result<Arc<dyn EmailSender>, EmailError> {
    match config.provider.as_str() {
        "console" => Ok(Arc::new(ConsoleEmailSender)),
        "resend" => Ok(Arc::new(ResendEmailSender::new(config)?)),
        provider => Err(EmailError::Provider(format!(
            "unknown email provider: {}",
            provider
        ))),
    }
}

/// Logs every message instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct ConsoleEmailSender;

#[async_trait]
impl EmailSender for ConsoleEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<String, EmailError> {
        let rendered = render(&message)?;
        let id = Uuid::new_v4().to_string();

        info!(
            message_id = %id,
            from = %message.from,
            to = ?message.to,
            subject = %message.subject,
            template_id = %message.template_id,
            "Email (console provider)"
        );
        debug!(body_text = %rendered.text, "Email body (plain text)");
        debug!(body_html_length = rendered.html.len(), "Email body (HTML)");

        Ok(id)
    }
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: String,
}

/// Delivers through the Resend API.
pub struct ResendEmailSender {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ResendEmailSender {
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        if config.resend_api_key.is_empty() {
            return Err(EmailError::Provider("resend API key is not configured".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.resend_api_key.clone(),
            endpoint: format!("{}/emails", config.resend_base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<String, EmailError> {
        let rendered = render(&message)?;
        let body = ResendRequest {
            from: &message.from,
            to: &message.to,
            subject: &message.subject,
            html: &rendered.html,
            text: &rendered.text,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::Transport(format!("Resend request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_body, "Resend API error");
            return Err(EmailError::Provider(format!(
                "Resend returned {}: {}",
                status, error_body
            )));
        }

        let sent: ResendResponse = response
            .json()
            .await
            .map_err(|e| EmailError::Provider(format!("invalid Resend response: {}", e)))?;

        info!(
            message_id = %sent.id,
            template_id = %message.template_id,
            recipients = message.to.len(),
            "Email sent via Resend"
        );
        Ok(sent.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use domain::services::EmailTemplate;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn config(provider: &str, base_url: &str, api_key: &str) -> EmailConfig {
        EmailConfig {
            provider: provider.to_string(),
            from_email: "noreply@uwi.edu".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            resend_api_key: api_key.to_string(),
            resend_base_url: base_url.to_string(),
            timeout_secs: 5,
        }
    }

    fn message() -> EmailMessage {
        let mut vars = HashMap::new();
        vars.insert(
            "RESET_URL".to_string(),
            "http://localhost:5173/reset-password?token=abc".to_string(),
        );
        vars.insert("USER_EMAIL".to_string(), "s@my.uwi.edu".to_string());
        EmailMessage::from_template(
            EmailTemplate::PasswordReset,
            "noreply@uwi.edu",
            "s@my.uwi.edu",
            vars,
        )
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_console_sender_returns_id() {
        let id = ConsoleEmailSender.send(message()).await.unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn test_console_sender_rejects_missing_variable() {
        let mut msg = message();
        msg.variables.remove("RESET_URL");
        let err = ConsoleEmailSender.send(msg).await.unwrap_err();
        assert!(matches!(err, EmailError::Template(_)));
    }

    #[test]
    fn test_build_rejects_unknown_provider() {
        assert!(build_email_sender(&config("carrier-pigeon", "", "")).is_err());
        assert!(build_email_sender(&config("resend", "http://localhost", "")).is_err());
        assert!(build_email_sender(&config("console", "", "")).is_ok());
    }

    #[tokio::test]
    async fn test_resend_posts_rendered_message() {
        let router = Router::new().route(
            "/emails",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer re_test");
                let rendered = body["html"]
                    .as_str()
                    .is_some_and(|h| h.contains("reset-password?token=abc"));
                if authorized && rendered && body["to"][0] == "s@my.uwi.edu" {
                    (StatusCode::OK, Json(json!({"id": "msg_123"})))
                } else {
                    (StatusCode::BAD_REQUEST, Json(json!({"message": "bad"})))
                }
            }),
        );
        let base = serve(router).await;
        let sender = ResendEmailSender::new(&config("resend", &base, "re_test")).unwrap();

        assert_eq!(sender.send(message()).await.unwrap(), "msg_123");
    }

    #[tokio::test]
    async fn test_resend_error_status_is_provider_error() {
        let router = Router::new().route(
            "/emails",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid key") }),
        );
        let base = serve(router).await;
        let sender = ResendEmailSender::new(&config("resend", &base, "re_bad")).unwrap();

        let err = sender.send(message()).await.unwrap_err();
        assert!(matches!(err, EmailError::Provider(_)));
    }
}

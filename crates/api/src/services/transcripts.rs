//! HTTP client for the transcript extraction service.

use async_trait::async_trait;
use domain::models::TranscriptRecord;
use domain::services::{TranscriptError, TranscriptExtractor};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::config::TranscriptsServiceConfig;

const HEALTH_PATH: &str = "/api/v1/healthy";
const EXTRACT_PATH: &str = "/api/v1/transcripts/extract";

pub struct HttpTranscriptExtractor {
    client: Client,
    base_url: String,
}

impl HttpTranscriptExtractor {
    pub fn new(config: &TranscriptsServiceConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn check_health(&self) -> Result<(), TranscriptError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, HEALTH_PATH))
            .send()
            .await
            .map_err(|e| TranscriptError::Unavailable(format!("health check failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(TranscriptError::Unavailable(format!(
                "health check returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TranscriptExtractor for HttpTranscriptExtractor {
    async fn extract(
        &self,
        filename: &str,
        pdf_bytes: Vec<u8>,
    ) -> Result<TranscriptRecord, TranscriptError> {
        self.check_health().await?;

        debug!(filename = %filename, size = pdf_bytes.len(), "Extracting transcript");

        let part = Part::bytes(pdf_bytes)
            .file_name(filename.to_string())
            .mime_str("application/pdf")
            .map_err(|e| TranscriptError::Internal(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}{}", self.base_url, EXTRACT_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptError::Invalid(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptError::Internal(format!("HTTP {}: {}", status, body)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TranscriptError::Unavailable(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| TranscriptError::UnmarshalResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Multipart;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn extractor(base_url: String) -> HttpTranscriptExtractor {
        HttpTranscriptExtractor::new(&TranscriptsServiceConfig {
            base_url,
            timeout_secs: 5,
        })
        .unwrap()
    }

    async fn echo_upload(mut multipart: Multipart) -> (AxumStatus, Json<serde_json::Value>) {
        while let Ok(Some(field)) = multipart.next_field().await {
            if field.name() == Some("file") && field.content_type() == Some("application/pdf") {
                return (
                    AxumStatus::OK,
                    Json(json!({
                        "first_name": "Jane",
                        "last_name": "Doe",
                        "student_id": "816000001",
                        "current_programme": "BSc Computer Science",
                        "major": "Computer Science",
                        "current_term": "2024/2025 Semester I",
                        "current_year": 2,
                        "degree_gpa": 3.6,
                        "courses": [{"code": "COMP1601", "title": "Programming I", "grade": "A"}]
                    })),
                );
            }
        }
        (AxumStatus::BAD_REQUEST, Json(json!({})))
    }

    #[tokio::test]
    async fn test_extract_uploads_pdf_part() {
        let router = Router::new()
            .route(HEALTH_PATH, get(|| async { "OK" }))
            .route(EXTRACT_PATH, post(echo_upload));
        let record = extractor(serve(router).await)
            .extract("transcript.pdf", b"%PDF-1.4".to_vec())
            .await
            .unwrap();

        assert_eq!(record.student_id, "816000001");
        assert_eq!(record.graded_course_codes(), vec!["COMP1601"]);
        assert_eq!(record.overall_gpa, None);
    }

    #[tokio::test]
    async fn test_unprocessable_is_invalid() {
        let router = Router::new()
            .route(HEALTH_PATH, get(|| async { "OK" }))
            .route(
                EXTRACT_PATH,
                post(|| async { (AxumStatus::UNPROCESSABLE_ENTITY, "not a transcript") }),
            );
        let err = extractor(serve(router).await)
            .extract("x.pdf", b"%PDF".to_vec())
            .await
            .unwrap_err();
        assert_eq!(err, TranscriptError::Invalid("not a transcript".to_string()));
    }

    #[tokio::test]
    async fn test_unhealthy_service_is_unavailable() {
        let router = Router::new().route(
            HEALTH_PATH,
            get(|| async { AxumStatus::INTERNAL_SERVER_ERROR }),
        );
        let err = extractor(serve(router).await)
            .extract("x.pdf", b"%PDF".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, TranscriptError::Unavailable(_)));
    }
}

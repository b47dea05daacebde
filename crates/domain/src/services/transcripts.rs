//! Contract for the transcript extraction service.

use thiserror::Error;

use crate::models::transcript::{TranscriptCourse, TranscriptRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("invalid transcript format: {0}")]
    Invalid(String),

    #[error("transcripts service is not available: {0}")]
    Unavailable(String),

    #[error("transcripts service internal error: {0}")]
    Internal(String),

    #[error("failed to decode transcripts response: {0}")]
    UnmarshalResponse(String),
}

/// Turns an uploaded PDF transcript into a structured record.
#[async_trait::async_trait]
pub trait TranscriptExtractor: Send + Sync {
    async fn extract(
        &self,
        filename: &str,
        pdf_bytes: Vec<u8>,
    ) -> Result<TranscriptRecord, TranscriptError>;
}

/// Mock extractor for development and testing.
#[derive(Debug, Clone, Default)]
pub struct MockTranscriptExtractor {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
}

impl MockTranscriptExtractor {
    pub fn new() -> Self {
        Self {
            simulate_failure: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
        }
    }
}

#[async_trait::async_trait]
impl TranscriptExtractor for MockTranscriptExtractor {
    async fn extract(
        &self,
        filename: &str,
        pdf_bytes: Vec<u8>,
    ) -> Result<TranscriptRecord, TranscriptError> {
        if self.simulate_failure {
            tracing::warn!(filename = %filename, "Mock transcript extractor simulating failure");
            return Err(TranscriptError::Unavailable("Simulated failure".to_string()));
        }
        if pdf_bytes.is_empty() {
            return Err(TranscriptError::Invalid("empty file".to_string()));
        }

        tracing::info!(filename = %filename, size = pdf_bytes.len(), "Mock: Would extract transcript");

        Ok(TranscriptRecord {
            first_name: "Test".to_string(),
            middle_name: String::new(),
            last_name: "Student".to_string(),
            student_id: "816000000".to_string(),
            current_programme: "BSc Computer Science".to_string(),
            major: "Computer Science".to_string(),
            current_term: "2024/2025 Semester I".to_string(),
            current_year: 2,
            degree_gpa: Some(3.5),
            overall_gpa: Some(3.5),
            courses: vec![TranscriptCourse {
                code: "COMP1600".to_string(),
                title: "Introduction to Computing Concepts".to_string(),
                grade: Some("A".to_string()),
                credits: Some(3.0),
                term: Some("2023/2024 Semester I".to_string()),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_extract() {
        let extractor = MockTranscriptExtractor::new();
        let record = extractor.extract("t.pdf", b"%PDF-1.4".to_vec()).await.unwrap();
        assert_eq!(record.graded_course_codes(), vec!["COMP1600"]);
    }

    #[tokio::test]
    async fn test_mock_rejects_empty_file() {
        let extractor = MockTranscriptExtractor::new();
        let err = extractor.extract("t.pdf", Vec::new()).await.unwrap_err();
        assert!(matches!(err, TranscriptError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let extractor = MockTranscriptExtractor::failing();
        assert!(extractor.extract("t.pdf", b"x".to_vec()).await.is_err());
    }
}

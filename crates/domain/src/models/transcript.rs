//! Structured academic record returned by the transcript extraction service.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptCourse {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub credits: Option<f64>,
    #[serde(default)]
    pub term: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub student_id: String,
    pub current_programme: String,
    pub major: String,
    pub current_term: String,
    pub current_year: i32,
    #[serde(default)]
    pub degree_gpa: Option<f64>,
    #[serde(default)]
    pub overall_gpa: Option<f64>,
    #[serde(default)]
    pub courses: Vec<TranscriptCourse>,
}

impl TranscriptRecord {
    /// Course codes passed with a recorded grade.
    pub fn graded_course_codes(&self) -> Vec<&str> {
        self.courses
            .iter()
            .filter(|c| c.grade.as_deref().is_some_and(|g| !g.trim().is_empty()))
            .map(|c| c.code.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal_record() {
        let body = r#"{
            "current_programme": "BSc Computer Science",
            "major": "Computer Science",
            "current_term": "2024/2025 Semester I",
            "current_year": 2,
            "degree_gpa": 3.4,
            "overall_gpa": null,
            "courses": [
                {"code": "COMP1600", "title": "Intro to Computing Concepts", "grade": "A"},
                {"code": "COMP1601", "title": "Computer Programming I", "grade": null}
            ]
        }"#;
        let record: TranscriptRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.current_year, 2);
        assert_eq!(record.degree_gpa, Some(3.4));
        assert!(record.overall_gpa.is_none());
        assert!(record.student_id.is_empty());
        assert_eq!(record.graded_course_codes(), vec!["COMP1600"]);
    }
}

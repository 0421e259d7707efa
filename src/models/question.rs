// src/models/question.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Matches a single answer-option letter.
pub static OPTION_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-D]$").expect("valid option regex"));

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub exam_id: i64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    /// The correct answer letter: 'A', 'B', 'C' or 'D'.
    pub correct_option: String,
    pub marks: i32,
}

/// DTO for sending a question to an exam taker (excludes the correct option).
#[derive(Debug, FromRow, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub marks: i32,
}

/// DTO for one question in a bulk upload.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    #[validate(length(min = 5, max = 2000, message = "Question text must be at least 5 characters."))]
    pub question_text: String,
    #[validate(length(min = 1, max = 500))]
    pub option_a: String,
    #[validate(length(min = 1, max = 500))]
    pub option_b: String,
    #[validate(length(min = 1, max = 500))]
    pub option_c: String,
    #[validate(length(min = 1, max = 500))]
    pub option_d: String,
    #[validate(regex(path = *OPTION_LETTER, message = "Correct option must be A, B, C or D."))]
    pub correct_option: String,
    #[validate(range(min = 1, message = "Marks must be at least 1."))]
    pub marks: i32,
}

/// DTO for bulk question upload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkQuestionsRequest {
    pub exam_id: i64,
    #[validate(length(min = 1, message = "At least one question is required."), nested)]
    pub questions: Vec<NewQuestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> NewQuestion {
        NewQuestion {
            question_text: "The capital city of Nigeria is?".to_string(),
            option_a: "Lagos".to_string(),
            option_b: "Abuja".to_string(),
            option_c: "Kano".to_string(),
            option_d: "Enugu".to_string(),
            correct_option: "B".to_string(),
            marks: 2,
        }
    }

    #[test]
    fn test_valid_question_passes() {
        assert!(sample_question().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_option_letter() {
        let mut q = sample_question();
        q.correct_option = "E".to_string();
        assert!(q.validate().is_err());

        q.correct_option = "a".to_string();
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_bulk_upload() {
        let req = BulkQuestionsRequest {
            exam_id: 1,
            questions: vec![],
        };
        assert!(req.validate().is_err());
    }
}

// src/models/attempt.rs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::question::OPTION_LETTER;

/// Attempt status values. The lifecycle only moves forward:
/// `in_progress` -> `submitted` | `auto_submitted`.
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_SUBMITTED: &str = "submitted";
pub const STATUS_AUTO_SUBMITTED: &str = "auto_submitted";

/// Represents the 'exam_attempts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExamAttempt {
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: String,
    /// Derived sum of marks; authoritative only once the attempt is terminal.
    pub score: i32,
    /// Opaque client-generated token pinning the attempt to one browser context.
    #[serde(skip)]
    pub session_token: String,
}

impl ExamAttempt {
    pub fn is_in_progress(&self) -> bool {
        self.status == STATUS_IN_PROGRESS
    }

    /// Wall-clock instant past which the attempt must be auto-finalized.
    pub fn deadline(&self, duration_minutes: i32) -> DateTime<Utc> {
        self.start_time + Duration::minutes(i64::from(duration_minutes))
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>, duration_minutes: i32) -> bool {
        now > self.deadline(duration_minutes)
    }
}

/// A previously saved answer, replayed to the client on attempt start.
#[derive(Debug, FromRow, Serialize)]
pub struct SavedAnswer {
    pub question_id: i64,
    pub selected_option: String,
}

/// Result row for a student viewing their own finished attempt.
#[derive(Debug, FromRow, Serialize)]
pub struct AttemptResult {
    pub id: i64,
    pub score: i32,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub title: String,
    pub duration_minutes: i32,
    pub total_marks: i64,
}

/// Result row for the admin results listing and CSV export.
#[derive(Debug, FromRow, Serialize)]
pub struct ExamResultRow {
    pub attempt_id: i64,
    pub full_name: String,
    pub matric_no: String,
    pub score: i32,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// DTO for starting (or resuming) an attempt.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartAttemptRequest {
    pub exam_id: i64,
    #[validate(length(min = 8, max = 128, message = "Session token must be at least 8 characters."))]
    pub session_token: String,
}

/// DTO for saving one answer.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub attempt_id: i64,
    pub question_id: i64,
    #[validate(regex(path = *OPTION_LETTER, message = "Selected option must be A, B, C or D."))]
    pub selected_option: String,
}

/// DTO for logging a client-observed integrity event (e.g. tab switch).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogEventRequest {
    pub attempt_id: i64,
    #[validate(length(min = 3, max = 100, message = "Event type must be at least 3 characters."))]
    pub event_type: String,
    #[validate(length(max = 1000))]
    pub detail: Option<String>,
}

/// DTO for submitting an attempt.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttemptRequest {
    pub attempt_id: i64,
}

/// Query parameters for fetching an attempt result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultQuery {
    pub attempt_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt_started_at(start: DateTime<Utc>) -> ExamAttempt {
        ExamAttempt {
            id: 1,
            exam_id: 1,
            student_id: 1,
            start_time: start,
            end_time: None,
            status: STATUS_IN_PROGRESS.to_string(),
            score: 0,
            session_token: "session-token".to_string(),
        }
    }

    #[test]
    fn test_deadline_is_start_plus_duration() {
        let start = Utc::now();
        let attempt = attempt_started_at(start);
        assert_eq!(attempt.deadline(20), start + Duration::minutes(20));
    }

    #[test]
    fn test_expiry_boundary() {
        let start = Utc::now() - Duration::minutes(30);
        let attempt = attempt_started_at(start);

        // 20-minute exam started 30 minutes ago is expired.
        assert!(attempt.is_expired_at(Utc::now(), 20));
        // Exactly at the deadline it is still live.
        assert!(!attempt.is_expired_at(attempt.deadline(30), 30));
        // A longer duration keeps it live.
        assert!(!attempt.is_expired_at(Utc::now(), 45));
    }
}

// src/models/exam.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'exams' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub title: String,
    pub subject_id: i64,
    pub duration_minutes: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// 'draft' or 'published'. Only published exams are visible to students.
    pub status: String,
    pub created_by: i64,
    pub created_at: Option<DateTime<Utc>>,
}

/// Exam row joined with its subject name, for admin listings
/// and the published-exam lookup on attempt start.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExamWithSubject {
    pub id: i64,
    pub title: String,
    pub subject_id: i64,
    pub duration_minutes: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub created_by: i64,
    pub subject_name: String,
}

impl ExamWithSubject {
    /// True when `now` falls inside the exam's scheduled window.
    /// Both boundaries count as open, matching the SQL `BETWEEN` used for
    /// the available-exams listing.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_time && now <= self.end_time
    }
}

/// Slim row for the student's list of currently available exams.
#[derive(Debug, FromRow, Serialize)]
pub struct AvailableExam {
    pub id: i64,
    pub title: String,
    pub duration_minutes: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub subject_name: String,
}

/// DTO for creating an exam.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExamRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be at least 3 characters."))]
    pub title: String,
    pub subject_id: i64,
    #[validate(range(min = 1, message = "Duration must be at least 1 minute."))]
    pub duration_minutes: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[validate(custom(function = validate_exam_status))]
    #[serde(default = "default_exam_status")]
    pub status: String,
}

fn default_exam_status() -> String {
    "draft".to_string()
}

fn validate_exam_status(status: &str) -> Result<(), validator::ValidationError> {
    if status == "draft" || status == "published" {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_exam_status"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn exam_between(start: DateTime<Utc>, end: DateTime<Utc>) -> ExamWithSubject {
        ExamWithSubject {
            id: 1,
            title: "Sample".to_string(),
            subject_id: 1,
            duration_minutes: 20,
            start_time: start,
            end_time: end,
            status: "published".to_string(),
            created_by: 1,
            subject_name: "General Knowledge".to_string(),
        }
    }

    #[test]
    fn test_window_check() {
        let now = Utc::now();
        let open = exam_between(now - Duration::hours(1), now + Duration::hours(1));
        assert!(open.is_open_at(now));

        let not_started = exam_between(now + Duration::hours(1), now + Duration::hours(2));
        assert!(!not_started.is_open_at(now));

        let closed = exam_between(now - Duration::hours(2), now - Duration::hours(1));
        assert!(!closed.is_open_at(now));
    }

    #[test]
    fn test_window_boundaries_inclusive() {
        let now = Utc::now();
        let exam = exam_between(now, now + Duration::hours(1));
        assert!(exam.is_open_at(now));
        assert!(exam.is_open_at(now + Duration::hours(1)));
    }
}

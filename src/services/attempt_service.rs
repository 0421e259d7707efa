// src/services/attempt_service.rs
//
// Exam-attempt lifecycle: fetch-or-create, per-attempt question shuffle,
// timer enforcement and finalization. Handlers stay thin and call into here.

use chrono::Utc;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        attempt::{ExamAttempt, STATUS_AUTO_SUBMITTED, STATUS_IN_PROGRESS},
        exam::ExamWithSubject,
        question::PublicQuestion,
    },
};

/// Fetches a published exam together with its subject name.
/// Draft exams are invisible to students, so this returns `None` for them too.
pub async fn get_published_exam(
    pool: &PgPool,
    exam_id: i64,
) -> Result<Option<ExamWithSubject>, AppError> {
    let exam = sqlx::query_as::<_, ExamWithSubject>(
        r#"
        SELECT e.id, e.title, e.subject_id, e.duration_minutes, e.start_time, e.end_time,
               e.status, e.created_by, s.name AS subject_name
        FROM exams e
        JOIN subjects s ON s.id = e.subject_id
        WHERE e.id = $1 AND e.status = 'published'
        "#,
    )
    .bind(exam_id)
    .fetch_optional(pool)
    .await?;

    Ok(exam)
}

/// Returns the student's attempt for the exam, creating one if none exists.
///
/// A terminal attempt is returned as-is (the handler decides how to respond).
/// An in-progress attempt under a different session token is a conflict:
/// the attempt is locked to the browser context that created it.
pub async fn get_or_create_attempt(
    pool: &PgPool,
    exam_id: i64,
    student_id: i64,
    session_token: &str,
) -> Result<ExamAttempt, AppError> {
    let existing = sqlx::query_as::<_, ExamAttempt>(
        r#"
        SELECT id, exam_id, student_id, start_time, end_time, status, score, session_token
        FROM exam_attempts
        WHERE exam_id = $1 AND student_id = $2
        ORDER BY id DESC
        LIMIT 1
        "#,
    )
    .bind(exam_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await?;

    if let Some(attempt) = existing {
        if !attempt.is_in_progress() {
            return Ok(attempt);
        }
        if attempt.session_token != session_token {
            return Err(AppError::Conflict(
                "Attempt locked to another session".to_string(),
            ));
        }
        return Ok(attempt);
    }

    let created = sqlx::query_as::<_, ExamAttempt>(
        r#"
        INSERT INTO exam_attempts (exam_id, student_id, start_time, status, session_token)
        VALUES ($1, $2, NOW(), $3, $4)
        RETURNING id, exam_id, student_id, start_time, end_time, status, score, session_token
        "#,
    )
    .bind(exam_id)
    .bind(student_id)
    .bind(STATUS_IN_PROGRESS)
    .bind(session_token)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// Returns the attempt's questions in their persisted per-attempt order.
///
/// On first access the exam's questions are fetched in random order and that
/// order is stored, so every later fetch replays the same student-specific
/// shuffle instead of re-randomizing.
pub async fn questions_for_attempt(
    pool: &PgPool,
    exam_id: i64,
    attempt_id: i64,
) -> Result<Vec<PublicQuestion>, AppError> {
    let stored = sqlx::query_as::<_, PublicQuestion>(
        r#"
        SELECT q.id, q.question_text, q.option_a, q.option_b, q.option_c, q.option_d, q.marks
        FROM attempt_question_order aq
        JOIN questions q ON q.id = aq.question_id
        WHERE aq.attempt_id = $1
        ORDER BY aq.position ASC
        "#,
    )
    .bind(attempt_id)
    .fetch_all(pool)
    .await?;

    if !stored.is_empty() {
        return Ok(stored);
    }

    let shuffled = sqlx::query_as::<_, PublicQuestion>(
        r#"
        SELECT id, question_text, option_a, option_b, option_c, option_d, marks
        FROM questions
        WHERE exam_id = $1
        ORDER BY RANDOM()
        "#,
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await?;

    for (position, question) in shuffled.iter().enumerate() {
        sqlx::query(
            "INSERT INTO attempt_question_order (attempt_id, question_id, position) VALUES ($1, $2, $3)",
        )
        .bind(attempt_id)
        .bind(question.id)
        .bind(position as i32)
        .execute(pool)
        .await?;
    }

    Ok(shuffled)
}

/// Finalizes an attempt: computes the score as the sum of marks over correct
/// answers, stamps the end time and writes the terminal status.
pub async fn finalize_attempt(
    pool: &PgPool,
    attempt_id: i64,
    status: &str,
) -> Result<ExamAttempt, AppError> {
    let score = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT COALESCE(SUM(CASE WHEN a.is_correct THEN q.marks ELSE 0 END), 0)::INT
        FROM answers a
        JOIN questions q ON q.id = a.question_id
        WHERE a.attempt_id = $1
        "#,
    )
    .bind(attempt_id)
    .fetch_one(pool)
    .await?;

    let updated = sqlx::query_as::<_, ExamAttempt>(
        r#"
        UPDATE exam_attempts
        SET end_time = NOW(), score = $2, status = $3
        WHERE id = $1
        RETURNING id, exam_id, student_id, start_time, end_time, status, score, session_token
        "#,
    )
    .bind(attempt_id)
    .bind(score)
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok(updated)
}

/// Lazy timer enforcement, run on every start/answer access.
///
/// Returns the post-check attempt plus whether finalization happened on this
/// call, so callers make an explicit decision instead of relying on a
/// mutated-through-return row. An already-terminal attempt passes through
/// unchanged.
pub async fn check_expiry(
    pool: &PgPool,
    attempt: ExamAttempt,
) -> Result<(ExamAttempt, bool), AppError> {
    if !attempt.is_in_progress() {
        return Ok((attempt, false));
    }

    let duration_minutes =
        sqlx::query_scalar::<_, i32>("SELECT duration_minutes FROM exams WHERE id = $1")
            .bind(attempt.exam_id)
            .fetch_one(pool)
            .await?;

    if attempt.is_expired_at(Utc::now(), duration_minutes) {
        let finalized = finalize_attempt(pool, attempt.id, STATUS_AUTO_SUBMITTED).await?;
        return Ok((finalized, true));
    }

    Ok((attempt, false))
}

/// Fetches an attempt owned by the given student.
pub async fn get_student_attempt(
    pool: &PgPool,
    attempt_id: i64,
    student_id: i64,
) -> Result<Option<ExamAttempt>, AppError> {
    let attempt = sqlx::query_as::<_, ExamAttempt>(
        r#"
        SELECT id, exam_id, student_id, start_time, end_time, status, score, session_token
        FROM exam_attempts
        WHERE id = $1 AND student_id = $2
        "#,
    )
    .bind(attempt_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await?;

    Ok(attempt)
}

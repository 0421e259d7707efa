// src/handlers/student.rs

use axum::{
    Json,
    extract::{Extension, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        attempt::{
            AnswerRequest, AttemptResult, ExamAttempt, LogEventRequest, ResultQuery, SavedAnswer,
            StartAttemptRequest, SubmitAttemptRequest, STATUS_SUBMITTED,
        },
        exam::AvailableExam,
    },
    services::attempt_service,
    utils::jwt::Claims,
};

/// Lists published exams whose scheduled window contains the current time.
pub async fn list_available_exams(
    State(pool): State<PgPool>,
) -> Result<impl IntoResponse, AppError> {
    let exams = sqlx::query_as::<_, AvailableExam>(
        r#"
        SELECT e.id, e.title, e.duration_minutes, e.start_time, e.end_time, s.name AS subject_name
        FROM exams e
        JOIN subjects s ON s.id = e.subject_id
        WHERE e.status = 'published' AND NOW() BETWEEN e.start_time AND e.end_time
        ORDER BY e.start_time ASC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list available exams: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(exams))
}

/// 409 body for attempts that are already terminal. Carries enough for the
/// client to redirect straight to the result view.
fn terminal_conflict(message: &str, attempt: &ExamAttempt) -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({
            "error": message,
            "attemptId": attempt.id,
            "status": attempt.status,
            "score": attempt.score,
        })),
    )
        .into_response()
}

/// Starts (or resumes) an exam attempt.
///
/// The exam must be published and inside its scheduled window. The attempt is
/// fetched or created under the caller's session token; an in-progress attempt
/// held by a different session is rejected with 409. The lazy timer check runs
/// before responding, so an expired attempt comes back as `auto_submitted`
/// rather than being served questions.
pub async fn start_attempt(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<StartAttemptRequest>,
) -> Result<Response, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let student_id = claims.user_id()?;

    let exam = attempt_service::get_published_exam(&pool, payload.exam_id)
        .await?
        .ok_or(AppError::NotFound("Exam not found/published".to_string()))?;

    if !exam.is_open_at(chrono::Utc::now()) {
        return Err(AppError::Forbidden(
            "Exam is outside active window".to_string(),
        ));
    }

    let attempt = attempt_service::get_or_create_attempt(
        &pool,
        payload.exam_id,
        student_id,
        &payload.session_token,
    )
    .await?;

    let (attempt, _finalized) = attempt_service::check_expiry(&pool, attempt).await?;
    if !attempt.is_in_progress() {
        return Ok(terminal_conflict("Attempt already submitted", &attempt));
    }

    let questions = attempt_service::questions_for_attempt(&pool, exam.id, attempt.id).await?;

    let answers = sqlx::query_as::<_, SavedAnswer>(
        "SELECT question_id, selected_option FROM answers WHERE attempt_id = $1",
    )
    .bind(attempt.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "attemptId": attempt.id,
        "exam": {
            "id": exam.id,
            "title": exam.title,
            "subjectName": exam.subject_name,
            "durationMinutes": exam.duration_minutes,
            "startTime": attempt.start_time,
            "autosaveIntervalSeconds": config.autosave_interval_seconds,
        },
        "questions": questions,
        "answers": answers,
    }))
    .into_response())
}

/// Saves (upserts) one answer for the caller's in-progress attempt.
///
/// Correctness is recomputed against the stored correct option on every write;
/// re-answering the same question replaces the previous row.
pub async fn save_answer(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Response, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let student_id = claims.user_id()?;

    let attempt = attempt_service::get_student_attempt(&pool, payload.attempt_id, student_id)
        .await?
        .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    let (attempt, _finalized) = attempt_service::check_expiry(&pool, attempt).await?;
    if !attempt.is_in_progress() {
        return Ok(terminal_conflict("Attempt already closed", &attempt));
    }

    // Scoped to the attempt's exam: a question id from another exam must not
    // slip into this attempt's answer set (its marks would count at scoring).
    let correct_option = sqlx::query_scalar::<_, String>(
        "SELECT correct_option FROM questions WHERE id = $1 AND exam_id = $2",
    )
    .bind(payload.question_id)
    .bind(attempt.exam_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let is_correct = correct_option == payload.selected_option;

    sqlx::query(
        r#"
        INSERT INTO answers (attempt_id, question_id, selected_option, is_correct)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (attempt_id, question_id)
        DO UPDATE SET selected_option = EXCLUDED.selected_option, is_correct = EXCLUDED.is_correct
        "#,
    )
    .bind(payload.attempt_id)
    .bind(payload.question_id)
    .bind(&payload.selected_option)
    .bind(is_correct)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert answer: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(json!({ "message": "Saved" })).into_response())
}

/// Appends a client-observed integrity event (tab switch, fullscreen exit).
///
/// Best-effort signal only: no validation beyond type/length and no effect on
/// the attempt state.
pub async fn log_event(
    State(pool): State<PgPool>,
    Json(payload): Json<LogEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    sqlx::query("INSERT INTO attempt_events (attempt_id, event_type, detail) VALUES ($1, $2, $3)")
        .bind(payload.attempt_id)
        .bind(&payload.event_type)
        .bind(&payload.detail)
        .execute(&pool)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Event logged" })),
    ))
}

/// Submits the caller's attempt, finalizing its score.
pub async fn submit_attempt(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.user_id()?;

    let attempt = attempt_service::get_student_attempt(&pool, payload.attempt_id, student_id)
        .await?
        .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    if !attempt.is_in_progress() {
        return Err(AppError::Conflict("Already submitted".to_string()));
    }

    let finalized =
        attempt_service::finalize_attempt(&pool, payload.attempt_id, STATUS_SUBMITTED).await?;

    Ok(Json(finalized))
}

/// Returns the caller's finished attempt with exam title and total marks.
pub async fn get_result(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ResultQuery>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.user_id()?;

    let result = sqlx::query_as::<_, AttemptResult>(
        r#"
        SELECT ea.id, ea.score, ea.status, ea.start_time, ea.end_time, e.title, e.duration_minutes,
               (SELECT COALESCE(SUM(marks), 0) FROM questions WHERE exam_id = e.id) AS total_marks
        FROM exam_attempts ea
        JOIN exams e ON e.id = ea.exam_id
        WHERE ea.id = $1 AND ea.student_id = $2
        "#,
    )
    .bind(params.attempt_id)
    .bind(student_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Result not found".to_string()))?;

    if result.status == crate::models::attempt::STATUS_IN_PROGRESS {
        return Err(AppError::Conflict("Attempt still in progress".to_string()));
    }

    Ok(Json(result))
}

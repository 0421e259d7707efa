// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::{
        attempt::ExamResultRow,
        exam::{CreateExamRequest, Exam, ExamWithSubject},
        question::BulkQuestionsRequest,
        subject::{CreateSubjectRequest, Subject},
    },
    utils::{csv::results_csv, jwt::Claims},
};

/// Creates a new subject. Admin only.
pub async fn create_subject(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let created_by = claims.user_id()?;

    let subject = sqlx::query_as::<_, Subject>(
        r#"
        INSERT INTO subjects (name, created_by)
        VALUES ($1, $2)
        RETURNING id, name, created_by, created_at
        "#,
    )
    .bind(&payload.name)
    .bind(created_by)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Subject '{}' already exists", payload.name))
        } else {
            tracing::error!("Failed to create subject: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(subject)))
}

/// Lists all subjects, newest first.
pub async fn list_subjects(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let subjects = sqlx::query_as::<_, Subject>(
        "SELECT id, name, created_by, created_at FROM subjects ORDER BY id DESC",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list subjects: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(subjects))
}

/// Creates a new exam. Admin only.
pub async fn create_exam(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.end_time <= payload.start_time {
        return Err(AppError::BadRequest(
            "End time must be after start time".to_string(),
        ));
    }

    let created_by = claims.user_id()?;

    let exam = sqlx::query_as::<_, Exam>(
        r#"
        INSERT INTO exams (title, subject_id, duration_minutes, start_time, end_time, status, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, title, subject_id, duration_minutes, start_time, end_time, status, created_by, created_at
        "#,
    )
    .bind(&payload.title)
    .bind(payload.subject_id)
    .bind(payload.duration_minutes)
    .bind(payload.start_time)
    .bind(payload.end_time)
    .bind(&payload.status)
    .bind(created_by)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create exam: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(exam)))
}

/// Lists all exams with their subject names, newest first.
pub async fn list_exams(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let exams = sqlx::query_as::<_, ExamWithSubject>(
        r#"
        SELECT e.id, e.title, e.subject_id, e.duration_minutes, e.start_time, e.end_time,
               e.status, e.created_by, s.name AS subject_name
        FROM exams e
        JOIN subjects s ON s.id = e.subject_id
        ORDER BY e.id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list exams: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(exams))
}

/// Bulk-uploads questions for an exam. Admin only.
///
/// Inserts rows one by one, mirroring the per-row upload semantics: an invalid
/// payload is rejected up front, but a mid-batch database failure leaves the
/// earlier rows in place. Question text is sanitized as a stored-XSS fail-safe.
pub async fn bulk_upload_questions(
    State(pool): State<PgPool>,
    Json(payload): Json<BulkQuestionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let exam = sqlx::query_scalar::<_, i64>("SELECT id FROM exams WHERE id = $1")
        .bind(payload.exam_id)
        .fetch_optional(&pool)
        .await?;

    if exam.is_none() {
        return Err(AppError::NotFound("Exam not found".to_string()));
    }

    for question in &payload.questions {
        sqlx::query(
            r#"
            INSERT INTO questions
            (exam_id, question_text, option_a, option_b, option_c, option_d, correct_option, marks)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(payload.exam_id)
        .bind(ammonia::clean(&question.question_text))
        .bind(&question.option_a)
        .bind(&question.option_b)
        .bind(&question.option_c)
        .bind(&question.option_d)
        .bind(&question.correct_option)
        .bind(question.marks)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;
    }

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": format!("{} questions uploaded", payload.questions.len())
        })),
    ))
}

async fn fetch_results(pool: &PgPool, exam_id: i64) -> Result<Vec<ExamResultRow>, AppError> {
    let rows = sqlx::query_as::<_, ExamResultRow>(
        r#"
        SELECT ea.id AS attempt_id, u.full_name, u.matric_no, ea.score, ea.status,
               ea.start_time, ea.end_time
        FROM exam_attempts ea
        JOIN users u ON u.id = ea.student_id
        WHERE ea.exam_id = $1 AND ea.status <> 'in_progress'
        ORDER BY ea.score DESC, ea.end_time ASC
        "#,
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch results: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(rows)
}

/// Lists finished attempts for an exam, best score first. Admin only.
pub async fn list_results(
    State(pool): State<PgPool>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let rows = fetch_results(&pool, exam_id).await?;
    Ok(Json(rows))
}

/// Exports finished attempts for an exam as a CSV attachment. Admin only.
pub async fn export_results(
    State(pool): State<PgPool>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let rows = fetch_results(&pool, exam_id).await?;
    let csv = results_csv(&rows);

    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"exam-{}-results.csv\"", exam_id),
        ),
    ];

    Ok((headers, csv))
}

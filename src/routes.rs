// src/routes.rs

use std::sync::Arc;

use axum::{
    Json, Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use serde_json::json;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{admin, auth, student},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, student_middleware},
};

/// Assembles the main application router.
///
/// * Merges the sub-routers (auth, admin, student).
/// * Applies global middleware (Trace, CORS) and rate-limits the auth surface.
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let allow_origin = if state.config.cors_origin == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors_origin
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // Brute-force protection on the login surface only.
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(5)
        .finish()
        .expect("valid governor configuration");
    let governor_conf = Arc::new(governor_conf);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .layer(GovernorLayer::new(governor_conf))
        .merge(
            Router::new()
                .route("/register-student", post(auth::register_student))
                .layer(middleware::from_fn(admin_middleware))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let admin_routes = Router::new()
        .route(
            "/subjects",
            get(admin::list_subjects).post(admin::create_subject),
        )
        .route("/exams", get(admin::list_exams).post(admin::create_exam))
        .route("/questions/bulk", post(admin::bulk_upload_questions))
        .route("/results/{exam_id}", get(admin::list_results))
        .route("/results/{exam_id}/export", get(admin::export_results))
        // Double middleware protection: Auth first, then role check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let student_routes = Router::new()
        .route("/exams/available", get(student::list_available_exams))
        .route("/attempt/start", post(student::start_attempt))
        .route("/attempt/answer", post(student::save_answer))
        .route("/attempt/log", post(student::log_event))
        .route("/attempt/submit", post(student::submit_attempt))
        .route("/attempt/result", get(student::get_result))
        .layer(middleware::from_fn(student_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .nest("/student", student_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// tests/auth_tests.rs

use cbt_backend::{config::Config, routes, state::AppState, utils::hash::hash_password};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;

struct TestApp {
    address: String,
    pool: PgPool,
}

/// Spawns the app on a random port against the database from DATABASE_URL.
/// Returns `None` (test skipped) when no database is configured.
async fn spawn_app() -> Option<TestApp> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        port: 0,
        cors_origin: "*".to_string(),
        autosave_interval_seconds: 5,
        rust_log: "error".to_string(),
        admin_email: None,
        admin_password: None,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    Some(TestApp { address, pool })
}

/// Inserts an admin directly and logs in through the API, returning the token.
async fn admin_token(app: &TestApp, client: &reqwest::Client) -> String {
    let suffix = &uuid::Uuid::new_v4().to_string()[..8];
    let email = format!("admin_{}@test.local", suffix);
    let password = "Admin@123";
    let hash = hash_password(password).unwrap();

    sqlx::query(
        "INSERT INTO users (full_name, email, password_hash, role, matric_no)
         VALUES ('Test Admin', $1, $2, 'admin', $3)",
    )
    .bind(&email)
    .bind(&hash)
    .bind(format!("ADM-{}", suffix))
    .execute(&app.pool)
    .await
    .unwrap();

    let body: serde_json::Value = client
        .post(format!("{}/auth/login", app.address))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_works() {
    let Some(app) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let Some(app) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/auth/login", app.address))
        .json(&serde_json::json!({
            "email": "nobody@test.local",
            "password": "wrongpass"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn admin_registers_student_and_duplicate_conflicts() {
    let Some(app) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let token = admin_token(&app, &client).await;

    let suffix = &uuid::Uuid::new_v4().to_string()[..8];
    let payload = serde_json::json!({
        "fullName": "Jane Doe",
        "email": format!("jane_{}@test.local", suffix),
        "password": "secret123",
        "matricNo": format!("MAT-{}", suffix)
    });

    let response = client
        .post(format!("{}/auth/register-student", app.address))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    // Same email again must be translated to a conflict.
    let response = client
        .post(format!("{}/auth/register-student", app.address))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn register_student_requires_admin_role() {
    let Some(app) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let token = admin_token(&app, &client).await;

    // Create a student, log them in, and try to use the admin-only route.
    let suffix = &uuid::Uuid::new_v4().to_string()[..8];
    let email = format!("stu_{}@test.local", suffix);
    client
        .post(format!("{}/auth/register-student", app.address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "fullName": "Some Student",
            "email": email,
            "password": "secret123",
            "matricNo": format!("MAT-{}", suffix)
        }))
        .send()
        .await
        .unwrap();

    let login: serde_json::Value = client
        .post(format!("{}/auth/login", app.address))
        .json(&serde_json::json!({ "email": email, "password": "secret123" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let student_token = login["token"].as_str().unwrap();

    let response = client
        .post(format!("{}/auth/register-student", app.address))
        .bearer_auth(student_token)
        .json(&serde_json::json!({
            "fullName": "Another Student",
            "email": format!("other_{}@test.local", suffix),
            "password": "secret123",
            "matricNo": format!("MAT2-{}", suffix)
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn admin_routes_reject_missing_token() {
    let Some(app) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/admin/subjects", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

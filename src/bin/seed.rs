// src/bin/seed.rs
//
// Provisions a default admin account and sample exam content so a fresh
// deployment can be exercised immediately. Safe to run repeatedly.

use cbt_backend::config::Config;
use cbt_backend::utils::hash::hash_password;
use dotenvy::dotenv;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() {
    dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::fmt().with_target(false).init();

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    if let Err(e) = seed(&pool).await {
        tracing::error!("Seed failed: {:?}", e);
        std::process::exit(1);
    }

    tracing::info!("Seed completed. Admin login: admin@cbt.local / Admin@123");
}

async fn seed(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let hash = hash_password("Admin@123")?;

    let admin_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (full_name, email, password_hash, role, matric_no)
        VALUES ('System Admin', 'admin@cbt.local', $1, 'admin', 'ADM-001')
        ON CONFLICT (email) DO UPDATE SET full_name = EXCLUDED.full_name
        RETURNING id
        "#,
    )
    .bind(&hash)
    .fetch_one(pool)
    .await?;

    let subject_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO subjects (name, created_by)
        VALUES ('General Knowledge', $1)
        ON CONFLICT (name) DO UPDATE SET created_by = EXCLUDED.created_by
        RETURNING id
        "#,
    )
    .bind(admin_id)
    .fetch_one(pool)
    .await?;

    let existing_exam = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM exams WHERE title = 'Sample CBT Entrance Test' LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    let exam_id = match existing_exam {
        Some(id) => id,
        None => {
            sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO exams (title, subject_id, duration_minutes, start_time, end_time, status, created_by)
                VALUES ('Sample CBT Entrance Test', $1, 20, NOW() - INTERVAL '1 hour', NOW() + INTERVAL '7 days', 'published', $2)
                RETURNING id
                "#,
            )
            .bind(subject_id)
            .bind(admin_id)
            .fetch_one(pool)
            .await?
        }
    };

    let question_count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE exam_id = $1")
            .bind(exam_id)
            .fetch_one(pool)
            .await?;

    if question_count == 0 {
        let samples = [
            ("The capital city of Nigeria is?", "Lagos", "Abuja", "Kano", "Enugu", "B"),
            ("2 + 2 equals?", "3", "4", "5", "6", "B"),
            (
                "HTML stands for?",
                "Hyper Text Markup Language",
                "HighText Markdown Language",
                "Home Tool Markup Language",
                "Hyperlinks and Text Makeup Language",
                "A",
            ),
            ("Primary color not among these?", "Red", "Blue", "Green", "Yellow", "C"),
            ("Planet known as Red Planet?", "Earth", "Mars", "Jupiter", "Venus", "B"),
        ];

        for (text, a, b, c, d, correct) in samples {
            sqlx::query(
                r#"
                INSERT INTO questions
                (exam_id, question_text, option_a, option_b, option_c, option_d, correct_option, marks)
                VALUES ($1, $2, $3, $4, $5, $6, $7, 2)
                "#,
            )
            .bind(exam_id)
            .bind(text)
            .bind(a)
            .bind(b)
            .bind(c)
            .bind(d)
            .bind(correct)
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}

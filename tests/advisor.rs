// Database-backed checks of the advisor dashboard and saved plans.
// Run with DATABASE_URL set: cargo test -- --ignored

use std::sync::Arc;

use advisory_crm::{
    common::error::AppError,
    config::{AppState, Config},
    models::plans::CreatePlanPayload,
    services::{advisor_service::AdvisorService, mailer::LogMailer},
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use sqlx::PgPool;

fn advisor_service(pool: PgPool) -> AdvisorService {
    let config = Config {
        database_url: "postgres://localhost/unused".to_string(),
        jwt_secret: "advisor-test-secret".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        db_max_connections: 1,
        db_acquire_timeout: std::time::Duration::from_secs(5),
        token_ttl: chrono::Duration::hours(1),
        upload_dir: std::env::temp_dir().join("advisory-crm-advisor-tests"),
        mail_from: "no-reply@localhost".to_string(),
    };

    AppState::with_pool(pool, &config, Arc::new(LogMailer::new("no-reply@localhost"))).advisor_service
}

async fn insert_user(pool: &PgPool, email: &str, role: &str) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password_hash, role, first_name, last_name)
        VALUES ($1, 'x', $2::user_role, 'Test', 'User')
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_client(pool: &PgPool, email: &str, advisor: i64, tier: Option<&str>, status: &str) -> i64 {
    let client = insert_user(pool, email, "client").await;

    sqlx::query("INSERT INTO client_profiles (client_user_id, tier, onboarding_status) VALUES ($1, $2, $3)")
        .bind(client)
        .bind(tier)
        .bind(status)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO advisor_client_map (client_user_id, advisor_user_id) VALUES ($1, $2)")
        .bind(client)
        .bind(advisor)
        .execute(pool)
        .await
        .unwrap();

    client
}

async fn insert_appointment(pool: &PgPool, advisor: i64, client: i64, start: DateTime<Utc>) {
    sqlx::query(
        r#"
        INSERT INTO appointments (advisor_user_id, client_user_id, title, start_time, end_time)
        VALUES ($1, $2, 'Review', $3, $3 + INTERVAL '1 hour')
        "#,
    )
    .bind(advisor)
    .bind(client)
    .bind(start)
    .execute(pool)
    .await
    .unwrap();
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
}

fn plan(name: &str) -> CreatePlanPayload {
    CreatePlanPayload {
        plan_name: name.to_string(),
        plan_data: json!({ "results": { "final_tax_owed": 8323 } }),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn stats_cover_only_the_advisors_book(pool: PgPool) {
    let service = advisor_service(pool.clone());
    let advisor = insert_user(&pool, "advisor@example.com", "advisor").await;
    let other = insert_user(&pool, "other@example.com", "advisor").await;

    let gold = insert_client(&pool, "c1@example.com", advisor, Some("Gold"), "Completed").await;
    insert_client(&pool, "c2@example.com", advisor, Some("Gold"), "In-Progress").await;
    insert_client(&pool, "c3@example.com", advisor, None, "In-Progress").await;
    let foreign = insert_client(&pool, "c4@example.com", other, Some("Silver"), "Completed").await;

    // Week of Monday 2025-03-03; "now" is Wednesday the 5th
    insert_appointment(&pool, advisor, gold, at(3, 9)).await;
    insert_appointment(&pool, advisor, gold, at(5, 8)).await;
    insert_appointment(&pool, advisor, gold, at(5, 15)).await;
    insert_appointment(&pool, advisor, gold, at(9, 23)).await;
    insert_appointment(&pool, advisor, gold, at(10, 9)).await;
    insert_appointment(&pool, advisor, gold, at(2, 9)).await;
    insert_appointment(&pool, other, foreign, at(5, 10)).await;

    let stats = service.dashboard_stats(advisor, at(5, 12)).await.unwrap();

    let tiers: Vec<(Option<&str>, i64)> = stats
        .clients_by_tier
        .iter()
        .map(|t| (t.tier.as_deref(), t.count))
        .collect();
    assert_eq!(tiers, vec![(Some("Gold"), 2), (None, 1)]);

    let statuses: Vec<(&str, i64)> = stats
        .clients_by_onboarding_status
        .iter()
        .map(|s| (s.onboarding_status.as_str(), s.count))
        .collect();
    assert_eq!(statuses, vec![("Completed", 1), ("In-Progress", 2)]);

    let weekly: Vec<i64> = stats.appointments_weekly.iter().map(|d| d.count).collect();
    assert_eq!(weekly, vec![1, 0, 2, 0, 0, 0, 1]);
    assert_eq!(stats.appointments_weekly[0].day, "Mon");
    assert_eq!(stats.meetings_today, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn empty_book_has_zeroed_stats(pool: PgPool) {
    let service = advisor_service(pool.clone());
    let advisor = insert_user(&pool, "advisor@example.com", "advisor").await;

    let stats = service.dashboard_stats(advisor, at(5, 12)).await.unwrap();

    assert!(stats.clients_by_tier.is_empty());
    assert!(stats.clients_by_onboarding_status.is_empty());
    assert_eq!(stats.appointments_weekly.len(), 7);
    assert!(stats.appointments_weekly.iter().all(|d| d.count == 0));
    assert_eq!(stats.meetings_today, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn plans_are_saved_as_drafts_for_assigned_clients(pool: PgPool) {
    let service = advisor_service(pool.clone());
    let advisor = insert_user(&pool, "advisor@example.com", "advisor").await;
    let client = insert_client(&pool, "c1@example.com", advisor, None, "In-Progress").await;

    let first = service.create_plan(advisor, client, plan("First draft")).await.unwrap();
    let second = service.create_plan(advisor, client, plan("Second draft")).await.unwrap();

    assert_eq!(first.status, "Draft");
    assert_eq!(first.advisor_user_id, Some(advisor));
    assert_eq!(first.plan_data["results"]["final_tax_owed"], 8323);

    let names: Vec<String> = service
        .list_plans(advisor, client)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.plan_name)
        .collect();
    assert_eq!(names, vec![second.plan_name, first.plan_name]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn plans_of_unassigned_clients_are_off_limits(pool: PgPool) {
    let service = advisor_service(pool.clone());
    let advisor = insert_user(&pool, "advisor@example.com", "advisor").await;
    let other = insert_user(&pool, "other@example.com", "advisor").await;
    let client = insert_client(&pool, "c1@example.com", other, None, "In-Progress").await;

    let created = service.create_plan(advisor, client, plan("Sneaky")).await;
    assert!(matches!(created, Err(AppError::Forbidden(_))));

    let listed = service.list_plans(advisor, client).await;
    assert!(matches!(listed, Err(AppError::NotFound(_))));

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM financial_plans")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

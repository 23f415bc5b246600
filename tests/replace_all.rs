// Database-backed checks of the replace-all and upsert-merge transactions.
// Run with DATABASE_URL set: cargo test -- --ignored

use advisory_crm::{
    common::error::AppError,
    db::RecordRepository,
    models::profile::{IncomeSourceInput, QuestionnaireAnswerInput},
    services::record_service::RecordService,
};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;

async fn insert_client(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password_hash, role, first_name, last_name)
        VALUES ($1, 'x', 'client', 'Test', 'Client')
        RETURNING id
        "#,
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_field(pool: &PgPool, label: &str) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO form_fields (form_name, field_label, field_type, field_order)
        VALUES ('investor_profile', $1, 'text', 1)
        RETURNING id
        "#,
    )
    .bind(label)
    .fetch_one(pool)
    .await
    .unwrap()
}

fn income(source: &str, amount: i64) -> IncomeSourceInput {
    IncomeSourceInput {
        source: source.to_string(),
        owner: None,
        monthly_amount: Decimal::new(amount, 0),
    }
}

fn answer(form_field_id: i64, text: &str) -> QuestionnaireAnswerInput {
    QuestionnaireAnswerInput {
        form_field_id,
        answer: text.to_string(),
    }
}

async fn stored_sources(service: &RecordService, owner: i64) -> Vec<String> {
    service
        .list::<IncomeSourceInput>(owner)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.source)
        .collect()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn second_replace_leaves_no_residue(pool: PgPool) {
    let service = RecordService::new(RecordRepository::new(pool.clone()));
    let owner = insert_client(&pool, "a@example.com").await;

    service
        .replace_all(owner, vec![income("Salary", 5000), income("Bonus", 800)])
        .await
        .unwrap();
    service
        .replace_all(owner, vec![income("Pension", 2000), income("Rental", 900), income("Dividends", 50)])
        .await
        .unwrap();

    assert_eq!(stored_sources(&service, owner).await, vec!["Pension", "Rental", "Dividends"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn empty_list_clears_everything(pool: PgPool) {
    let service = RecordService::new(RecordRepository::new(pool.clone()));
    let owner = insert_client(&pool, "a@example.com").await;

    service.replace_all(owner, vec![income("Salary", 5000)]).await.unwrap();
    service
        .replace_from_payload::<IncomeSourceInput>(owner, &json!({ "income_sources": [] }), "income_sources")
        .await
        .unwrap();

    assert!(stored_sources(&service, owner).await.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn other_owners_are_untouched(pool: PgPool) {
    let service = RecordService::new(RecordRepository::new(pool.clone()));
    let first = insert_client(&pool, "a@example.com").await;
    let second = insert_client(&pool, "b@example.com").await;

    service.replace_all(first, vec![income("Salary", 5000)]).await.unwrap();
    service.replace_all(second, vec![income("Pension", 2000)]).await.unwrap();
    service.replace_all(first, Vec::<IncomeSourceInput>::new()).await.unwrap();

    assert_eq!(stored_sources(&service, second).await, vec!["Pension"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn failed_insert_rolls_back_the_delete(pool: PgPool) {
    let service = RecordService::new(RecordRepository::new(pool.clone()));
    let owner = insert_client(&pool, "a@example.com").await;

    service
        .replace_all(owner, vec![income("Salary", 5000), income("Bonus", 800)])
        .await
        .unwrap();

    // Fail the bulk insert after the delete already ran
    sqlx::query(
        r#"
        CREATE FUNCTION reject_boom() RETURNS trigger AS $$
        BEGIN
            IF NEW.source = 'boom' THEN
                RAISE EXCEPTION 'boom';
            END IF;
            RETURN NEW;
        END
        $$ LANGUAGE plpgsql
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER reject_boom BEFORE INSERT ON financials_income \
         FOR EACH ROW EXECUTE FUNCTION reject_boom()",
    )
    .execute(&pool)
    .await
    .unwrap();

    let result = service
        .replace_all(owner, vec![income("Pension", 2000), income("boom", 1)])
        .await;

    assert!(matches!(result, Err(AppError::DatabaseError(_))));
    assert_eq!(stored_sources(&service, owner).await, vec!["Salary", "Bonus"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn invalid_payload_never_reaches_the_table(pool: PgPool) {
    let service = RecordService::new(RecordRepository::new(pool.clone()));
    let owner = insert_client(&pool, "a@example.com").await;

    service.replace_all(owner, vec![income("Salary", 5000)]).await.unwrap();

    for payload in [json!({}), json!({ "income_sources": null }), json!({ "income_sources": {} })] {
        let result = service
            .replace_from_payload::<IncomeSourceInput>(owner, &payload, "income_sources")
            .await;
        assert!(matches!(result, Err(AppError::InvalidPayload(_))));
    }

    assert_eq!(stored_sources(&service, owner).await, vec!["Salary"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn unknown_owner_is_not_found(pool: PgPool) {
    let service = RecordService::new(RecordRepository::new(pool));

    let result = service.replace_all(999_999, vec![income("Salary", 1)]).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_replaces_never_mix(pool: PgPool) {
    let service = RecordService::new(RecordRepository::new(pool.clone()));
    let owner = insert_client(&pool, "a@example.com").await;

    let left: Vec<_> = (0..50).map(|i| income(&format!("left-{i}"), i)).collect();
    let right: Vec<_> = (0..50).map(|i| income(&format!("right-{i}"), i)).collect();

    let (a, b) = tokio::join!(
        service.replace_all(owner, left.clone()),
        service.replace_all(owner, right.clone())
    );
    a.unwrap();
    b.unwrap();

    let stored = stored_sources(&service, owner).await;
    let expected_left: Vec<String> = left.iter().map(|r| r.source.clone()).collect();
    let expected_right: Vec<String> = right.iter().map(|r| r.source.clone()).collect();
    assert!(stored == expected_left || stored == expected_right);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn upsert_merges_by_key(pool: PgPool) {
    let service = RecordService::new(RecordRepository::new(pool.clone()));
    let owner = insert_client(&pool, "a@example.com").await;
    let horizon = insert_field(&pool, "Horizon").await;
    let risk = insert_field(&pool, "Risk").await;

    service.upsert_merge(owner, vec![answer(horizon, "5 years")]).await.unwrap();
    service.upsert_merge(owner, vec![answer(risk, "Moderate")]).await.unwrap();
    service
        .merge_from_payload::<QuestionnaireAnswerInput>(
            owner,
            &json!({ "answers": [
                { "form_field_id": horizon, "answer": "7 years" },
                { "form_field_id": horizon, "answer": "10 years" }
            ]}),
            "answers",
        )
        .await
        .unwrap();

    let stored: Vec<(i64, String)> = service
        .list::<QuestionnaireAnswerInput>(owner)
        .await
        .unwrap()
        .into_iter()
        .map(|row| (row.form_field_id, row.answer))
        .collect();

    assert_eq!(
        stored,
        vec![(horizon, "10 years".to_string()), (risk, "Moderate".to_string())]
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn answer_for_unknown_field_is_not_found(pool: PgPool) {
    let service = RecordService::new(RecordRepository::new(pool.clone()));
    let owner = insert_client(&pool, "a@example.com").await;

    let result = service.upsert_merge(owner, vec![answer(424_242, "?")]).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

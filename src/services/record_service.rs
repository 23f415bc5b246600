// src/services/record_service.rs

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{KeyedRecord, OwnedRecord, RecordRepository},
};

/// Owner-scoped child sets: wholesale replacement and keyed merge.
#[derive(Clone)]
pub struct RecordService {
    repo: RecordRepository,
}

impl RecordService {
    pub fn new(repo: RecordRepository) -> Self {
        Self { repo }
    }

    pub async fn list<R: OwnedRecord>(&self, owner_id: i64) -> Result<Vec<R::Row>, AppError> {
        self.repo.list_for_owner::<R, _>(self.repo.pool(), owner_id).await
    }

    /// Validates `payload[key]` and replaces the owner's rows with it.
    pub async fn replace_from_payload<R>(&self, owner_id: i64, payload: &Value, key: &str) -> Result<u64, AppError>
    where
        R: OwnedRecord + DeserializeOwned + Validate,
    {
        let records = extract_records::<R>(payload, key)?;
        self.replace_all(owner_id, records).await
    }

    /// Validates `payload[key]` and merges it into the owner's keyed rows.
    pub async fn merge_from_payload<R>(&self, owner_id: i64, payload: &Value, key: &str) -> Result<u64, AppError>
    where
        R: KeyedRecord + DeserializeOwned + Validate,
    {
        let records = extract_records::<R>(payload, key)?;
        self.upsert_merge(owner_id, records).await
    }

    /// Deletes every row the owner has in `R::TABLE` and inserts `records`.
    ///
    /// Runs in one transaction: on any failure the transaction is dropped
    /// uncommitted and the previous set stays as it was. An empty `records`
    /// clears the set.
    pub async fn replace_all<R: OwnedRecord>(&self, owner_id: i64, records: Vec<R>) -> Result<u64, AppError> {
        let mut tx = self.repo.pool().begin().await?;

        self.repo.lock_owner(&mut *tx, owner_id).await?;
        let deleted = self.repo.delete_for_owner::<R>(&mut *tx, owner_id).await?;
        let inserted = self.repo.insert_many(&mut *tx, owner_id, &records).await?;

        tx.commit().await?;

        tracing::info!(table = R::TABLE, owner_id, deleted, inserted, "Records replaced");
        Ok(inserted)
    }

    /// Inserts absent keys and overwrites present ones; other keys are kept.
    pub async fn upsert_merge<R: KeyedRecord>(&self, owner_id: i64, records: Vec<R>) -> Result<u64, AppError> {
        if records.is_empty() {
            return Ok(0);
        }

        let records = dedupe_by_key(records);

        let mut tx = self.repo.pool().begin().await?;

        self.repo.lock_owner(&mut *tx, owner_id).await?;
        let written = self.repo.upsert_many(&mut *tx, owner_id, &records).await?;

        tx.commit().await?;

        tracing::info!(table = R::TABLE, owner_id, written, "Records merged");
        Ok(written)
    }
}

/// Pulls the record list out of a request body and validates every entry.
///
/// Runs before any store access. A missing, null or non-list value is
/// rejected; `[]` is a valid empty set.
pub fn extract_records<R>(payload: &Value, key: &str) -> Result<Vec<R>, AppError>
where
    R: DeserializeOwned + Validate,
{
    let items = match payload.get(key) {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => {
            return Err(AppError::InvalidPayload(format!("'{key}' is required and must be a list.")));
        }
        Some(_) => {
            return Err(AppError::InvalidPayload(format!("'{key}' must be a list.")));
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| -> Result<R, AppError> {
            let record = R::deserialize(item)
                .map_err(|e| AppError::InvalidPayload(format!("'{key}[{i}]' is malformed: {e}")))?;
            record.validate()?;
            Ok(record)
        })
        .collect()
}

// Postgres refuses to touch the same row twice in one ON CONFLICT statement
fn dedupe_by_key<R: KeyedRecord>(records: Vec<R>) -> Vec<R> {
    let last_index: HashMap<i64, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.key(), i))
        .collect();

    records
        .into_iter()
        .enumerate()
        .filter(|(i, r)| last_index.get(&r.key()) == Some(i))
        .map(|(_, r)| r)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{FamilyMemberInput, IncomeSourceInput, QuestionnaireAnswerInput};
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn missing_null_and_non_list_values_are_rejected() {
        for payload in [
            json!({}),
            json!({ "income_sources": null }),
            json!({ "income_sources": { "source": "Salary" } }),
            json!({ "income_sources": "Salary" }),
        ] {
            let result = extract_records::<IncomeSourceInput>(&payload, "income_sources");
            assert!(matches!(result, Err(AppError::InvalidPayload(_))), "{payload}");
        }
    }

    #[test]
    fn empty_list_is_a_valid_empty_set() {
        let records =
            extract_records::<IncomeSourceInput>(&json!({ "income_sources": [] }), "income_sources").unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn records_keep_payload_order() {
        let payload = json!({
            "income_sources": [
                { "source": "Salary", "owner": "Client", "monthly_amount": 8500 },
                { "source": "Rental", "monthly_amount": 1200.5 }
            ]
        });

        let records = extract_records::<IncomeSourceInput>(&payload, "income_sources").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source, "Salary");
        assert_eq!(records[1].monthly_amount, Decimal::new(12005, 1));
    }

    #[test]
    fn malformed_entry_names_its_position() {
        let payload = json!({ "family_members": [
            { "relationship": "Child", "full_name": "Ana" },
            { "relationship": "Child" }
        ]});

        match extract_records::<FamilyMemberInput>(&payload, "family_members") {
            Err(AppError::InvalidPayload(msg)) => assert!(msg.contains("family_members[1]"), "{msg}"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn invalid_entry_is_a_validation_error() {
        let payload = json!({ "income_sources": [{ "source": "", "monthly_amount": 10 }] });

        let result = extract_records::<IncomeSourceInput>(&payload, "income_sources");

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn duplicate_keys_keep_the_last_occurrence() {
        let answer = |id: i64, text: &str| QuestionnaireAnswerInput {
            form_field_id: id,
            answer: text.into(),
        };

        let deduped = dedupe_by_key(vec![answer(1, "a"), answer(2, "b"), answer(1, "c")]);

        assert_eq!(deduped, vec![answer(2, "b"), answer(1, "c")]);
    }
}

// src/db/record_repo.rs

use sqlx::{
    postgres::PgRow, query_builder::Separated, Executor, FromRow, PgConnection, PgPool, Postgres,
    QueryBuilder,
};

use crate::{
    common::{db_utils::missing_reference, error::AppError},
    models::profile::{
        Asset, AssetInput, FamilyMember, FamilyMemberInput, IncomeSource, IncomeSourceInput,
        Liability, LiabilityInput, QuestionnaireAnswerInput,
    },
};

// Postgres accepts at most 65535 bind parameters per statement
const MAX_BIND_PARAMS: usize = 65_535;

/// A row owned by exactly one client, written through a fixed column list.
///
/// `TABLE` and `COLUMNS` are the only identifiers ever spliced into SQL; every
/// value goes through a bind parameter.
pub trait OwnedRecord: Send + Sync {
    const TABLE: &'static str;
    const OWNER_COLUMN: &'static str = "client_user_id";
    /// Written columns, owner column excluded, in `push_values` order.
    const COLUMNS: &'static [&'static str];
    /// Read order; the surrogate key preserves insertion order.
    const ORDER_BY: &'static str = "id";

    /// Stored representation returned by reads.
    type Row: for<'r> FromRow<'r, PgRow> + Send + Unpin;

    fn push_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>);
}

/// An owned record unique by `(owner, KEY_COLUMN)`, merged instead of replaced.
pub trait KeyedRecord: OwnedRecord {
    const KEY_COLUMN: &'static str;
    /// Columns overwritten when the key already exists.
    const UPDATE_COLUMNS: &'static [&'static str];
    /// Set to `NOW()` on every overwrite.
    const TOUCHED_AT_COLUMN: Option<&'static str> = None;

    fn key(&self) -> i64;
}

#[derive(Clone)]
pub struct RecordRepository {
    pool: PgPool,
}

impl RecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Takes the owner's row lock so writers of the same child set queue up.
    ///
    /// `FOR NO KEY UPDATE` conflicts with itself but not with the key-share
    /// locks taken by foreign-key checks on unrelated inserts.
    pub async fn lock_owner(&self, conn: &mut PgConnection, owner_id: i64) -> Result<(), AppError> {
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR NO KEY UPDATE")
                .bind(owner_id)
                .fetch_optional(&mut *conn)
                .await?;

        locked
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Client not found.".to_string()))
    }

    pub async fn delete_for_owner<R: OwnedRecord>(
        &self,
        conn: &mut PgConnection,
        owner_id: i64,
    ) -> Result<u64, AppError> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", R::TABLE, R::OWNER_COLUMN);

        let result = sqlx::query(&sql).bind(owner_id).execute(&mut *conn).await?;

        Ok(result.rows_affected())
    }

    /// Bulk insert, split into statements that stay under the bind limit.
    pub async fn insert_many<R: OwnedRecord>(
        &self,
        conn: &mut PgConnection,
        owner_id: i64,
        records: &[R],
    ) -> Result<u64, AppError> {
        let mut inserted = 0;

        for chunk in records.chunks(rows_per_statement::<R>()) {
            let mut qb = build_insert(owner_id, chunk);
            let result = qb
                .build()
                .execute(&mut *conn)
                .await
                .map_err(|e| missing_reference(e, "Referenced record"))?;
            inserted += result.rows_affected();
        }

        Ok(inserted)
    }

    pub async fn upsert_many<R: KeyedRecord>(
        &self,
        conn: &mut PgConnection,
        owner_id: i64,
        records: &[R],
    ) -> Result<u64, AppError> {
        let mut written = 0;

        for chunk in records.chunks(rows_per_statement::<R>()) {
            let mut qb = build_upsert(owner_id, chunk);
            let result = qb
                .build()
                .execute(&mut *conn)
                .await
                .map_err(|e| missing_reference(e, "Form field"))?;
            written += result.rows_affected();
        }

        Ok(written)
    }

    /// Rows in insertion order.
    pub async fn list_for_owner<'e, R, E>(
        &self,
        executor: E,
        owner_id: i64,
    ) -> Result<Vec<R::Row>, AppError>
    where
        R: OwnedRecord,
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1 ORDER BY {} ASC",
            R::TABLE,
            R::OWNER_COLUMN,
            R::ORDER_BY
        );

        let rows = sqlx::query_as::<_, R::Row>(&sql)
            .bind(owner_id)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }
}

fn rows_per_statement<R: OwnedRecord>() -> usize {
    MAX_BIND_PARAMS / (R::COLUMNS.len() + 1)
}

pub(crate) fn build_insert<'args, R: OwnedRecord>(
    owner_id: i64,
    records: &[R],
) -> QueryBuilder<'args, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "INSERT INTO {} ({}, {}) ",
        R::TABLE,
        R::OWNER_COLUMN,
        R::COLUMNS.join(", ")
    ));

    qb.push_values(records, |mut row, record| {
        row.push_bind(owner_id);
        record.push_values(&mut row);
    });

    qb
}

pub(crate) fn build_upsert<'args, R: KeyedRecord>(
    owner_id: i64,
    records: &[R],
) -> QueryBuilder<'args, Postgres> {
    let mut qb = build_insert(owner_id, records);

    let mut assignments: Vec<String> = R::UPDATE_COLUMNS
        .iter()
        .map(|col| format!("{col} = EXCLUDED.{col}"))
        .collect();
    if let Some(col) = R::TOUCHED_AT_COLUMN {
        assignments.push(format!("{col} = NOW()"));
    }

    qb.push(format!(
        " ON CONFLICT ({}, {}) DO UPDATE SET {}",
        R::OWNER_COLUMN,
        R::KEY_COLUMN,
        assignments.join(", ")
    ));

    qb
}

// =========================================================================
//  COLUMN MAPS
// =========================================================================

impl OwnedRecord for IncomeSourceInput {
    const TABLE: &'static str = "financials_income";
    const COLUMNS: &'static [&'static str] = &["source", "owner", "monthly_amount"];
    type Row = IncomeSource;

    fn push_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.source.clone())
            .push_bind(self.owner.clone())
            .push_bind(self.monthly_amount);
    }
}

impl OwnedRecord for AssetInput {
    const TABLE: &'static str = "financials_assets";
    const COLUMNS: &'static [&'static str] = &["asset_type", "description", "owner", "balance"];
    type Row = Asset;

    fn push_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.asset_type.clone())
            .push_bind(self.description.clone())
            .push_bind(self.owner.clone())
            .push_bind(self.balance);
    }
}

impl OwnedRecord for LiabilityInput {
    const TABLE: &'static str = "financials_liabilities";
    const COLUMNS: &'static [&'static str] = &["liability_type", "description", "balance"];
    type Row = Liability;

    fn push_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.liability_type.clone())
            .push_bind(self.description.clone())
            .push_bind(self.balance);
    }
}

impl OwnedRecord for FamilyMemberInput {
    const TABLE: &'static str = "family_members";
    const COLUMNS: &'static [&'static str] =
        &["relationship", "full_name", "date_of_birth", "resident_state"];
    type Row = FamilyMember;

    fn push_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.relationship.clone())
            .push_bind(self.full_name.clone())
            .push_bind(self.date_of_birth)
            .push_bind(self.resident_state.clone());
    }
}

impl OwnedRecord for QuestionnaireAnswerInput {
    const TABLE: &'static str = "client_questionnaire_answers";
    const COLUMNS: &'static [&'static str] = &["form_field_id", "answer"];
    const ORDER_BY: &'static str = "form_field_id";
    type Row = StoredAnswer;

    fn push_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.form_field_id).push_bind(self.answer.clone());
    }
}

impl KeyedRecord for QuestionnaireAnswerInput {
    const KEY_COLUMN: &'static str = "form_field_id";
    const UPDATE_COLUMNS: &'static [&'static str] = &["answer"];
    const TOUCHED_AT_COLUMN: Option<&'static str> = Some("updated_at");

    fn key(&self) -> i64 {
        self.form_field_id
    }
}

/// Raw answer row; the labelled view lives in `ClientRepository`.
#[derive(Debug, Clone, FromRow)]
pub struct StoredAnswer {
    pub client_user_id: i64,
    pub form_field_id: i64,
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn income(source: &str) -> IncomeSourceInput {
        IncomeSourceInput {
            source: source.to_string(),
            owner: None,
            monthly_amount: Decimal::new(1000, 0),
        }
    }

    #[test]
    fn insert_binds_owner_then_allow_listed_columns() {
        let records = vec![income("Salary"), income("Rent")];
        let qb = build_insert(42, &records);

        assert_eq!(
            qb.sql(),
            "INSERT INTO financials_income (client_user_id, source, owner, monthly_amount) \
             VALUES ($1, $2, $3, $4), ($5, $6, $7, $8)"
        );
    }

    #[test]
    fn upsert_targets_owner_and_key() {
        let answers = vec![QuestionnaireAnswerInput {
            form_field_id: 3,
            answer: "Yes".into(),
        }];
        let qb = build_upsert(7, &answers);

        assert_eq!(
            qb.sql(),
            "INSERT INTO client_questionnaire_answers (client_user_id, form_field_id, answer) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (client_user_id, form_field_id) DO UPDATE SET answer = EXCLUDED.answer, updated_at = NOW()"
        );
    }

    #[test]
    fn chunks_respect_bind_limit() {
        // 4 binds per income row
        assert_eq!(rows_per_statement::<IncomeSourceInput>(), 16_383);
        assert!(rows_per_statement::<AssetInput>() * (AssetInput::COLUMNS.len() + 1) <= MAX_BIND_PARAMS);
    }

    #[test]
    fn column_maps_match_bind_counts() {
        fn binds<R: OwnedRecord>(record: &R) -> usize {
            let qb = build_insert(1, std::slice::from_ref(record));
            qb.sql().matches('$').count()
        }

        let asset = AssetInput {
            asset_type: "Savings".into(),
            description: None,
            owner: None,
            balance: Decimal::ZERO,
        };
        let liability = LiabilityInput {
            liability_type: "Mortgage".into(),
            description: None,
            balance: Decimal::ZERO,
        };
        let member = FamilyMemberInput {
            relationship: "Child".into(),
            full_name: "A".into(),
            date_of_birth: None,
            resident_state: None,
        };

        assert_eq!(binds(&income("x")), IncomeSourceInput::COLUMNS.len() + 1);
        assert_eq!(binds(&asset), AssetInput::COLUMNS.len() + 1);
        assert_eq!(binds(&liability), LiabilityInput::COLUMNS.len() + 1);
        assert_eq!(binds(&member), FamilyMemberInput::COLUMNS.len() + 1);
    }
}

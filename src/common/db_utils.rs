// src/common/db_utils.rs

use crate::common::error::AppError;

/// Translates constraint violations into the matching domain error.
///
/// Unique violations become `UniqueConstraintViolation` with the caller's
/// message, foreign-key violations become `NotFound` (the referenced row is
/// missing). Everything else stays a database error.
pub(crate) fn classify_db_error(
    e: sqlx::Error,
    on_conflict: impl FnOnce() -> String,
    on_missing_reference: impl FnOnce() -> String,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(on_conflict());
        }
        if db_err.is_foreign_key_violation() {
            return AppError::NotFound(on_missing_reference());
        }
    }
    e.into()
}

/// Same as `classify_db_error` for statements that cannot hit a unique key.
pub(crate) fn missing_reference(e: sqlx::Error, what: &str) -> AppError {
    classify_db_error(
        e,
        || "Record already exists.".to_string(),
        || format!("{} not found.", what),
    )
}

// src/models/profile.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::{appointments::Appointment, documents::Document};

// =========================================================================
//  OWNED CHILD RECORDS (replaced wholesale)
// =========================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct IncomeSource {
    pub id: i64,
    pub client_user_id: i64,
    pub source: String,
    pub owner: Option<String>,
    #[schema(value_type = f64)]
    pub monthly_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct IncomeSourceInput {
    #[validate(length(min = 1, max = 255, message = "required"))]
    #[schema(example = "Salary")]
    pub source: String,

    #[validate(length(max = 255))]
    #[schema(example = "Client")]
    pub owner: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = f64, example = 8500.0)]
    pub monthly_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Asset {
    pub id: i64,
    pub client_user_id: i64,
    pub asset_type: String,
    pub description: Option<String>,
    pub owner: Option<String>,
    #[schema(value_type = f64)]
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct AssetInput {
    #[validate(length(min = 1, max = 255, message = "required"))]
    #[schema(example = "Brokerage account")]
    pub asset_type: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(length(max = 255))]
    pub owner: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = f64, example = 125000.0)]
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Liability {
    pub id: i64,
    pub client_user_id: i64,
    pub liability_type: String,
    pub description: Option<String>,
    #[schema(value_type = f64)]
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct LiabilityInput {
    #[validate(length(min = 1, max = 255, message = "required"))]
    #[schema(example = "Mortgage")]
    pub liability_type: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = f64, example = 240000.0)]
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FamilyMember {
    pub id: i64,
    pub client_user_id: i64,
    pub relationship: String,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub resident_state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct FamilyMemberInput {
    #[validate(length(min = 1, max = 100, message = "required"))]
    #[schema(example = "Child")]
    pub relationship: String,

    #[validate(length(min = 1, max = 255, message = "required"))]
    pub full_name: String,

    #[schema(value_type = Option<String>, format = Date, example = "2012-04-30")]
    pub date_of_birth: Option<NaiveDate>,

    #[validate(length(max = 100))]
    pub resident_state: Option<String>,
}

// =========================================================================
//  QUESTIONNAIRE (keyed upsert)
// =========================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct QuestionnaireAnswerInput {
    #[schema(example = 12)]
    pub form_field_id: i64,

    #[validate(length(max = 10000))]
    #[schema(example = "More than 10 years")]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct QuestionnaireAnswer {
    pub form_field_id: i64,
    pub question: String,
    pub answer: String,
    pub updated_at: DateTime<Utc>,
}

// =========================================================================
//  PROFILE & SPOUSE (single rows)
// =========================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ClientProfile {
    pub client_user_id: i64,
    #[schema(value_type = Option<String>, format = Date)]
    pub date_of_birth: Option<NaiveDate>,
    pub marital_status: Option<String>,
    pub preferred_contact_method: Option<String>,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub occupation: Option<String>,
    pub employer_name: Option<String>,
    pub onboarding_status: String,
    pub tier: Option<String>,
}

/// Profile joined with the identity columns from `users`.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub profile: ClientProfile,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePersonalInfoPayload {
    #[schema(value_type = Option<String>, format = Date, example = "1980-01-31")]
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 50))]
    pub marital_status: Option<String>,
    #[validate(length(max = 50))]
    pub preferred_contact_method: Option<String>,
    #[validate(length(max = 255))]
    pub address_line_1: Option<String>,
    #[validate(length(max = 255))]
    pub address_line_2: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 20))]
    pub zip_code: Option<String>,
    #[validate(length(max = 255))]
    pub occupation: Option<String>,
    #[validate(length(max = 255))]
    pub employer_name: Option<String>,
}

impl UpdatePersonalInfoPayload {
    pub fn is_empty(&self) -> bool {
        self.date_of_birth.is_none()
            && [
                &self.marital_status,
                &self.preferred_contact_method,
                &self.address_line_1,
                &self.address_line_2,
                &self.city,
                &self.state,
                &self.country,
                &self.zip_code,
                &self.occupation,
                &self.employer_name,
            ]
            .iter()
            .all(|v| v.is_none())
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Spouse {
    pub client_user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub occupation: Option<String>,
    pub employer_name: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct SpousePayload {
    #[validate(length(max = 255))]
    pub first_name: Option<String>,
    #[validate(length(max = 255))]
    pub last_name: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub date_of_birth: Option<NaiveDate>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone_number: Option<String>,
    #[validate(length(max = 255))]
    pub occupation: Option<String>,
    #[validate(length(max = 255))]
    pub employer_name: Option<String>,
}

impl SpousePayload {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.date_of_birth.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.occupation.is_none()
            && self.employer_name.is_none()
    }
}

// =========================================================================
//  SUMMARY (advisor detail page / client summary page)
// =========================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct Financials {
    pub income: Vec<IncomeSource>,
    pub assets: Vec<Asset>,
    pub liabilities: Vec<Liability>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClientSummary {
    pub personal_info: Option<PersonalInfo>,
    pub spouse_info: Option<Spouse>,
    pub family_info: Vec<FamilyMember>,
    pub investor_profile: Vec<QuestionnaireAnswer>,
    pub financials: Financials,
    pub documents: Vec<Document>,
    pub appointments: Vec<Appointment>,
}

pub(crate) fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("The amount cannot be negative.".into());
        return Err(err);
    }
    Ok(())
}

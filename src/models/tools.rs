// src/models/tools.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::profile::non_negative;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    #[default]
    MarriedJointly,
    MarriedSeparately,
    HeadOfHousehold,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct IncomeTaxPayload {
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = f64, example = 120000.0)]
    pub gross_income: Decimal,

    // Sum of every deduction taken
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = f64, example = 30000.0)]
    pub deductions: Decimal,

    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = f64, example = 2000.0)]
    pub credits: Decimal,

    #[serde(default)]
    pub filing_status: FilingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IncomeTaxResults {
    #[schema(value_type = f64)]
    pub gross_income: Decimal,
    #[schema(value_type = f64)]
    pub total_deductions: Decimal,
    #[schema(value_type = f64)]
    pub taxable_income: Decimal,
    #[schema(value_type = f64)]
    pub tax_before_credits: Decimal,
    #[schema(value_type = f64)]
    pub tax_credits: Decimal,
    #[schema(value_type = f64)]
    pub final_tax_owed: Decimal,
    #[schema(value_type = f64)]
    pub effective_tax_rate_percent: Decimal,
    #[schema(value_type = f64)]
    pub marginal_tax_rate_percent: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IncomeTaxReport {
    pub inputs: IncomeTaxPayload,
    pub results: IncomeTaxResults,
}

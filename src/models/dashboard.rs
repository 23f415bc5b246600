// src/models/dashboard.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TierCount {
    // Clients without a tier are counted under null
    pub tier: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OnboardingStatusCount {
    pub onboarding_status: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WeekdayCount {
    #[schema(example = "Mon")]
    pub day: String,
    pub count: i64,
}

/// Advisor dashboard figures, over the advisor's assigned clients only.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    pub clients_by_tier: Vec<TierCount>,
    pub clients_by_onboarding_status: Vec<OnboardingStatusCount>,
    /// Monday to Sunday of the current (UTC) week.
    pub appointments_weekly: Vec<WeekdayCount>,
    pub meetings_today: i64,
}

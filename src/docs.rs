// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::change_password,
        handlers::auth::set_two_factor,

        // --- Admin ---
        handlers::admin::create_user,
        handlers::admin::list_users,
        handlers::admin::update_user,
        handlers::admin::delete_user,
        handlers::admin::assign_advisor,
        handlers::admin::get_content,
        handlers::admin::update_content,

        // --- Forms ---
        handlers::forms::get_active_form,
        handlers::forms::get_form_for_editing,
        handlers::forms::create_field,
        handlers::forms::update_field,
        handlers::forms::delete_field,
        handlers::forms::create_option,
        handlers::forms::update_option,
        handlers::forms::delete_option,

        // --- Advisor ---
        handlers::advisor::list_clients,
        handlers::advisor::create_client,
        handlers::advisor::get_client,
        handlers::advisor::update_client,
        handlers::advisor::schedule_appointment,
        handlers::advisor::next_appointment,
        handlers::advisor::dashboard_stats,
        handlers::advisor::income_tax_tool,
        handlers::advisor::list_plans,
        handlers::advisor::create_plan,
        handlers::advisor::download_document,

        // --- Client ---
        handlers::client::get_profile,
        handlers::client::update_personal_info,
        handlers::client::update_spouse,
        handlers::client::list_family,
        handlers::client::replace_family,
        handlers::client::list_income,
        handlers::client::replace_income,
        handlers::client::list_assets,
        handlers::client::replace_assets,
        handlers::client::list_liabilities,
        handlers::client::replace_liabilities,
        handlers::client::get_questionnaire,
        handlers::client::save_questionnaire,
        handlers::client::submit_onboarding,
        handlers::client::list_documents,
        handlers::client::upload_document,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::mark_read,
    ),
    components(
        schemas(
            models::MessageResponse,

            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::ChangePasswordPayload,
            models::auth::TwoFactorPayload,

            // --- Admin ---
            models::admin::CreateUserPayload,
            models::admin::UpdateUserPayload,
            models::admin::AssignAdvisorPayload,
            models::admin::ContentPage,
            models::admin::UpdateContentPayload,

            // --- Forms ---
            models::forms::FieldType,
            models::forms::FormField,
            models::forms::FormOption,
            models::forms::FieldNode,
            models::forms::OptionNode,
            models::forms::CreateFieldPayload,
            models::forms::UpdateFieldPayload,
            models::forms::CreateOptionPayload,
            models::forms::UpdateOptionPayload,

            // --- Clients ---
            models::clients::ClientListEntry,
            models::clients::CreateClientPayload,
            models::clients::CreatedClient,
            models::clients::UpdateClientPayload,

            // --- Advisor dashboard & tools ---
            models::dashboard::TierCount,
            models::dashboard::OnboardingStatusCount,
            models::dashboard::WeekdayCount,
            models::dashboard::DashboardStats,
            models::plans::FinancialPlan,
            models::plans::CreatePlanPayload,
            models::tools::FilingStatus,
            models::tools::IncomeTaxPayload,
            models::tools::IncomeTaxResults,
            models::tools::IncomeTaxReport,

            // --- Profile ---
            models::profile::ClientProfile,
            models::profile::PersonalInfo,
            models::profile::UpdatePersonalInfoPayload,
            models::profile::Spouse,
            models::profile::SpousePayload,
            models::profile::FamilyMember,
            models::profile::FamilyMemberInput,
            models::profile::IncomeSource,
            models::profile::IncomeSourceInput,
            models::profile::Asset,
            models::profile::AssetInput,
            models::profile::Liability,
            models::profile::LiabilityInput,
            models::profile::QuestionnaireAnswer,
            models::profile::QuestionnaireAnswerInput,
            models::profile::Financials,
            models::profile::ClientSummary,

            // --- Appointments & documents ---
            models::appointments::Appointment,
            models::appointments::NextAppointment,
            models::appointments::ScheduleAppointmentPayload,
            models::appointments::Notification,
            models::documents::Document,
            handlers::client::UploadDocumentForm,
        )
    ),
    tags(
        (name = "Auth", description = "Sign-in"),
        (name = "Users", description = "The signed-in user's own account"),
        (name = "Admin", description = "User management, advisor assignment and site content"),
        (name = "Forms", description = "Dynamic form definitions and their assembled trees"),
        (name = "Advisor", description = "Advisor workspace: clients, plans, appointments, documents, tools"),
        (name = "Client", description = "Client onboarding: profile, financials, questionnaire, documents"),
        (name = "Notifications", description = "In-app notifications")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::patients::list_patients,
        crate::handlers::patients::admit_patient,
        crate::handlers::patients::iv_history,
        crate::handlers::iv_items::list_iv_items,
        crate::handlers::iv_items::add_iv_item,
        crate::handlers::assignments::assign_iv_item,
        crate::handlers::assignments::remove_assignment,
        crate::handlers::billing::billing_summary,
        crate::handlers::billing::patient_charges,
        crate::handlers::billing::patient_billing,
        crate::handlers::discharge::discharge_patient,
        crate::handlers::discharge::discharged_patient,
    ),
    components(
        schemas(
            crate::error::ApiErrorResponse,
            crate::handlers::health::HealthResponse,
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::auth::MessageResponse,
            crate::handlers::patients::CreatePatientRequest,
            crate::handlers::iv_items::CreateIvItemRequest,
            crate::handlers::assignments::CreateAssignmentRequest,
            billing_service::Role,
            billing_service::IvStatus,
            billing_service::Patient,
            billing_service::PatientListEntry,
            billing_service::IvItem,
            billing_service::Assignment,
            billing_service::AssignmentLine,
            billing_service::SummaryLine,
            billing_service::BillingSummary,
            billing_service::PatientCharge,
            billing_service::PatientBilling,
            billing_service::IvHistory,
            billing_service::IvHistoryEntry,
            billing_service::DischargeReceipt,
            billing_service::DischargeRecord,
            billing_service::DischargedPatient,
            billing_service::DischargedAssignment,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "authentication", description = "Staff registration and login"),
        (name = "ward", description = "Patient intake, IV catalog and assignments"),
        (name = "billing", description = "Charges, corrections and discharge"),
    ),
    info(
        title = "Ward IV Billing API",
        version = "0.1.0",
        description = "Tracks IV fluids given to ward patients, bills them and archives the bill at discharge.",
    ),
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

use crate::error::ApiError;
use crate::extractors::PathId;
use crate::server::WardServer;
use axum::{extract::State, Json};
use billing_service::{BillingSummary, PatientBilling, PatientCharge};

#[utoipa::path(
    get,
    path = "/api/billing/summary",
    tag = "billing",
    responses(
        (status = 200, description = "Revenue over every live assignment", body = BillingSummary)
    )
)]
pub async fn billing_summary(State(server): State<WardServer>) -> Result<Json<BillingSummary>, ApiError> {
    Ok(Json(server.billing.billing_summary().await?))
}

#[utoipa::path(
    get,
    path = "/api/billing/patients",
    tag = "billing",
    responses(
        (status = 200, description = "Running total per live patient, ordered by name", body = [PatientCharge])
    )
)]
pub async fn patient_charges(State(server): State<WardServer>) -> Result<Json<Vec<PatientCharge>>, ApiError> {
    Ok(Json(server.billing.patient_charges().await?))
}

/// Itemized bill; an unknown id returns an empty bill with `patient: null`
#[utoipa::path(
    get,
    path = "/api/billing/patient/{id}",
    tag = "billing",
    params(("id" = i32, Path, description = "Live patient id")),
    responses(
        (status = 200, description = "Itemized bill", body = PatientBilling)
    )
)]
pub async fn patient_billing(
    State(server): State<WardServer>,
    PathId(patient_id): PathId,
) -> Result<Json<PatientBilling>, ApiError> {
    Ok(Json(server.billing.patient_billing(patient_id).await?))
}

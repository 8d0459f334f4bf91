use crate::error::ApiError;
use crate::extractors::PathId;
use crate::server::WardServer;
use axum::{extract::State, Json};
use billing_service::{DischargeReceipt, DischargeRecord};

/// Archive the patient with a frozen bill and remove the live rows
#[utoipa::path(
    post,
    path = "/api/patients/{id}/discharge",
    tag = "billing",
    params(("id" = i32, Path, description = "Live patient id")),
    responses(
        (status = 200, description = "Patient discharged", body = DischargeReceipt),
        (status = 404, description = "Patient not found", body = crate::error::ApiErrorResponse),
        (status = 503, description = "Database busy, retry later", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn discharge_patient(
    State(server): State<WardServer>,
    PathId(patient_id): PathId,
) -> Result<Json<DischargeReceipt>, ApiError> {
    Ok(Json(server.billing.discharge_patient(patient_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/discharged-patients/{id}",
    tag = "billing",
    params(("id" = i32, Path, description = "Archive id returned by the discharge")),
    responses(
        (status = 200, description = "Archived patient and assignments", body = DischargeRecord),
        (status = 404, description = "No such discharge", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn discharged_patient(
    State(server): State<WardServer>,
    PathId(discharged_patient_id): PathId,
) -> Result<Json<DischargeRecord>, ApiError> {
    Ok(Json(server.billing.discharged_patient(discharged_patient_id).await?))
}

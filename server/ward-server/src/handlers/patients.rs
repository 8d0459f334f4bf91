use crate::error::ApiError;
use crate::extractors::{PathId, ValidatedJson};
use crate::server::WardServer;
use crate::validation::RequestValidation;
use crate::{validate_max_chars, validate_required};
use axum::{extract::State, http::StatusCode, Json};
use billing_service::{
    IvHistory, NewPatient, Patient, PatientListEntry, MAX_GENDER_CHARS, MAX_NAME_CHARS,
    MAX_ROOM_NUMBER_CHARS,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

/// Nurse intake form
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePatientRequest {
    #[schema(example = "Asha")]
    pub name: String,
    pub admission_date: NaiveDate,
    /// Defaults to `admission_date` when omitted
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub room_number: Option<String>,
    pub diagnosis: Option<String>,
}

impl RequestValidation for CreatePatientRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.name, "Name and admission date are required");
        validate_max_chars!(
            Some(self.name.as_str()),
            MAX_NAME_CHARS,
            "name must be at most 255 characters"
        );
        validate_max_chars!(self.gender, MAX_GENDER_CHARS, "gender must be at most 10 characters");
        validate_max_chars!(
            self.room_number,
            MAX_ROOM_NUMBER_CHARS,
            "room_number must be at most 20 characters"
        );
        Ok(())
    }
}

impl From<CreatePatientRequest> for NewPatient {
    fn from(request: CreatePatientRequest) -> Self {
        NewPatient {
            name: request.name.trim().to_string(),
            dob: request.dob.unwrap_or(request.admission_date),
            gender: request.gender,
            room_number: request.room_number,
            admission_date: request.admission_date,
            diagnosis: request.diagnosis,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/patients",
    tag = "ward",
    responses(
        (status = 200, description = "Live patients ordered by name", body = [PatientListEntry])
    )
)]
pub async fn list_patients(
    State(server): State<WardServer>,
) -> Result<Json<Vec<PatientListEntry>>, ApiError> {
    Ok(Json(server.billing.list_patients().await?))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    tag = "ward",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient admitted", body = Patient),
        (status = 400, description = "Missing name or admission date, or a field too long", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn admit_patient(
    State(server): State<WardServer>,
    ValidatedJson(request): ValidatedJson<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let patient = server.billing.admit_patient(request.into()).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

#[utoipa::path(
    get,
    path = "/api/nurse/patient/{id}/iv-history",
    tag = "ward",
    params(("id" = i32, Path, description = "Live patient id")),
    responses(
        (status = 200, description = "IV assignments, most recent first", body = IvHistory),
        (status = 404, description = "Patient not found", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn iv_history(
    State(server): State<WardServer>,
    PathId(patient_id): PathId,
) -> Result<Json<IvHistory>, ApiError> {
    Ok(Json(server.billing.nurse_iv_history(patient_id).await?))
}

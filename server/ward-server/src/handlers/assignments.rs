use crate::error::ApiError;
use crate::extractors::{PathId, ValidatedJson};
use crate::handlers::auth::MessageResponse;
use crate::server::WardServer;
use crate::{validate_max, validate_min};
use crate::validation::RequestValidation;
use axum::{extract::State, Json};
use billing_service::{Assignment, MAX_QUANTITY};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAssignmentRequest {
    pub patient_id: i32,
    pub iv_item_id: i32,
    /// Defaults to 1; at most 10000
    pub quantity: Option<i32>,
}

impl RequestValidation for CreateAssignmentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(quantity) = self.quantity {
            validate_min!(quantity, 1, "quantity must be at least 1");
            validate_max!(quantity, MAX_QUANTITY, "quantity must be at most 10000");
        }
        Ok(())
    }
}

#[utoipa::path(
    post,
    path = "/api/patient-iv-assignments",
    tag = "ward",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 200, description = "Assignment recorded and patient marked active", body = Assignment),
        (status = 400, description = "Quantity outside 1..=10000", body = crate::error::ApiErrorResponse),
        (status = 404, description = "Patient or IV item not found", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn assign_iv_item(
    State(server): State<WardServer>,
    ValidatedJson(request): ValidatedJson<CreateAssignmentRequest>,
) -> Result<Json<Assignment>, ApiError> {
    let assignment = server
        .billing
        .assign_iv_item(request.patient_id, request.iv_item_id, request.quantity)
        .await?;

    Ok(Json(assignment))
}

#[utoipa::path(
    delete,
    path = "/api/iv-assignment/{id}",
    tag = "billing",
    params(("id" = i32, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment deleted", body = MessageResponse),
        (status = 404, description = "Assignment not found", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn remove_assignment(
    State(server): State<WardServer>,
    PathId(assignment_id): PathId,
) -> Result<Json<MessageResponse>, ApiError> {
    server.billing.remove_assignment(assignment_id).await?;
    Ok(Json(MessageResponse::new("Assignment deleted successfully")))
}

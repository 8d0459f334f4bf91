//! Staff registration and login
//!
//! Login only reports the caller's role; no session or token is issued.

use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::server::WardServer;
use crate::validation::RequestValidation;
use crate::validate_required;
use axum::{extract::State, http::StatusCode, Json};
use billing_service::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "sister.anne")]
    pub username: String,
    pub password: String,
    /// Defaults to `nurse`
    pub role: Option<Role>,
}

impl RequestValidation for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.username, "Username and password are required");
        validate_required!(self.password, "Username and password are required");
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl RequestValidation for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.username, "username and password required");
        validate_required!(self.password, "username and password required");
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub role: Role,
}

/// Plain acknowledgement body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/register",
    tag = "authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = MessageResponse),
        (status = 400, description = "Missing username or password", body = crate::error::ApiErrorResponse),
        (status = 409, description = "Username already exists", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn register(
    State(server): State<WardServer>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    server
        .billing
        .register(&request.username, &request.password, request.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Registration successful")),
    ))
}

#[utoipa::path(
    post,
    path = "/api/login",
    tag = "authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn login(
    State(server): State<WardServer>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let role = server
        .billing
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse { role }))
}

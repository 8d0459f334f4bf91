use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::server::WardServer;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_max_chars, validate_required};
use axum::{extract::State, http::StatusCode, Json};
use billing_service::{IvItem, NewIvItem, MAX_NAME_CHARS, MAX_UNIT_PRICE_INR, MONEY_SCALE};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateIvItemRequest {
    #[schema(example = "Saline 500ml")]
    pub name: String,
    /// Unit price; a JSON number or decimal string
    #[schema(value_type = String, example = "50.00")]
    pub price_inr: Decimal,
}

impl RequestValidation for CreateIvItemRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.name, "Name and price are required");
        validate_max_chars!(
            Some(self.name.as_str()),
            MAX_NAME_CHARS,
            "name must be at most 255 characters"
        );
        validate_field!(
            self.price_inr,
            self.price_inr > Decimal::ZERO,
            "price_inr must be greater than 0"
        );
        validate_field!(
            self.price_inr,
            self.price_inr < Decimal::from(MAX_UNIT_PRICE_INR),
            "price_inr must be less than 100000000"
        );
        validate_field!(
            self.price_inr,
            self.price_inr.normalize().scale() <= MONEY_SCALE,
            "price_inr must have at most 2 decimal places"
        );
        Ok(())
    }
}

#[utoipa::path(
    get,
    path = "/api/iv-items",
    tag = "ward",
    responses(
        (status = 200, description = "Catalog ordered by name", body = [IvItem])
    )
)]
pub async fn list_iv_items(State(server): State<WardServer>) -> Result<Json<Vec<IvItem>>, ApiError> {
    Ok(Json(server.billing.list_iv_items().await?))
}

#[utoipa::path(
    post,
    path = "/api/iv-items",
    tag = "ward",
    request_body = CreateIvItemRequest,
    responses(
        (status = 201, description = "Item added", body = IvItem),
        (status = 400, description = "Missing name, or price not in (0, 100000000) with at most 2 decimals", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn add_iv_item(
    State(server): State<WardServer>,
    ValidatedJson(request): ValidatedJson<CreateIvItemRequest>,
) -> Result<(StatusCode, Json<IvItem>), ApiError> {
    let item = server
        .billing
        .add_iv_item(NewIvItem {
            name: request.name.trim().to_string(),
            price_inr: request.price_inr,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

use super::MERCHANT_HEADER;
use super::validation::{ChargeRequestBody, validate_charge};
use crate::application::engine::ChargeEngine;
use crate::domain::charge::{ChargeResult, MerchantId};
use crate::error::{FieldError, GatewayError};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{error, instrument, warn};

const CARD_DECLINED: &str = "Card declined";

fn merchant_from(headers: &HeaderMap) -> MerchantId {
    MerchantId::from_header(headers.get(MERCHANT_HEADER).and_then(|v| v.to_str().ok()))
}

fn validation_failure(errors: Vec<FieldError>) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
}

/// Declines render as a successful HTTP exchange; only bad input and faults use 400.
fn charge_response(result: ChargeResult) -> Response {
    match result {
        ChargeResult::Charged => (StatusCode::OK, Json(json!({}))).into_response(),
        ChargeResult::Declined { .. } | ChargeResult::Exhausted { .. } => {
            (StatusCode::OK, Json(json!({ "error": CARD_DECLINED }))).into_response()
        }
    }
}

fn error_response(error: GatewayError) -> Response {
    match error {
        GatewayError::Validation(errors) => validation_failure(errors),
        GatewayError::UnsupportedProvider(name) => validation_failure(vec![FieldError::new(
            "creditCardCompany",
            format!("Unsupported credit card company: {name}"),
        )]),
        GatewayError::Network(message) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
        other => {
            error!(error = %other, "charge failed unexpectedly");
            (StatusCode::BAD_REQUEST, Json(json!({ "error": "Internal error" }))).into_response()
        }
    }
}

/// `POST /api/charge`: validates the body and charges the card.
#[instrument(skip_all)]
pub async fn post_charge(
    State(engine): State<Arc<ChargeEngine>>,
    headers: HeaderMap,
    body: Result<Json<ChargeRequestBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "rejected malformed charge body");
            return validation_failure(vec![FieldError::new("body", rejection.body_text())]);
        }
    };

    let today = OffsetDateTime::now_utc().date();
    let request = match validate_charge(&body, engine.registry(), today) {
        Ok(request) => request,
        Err(errors) => return error_response(GatewayError::Validation(errors)),
    };

    let merchant = merchant_from(&headers);
    match engine.charge(&merchant, &request).await {
        Ok(result) => charge_response(result),
        Err(e) => error_response(e),
    }
}

/// `GET /api/chargeStatuses`: decline reasons recorded for the calling merchant.
#[instrument(skip_all)]
pub async fn get_charge_statuses(
    State(engine): State<Arc<ChargeEngine>>,
    headers: HeaderMap,
) -> Response {
    let merchant = merchant_from(&headers);
    match engine.charge_statuses(&merchant).await {
        Ok(counts) => (StatusCode::OK, Json(json!({ "chargeStatuses": counts }))).into_response(),
        Err(e) => {
            error!(%merchant, error = %e, "failed to list charge statuses");
            (
                StatusCode::OK,
                Json(json!({ "status": "Error", "message": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// `GET /healthcheck`: reports whether the processor answers its own health check.
#[instrument(skip_all)]
pub async fn get_healthcheck(State(engine): State<Arc<ChargeEngine>>) -> Response {
    match engine.processor_health().await {
        Ok(_) => Json(json!({ "status": "OK" })).into_response(),
        Err(e) => {
            warn!(error = %e, "processor health check failed");
            Json(json!({ "status": "ERR", "message": e.to_string() })).into_response()
        }
    }
}

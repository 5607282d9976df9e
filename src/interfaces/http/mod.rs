//! HTTP endpoints of the charge gateway.
//!
//! - `POST /api/charge` – validate and charge a card
//! - `GET /api/chargeStatuses` – decline reason counters for the calling merchant
//! - `GET /healthcheck` – probe the processor health endpoint
//!
//! The calling merchant is taken from the `merchant-identification` header.

pub mod handlers;
pub mod validation;

use crate::application::engine::ChargeEngine;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

pub const MERCHANT_HEADER: &str = "merchant-identification";

pub fn routes(engine: Arc<ChargeEngine>) -> Router {
    Router::new()
        .route("/api/charge", post(handlers::post_charge))
        .route("/api/chargeStatuses", get(handlers::get_charge_statuses))
        .route("/healthcheck", get(handlers::get_healthcheck))
        .with_state(engine)
}

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode};
use charge_gateway::domain::charge::MerchantId;
use charge_gateway::domain::ports::DeclineCounterStore;
use charge_gateway::interfaces::http::{MERCHANT_HEADER, routes};
use common::{Harness, Reply, ScriptedProcessor, harness};
use serde_json::{Value, json};
use tower::ServiceExt;

fn router(h: &Harness) -> Router {
    routes(h.engine.clone())
}

fn valid_body(company: &str) -> Value {
    json!({
        "fullName": "Ada Lovelace",
        "creditCardNumber": "4580 4580 4580 4580",
        "creditCardCompany": company,
        "expirationDate": "12/99",
        "cvv": "123",
        "amount": 25.5
    })
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn post_charge(merchant: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/charge")
        .header("content-type", "application/json");
    if let Some(merchant) = merchant {
        builder = builder.header(MERCHANT_HEADER, merchant);
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn get(uri: &str, merchant: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(merchant) = merchant {
        builder = builder.header(MERCHANT_HEADER, merchant);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_successful_charge_returns_empty_object() {
    let h = harness(ScriptedProcessor::always(Reply::Respond(200, String::new())));

    let (status, body) = send(&router(&h), post_charge(Some("acme"), &valid_body("visa"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_decline_is_reported_with_ok_status() {
    let h = harness(ScriptedProcessor::always(Reply::json(
        400,
        json!({ "decline_reason": "Insufficient funds" }),
    )));

    let (status, body) =
        send(&router(&h), post_charge(Some("acme"), &valid_body("mastercard"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "Card declined" }));
}

#[tokio::test]
async fn test_invalid_fields_are_all_reported() {
    let h = harness(ScriptedProcessor::always(Reply::Respond(200, String::new())));
    let mut body = valid_body("discover");
    body["cvv"] = json!("12");
    body["amount"] = json!(0);

    let (status, body) = send(&router(&h), post_charge(Some("acme"), &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "errors": [
            { "param": "creditCardCompany", "msg": "Invalid credit card company name" },
            { "param": "cvv", "msg": "Invalid cvv number" },
            { "param": "amount", "msg": "Invalid amount" }
        ]})
    );
    assert_eq!(h.processor.attempts(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let h = harness(ScriptedProcessor::always(Reply::Respond(200, String::new())));
    let request = Request::builder()
        .method("POST")
        .uri("/api/charge")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let (status, body) = send(&router(&h), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["param"], "body");
}

#[tokio::test]
async fn test_network_fault_surfaces_error_text() {
    let h = harness(ScriptedProcessor::always(Reply::Fail(
        "request timeout: deadline elapsed".to_string(),
    )));

    let (status, body) = send(&router(&h), post_charge(Some("acme"), &valid_body("visa"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "request timeout: deadline elapsed" }));
}

#[tokio::test]
async fn test_charge_statuses_lists_merchant_reasons() {
    let h = harness(ScriptedProcessor::always(Reply::Respond(200, String::new())));
    let acme = MerchantId::new("acme");
    h.counters.record_decline(&acme, "Timeout").await.unwrap();
    h.counters.record_decline(&acme, "Timeout").await.unwrap();
    h.counters
        .record_decline(&acme, "Insufficient funds")
        .await
        .unwrap();
    h.counters
        .record_decline(&MerchantId::new("globex"), "Timeout")
        .await
        .unwrap();

    let (status, body) = send(&router(&h), get("/api/chargeStatuses", Some("acme"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "chargeStatuses": [
            { "reason": "Insufficient funds", "count": 1 },
            { "reason": "Timeout", "count": 2 }
        ]})
    );
}

#[tokio::test]
async fn test_missing_merchant_header_uses_unspecified_bucket() {
    let h = harness(ScriptedProcessor::always(Reply::json(
        400,
        json!({ "decline_reason": "Insufficient funds" }),
    )));
    let app = router(&h);

    send(&app, post_charge(None, &valid_body("mastercard"))).await;
    send(&app, post_charge(Some("   "), &valid_body("mastercard"))).await;
    let (_, body) = send(&app, get("/api/chargeStatuses", None)).await;

    assert_eq!(
        body,
        json!({ "chargeStatuses": [{ "reason": "Insufficient funds", "count": 2 }] })
    );
}

#[tokio::test]
async fn test_non_utf8_merchant_header_uses_unspecified_bucket() {
    let h = harness(ScriptedProcessor::always(Reply::json(
        400,
        json!({ "decline_reason": "Insufficient funds" }),
    )));
    let app = router(&h);
    let mut request = post_charge(None, &valid_body("mastercard"));
    request.headers_mut().insert(
        MERCHANT_HEADER,
        HeaderValue::from_bytes(&[0xff, 0xfe, b'x']).unwrap(),
    );

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "Card declined" }));
    assert_eq!(
        h.counters
            .decline_counts(&MerchantId::unspecified())
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_healthcheck_reports_processor_state() {
    let healthy = harness(ScriptedProcessor::default());
    let (status, body) = send(&router(&healthy), get("/healthcheck", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "OK" }));

    let down = harness(ScriptedProcessor::default().unhealthy("Service Unavailable"));
    let (status, body) = send(&router(&down), get("/healthcheck", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "ERR", "message": "Service Unavailable" })
    );
}

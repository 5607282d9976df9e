//! Per-processor request mapping and response classification.
//!
//! Every [`ProviderKey`] has exactly one [`ProcessorAdapter`]. The adapter maps
//! each canonical field into zero or more processor fields; the partial maps are
//! merged into a single JSON object. Because each field has its own required
//! trait method, an adapter that forgets a field does not compile.

pub mod mastercard;
pub mod visa;

use crate::domain::charge::{CanonicalChargeRequest, Expiration};
use crate::domain::decision::Decision;
use crate::domain::provider::ProviderKey;
use crate::error::Result;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

pub use mastercard::MastercardAdapter;
pub use visa::VisaAdapter;

/// Fragment of a processor request body.
pub type Payload = Map<String, Value>;

/// Status code processors use to report a completed charge.
pub const SUCCESS_STATUS: u16 = 200;

pub trait ProcessorAdapter: Send + Sync {
    /// Path of the charge endpoint, relative to the processor base URL.
    fn endpoint(&self) -> &'static str;

    /// Decline reasons that must never be retried. Matched exactly.
    fn non_transient_reasons(&self) -> &'static [&'static str];

    fn full_name(&self, full_name: &str) -> Payload;
    fn card_number(&self, card_number: &str) -> Payload;
    fn expiration(&self, expiration: &Expiration) -> Payload;
    fn cvv(&self, cvv: &str) -> Payload;
    fn amount(&self, amount: Decimal) -> Payload;

    /// Interprets a completed response. Must not perform I/O.
    fn classify(&self, status: u16, body: &str) -> Decision;

    fn build_payload(&self, request: &CanonicalChargeRequest) -> Payload {
        let mut payload = Payload::new();
        payload.extend(self.full_name(request.full_name()));
        payload.extend(self.card_number(request.card_number()));
        payload.extend(self.expiration(request.expiration()));
        payload.extend(self.cvv(request.cvv()));
        payload.extend(self.amount(request.amount()));
        payload
    }
}

/// Serialized request body bound to its processor endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorRequest {
    pub endpoint: &'static str,
    pub payload: Vec<u8>,
}

pub fn adapter_for(key: ProviderKey) -> &'static dyn ProcessorAdapter {
    match key {
        ProviderKey::Visa => &VisaAdapter,
        ProviderKey::Mastercard => &MastercardAdapter,
    }
}

pub fn build_request(key: ProviderKey, request: &CanonicalChargeRequest) -> Result<ProcessorRequest> {
    let adapter = adapter_for(key);
    let payload = serde_json::to_vec(&adapter.build_payload(request))?;
    Ok(ProcessorRequest {
        endpoint: adapter.endpoint(),
        payload,
    })
}

pub fn classify(key: ProviderKey, status: u16, body: &str) -> Decision {
    adapter_for(key).classify(status, body)
}

/// Single-field payload helper.
pub(crate) fn field(name: &str, value: impl Into<Value>) -> Payload {
    let mut payload = Payload::new();
    payload.insert(name.to_string(), value.into());
    payload
}

/// Amounts travel as JSON numbers carrying the exact decimal digits.
pub(crate) fn amount_value(amount: Decimal) -> Value {
    rust_decimal::serde::arbitrary_precision::serialize(&amount, serde_json::value::Serializer)
        .unwrap_or_else(|_| Value::String(amount.to_string()))
}

use super::{Payload, ProcessorAdapter, SUCCESS_STATUS, amount_value, field};
use crate::domain::charge::{Expiration, sanitize_card_number};
use crate::domain::decision::Decision;
use rust_decimal::Decimal;
use serde::Deserialize;

const NON_TRANSIENT: &[&str] = &["Insufficient funds"];

/// Status Mastercard uses for a business decline; anything else is retried as-is.
const DECLINE_STATUS: u16 = 400;

#[derive(Debug, Deserialize)]
struct MastercardChargeResponse {
    decline_reason: Option<String>,
}

/// Mastercard takes snake_case fields, a split name and a dashed expiration.
#[derive(Debug, Clone, Copy, Default)]
pub struct MastercardAdapter;

/// Splits on the first whitespace run; everything after the first token is the last name.
///
/// Lossy for multi-part first names ("Mary Ann Smith" -> "Mary" / "Ann Smith").
fn split_name(full_name: &str) -> (&str, String) {
    let mut parts = full_name.split_whitespace();
    let first = parts.next().unwrap_or_default();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

impl ProcessorAdapter for MastercardAdapter {
    fn endpoint(&self) -> &'static str {
        "/mastercard/capture_card"
    }

    fn non_transient_reasons(&self) -> &'static [&'static str] {
        NON_TRANSIENT
    }

    fn full_name(&self, full_name: &str) -> Payload {
        let (first, last) = split_name(full_name);
        let mut payload = field("first_name", first);
        payload.extend(field("last_name", last));
        payload
    }

    fn card_number(&self, card_number: &str) -> Payload {
        field("card_number", sanitize_card_number(card_number))
    }

    fn expiration(&self, expiration: &Expiration) -> Payload {
        field("expiration", expiration.dashed())
    }

    fn cvv(&self, cvv: &str) -> Payload {
        field("cvv", cvv)
    }

    fn amount(&self, amount: Decimal) -> Payload {
        field("charge_amount", amount_value(amount))
    }

    fn classify(&self, status: u16, body: &str) -> Decision {
        if status == SUCCESS_STATUS {
            return Decision::Success;
        }
        let Ok(response) = serde_json::from_str::<MastercardChargeResponse>(body) else {
            return Decision::Retry { reason: None };
        };
        if status == DECLINE_STATUS {
            Decision::declined(response.decline_reason, self.non_transient_reasons())
        } else {
            Decision::Retry {
                reason: response.decline_reason,
            }
        }
    }
}

use super::{Payload, ProcessorAdapter, SUCCESS_STATUS, amount_value, field};
use crate::domain::charge::{Expiration, sanitize_card_number};
use crate::domain::decision::Decision;
use rust_decimal::Decimal;
use serde::Deserialize;

const NON_TRANSIENT: &[&str] = &["Insufficient funds"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisaChargeResponse {
    charge_result: Option<String>,
    result_reason: Option<String>,
}

/// Visa takes camelCase fields and reports `chargeResult`/`resultReason` in the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisaAdapter;

impl ProcessorAdapter for VisaAdapter {
    fn endpoint(&self) -> &'static str {
        "/visa/api/chargeCard"
    }

    fn non_transient_reasons(&self) -> &'static [&'static str] {
        NON_TRANSIENT
    }

    fn full_name(&self, full_name: &str) -> Payload {
        field("fullName", full_name)
    }

    fn card_number(&self, card_number: &str) -> Payload {
        field("number", sanitize_card_number(card_number))
    }

    fn expiration(&self, expiration: &Expiration) -> Payload {
        field("expiration", expiration.as_str())
    }

    fn cvv(&self, cvv: &str) -> Payload {
        field("cvv", cvv)
    }

    fn amount(&self, amount: Decimal) -> Payload {
        field("totalAmount", amount_value(amount))
    }

    fn classify(&self, status: u16, body: &str) -> Decision {
        if status == SUCCESS_STATUS {
            return Decision::Success;
        }
        let Ok(response) = serde_json::from_str::<VisaChargeResponse>(body) else {
            return Decision::Retry { reason: None };
        };
        match response.charge_result.as_deref() {
            // Contradicts the status code; give the processor another chance.
            Some("Success") => Decision::Retry { reason: None },
            Some("Failure") => Decision::declined(response.result_reason, self.non_transient_reasons()),
            _ => Decision::Retry {
                reason: response.result_reason,
            },
        }
    }
}

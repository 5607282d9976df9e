//! Field-level validation of inbound charge requests.

use crate::domain::charge::{CanonicalChargeRequest, Expiration, sanitize_card_number};
use crate::domain::provider::{ProviderName, ProviderRegistry};
use crate::error::FieldError;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use std::sync::LazyLock;
use time::Date;

// First name of 3+ word characters, whitespace, then 3+ word/space characters.
static FULL_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]{3,}\s+[A-Za-z0-9_\s]{3,}$").expect("valid full name pattern")
});

const CARD_NUMBER_LENGTH: usize = 16;
const CVV_LENGTH: usize = 3;

/// Charge request body as submitted by API callers.
///
/// Fields are kept as loose strings so every invalid field can be reported at once.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequestBody {
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub credit_card_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub credit_card_company: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub expiration_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cvv: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub amount: Option<String>,
}

/// Accepts strings as-is and renders any other JSON scalar as text.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

pub fn validate_full_name(full_name: &str) -> bool {
    let full_name = full_name.trim();
    full_name.len() >= 3 && FULL_NAME_PATTERN.is_match(full_name)
}

pub fn validate_card_number(card_number: &str) -> bool {
    let digits = sanitize_card_number(card_number);
    digits.len() == CARD_NUMBER_LENGTH
        && digits.bytes().all(|b| b.is_ascii_digit())
        && digits.bytes().any(|b| b != b'0')
}

pub fn validate_cvv(cvv: &str) -> bool {
    cvv.len() == CVV_LENGTH
        && cvv.bytes().all(|b| b.is_ascii_digit())
        && cvv.bytes().any(|b| b != b'0')
}

/// Parses the expiration and rejects cards that expired before `today`'s month.
pub fn validate_expiration(raw: &str, today: Date) -> Option<Expiration> {
    let expiration = Expiration::parse(raw)?;
    let current = i32::from(u8::from(today.month())) + 12 * (today.year() - 2000);
    (expiration.month_index() >= current).then_some(expiration)
}

/// Accepts any non-zero decimal; negative amounts are chargebacks.
pub fn validate_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|amount| !amount.is_zero())
}

pub fn validate_company(raw: &str, registry: &ProviderRegistry) -> Option<ProviderName> {
    raw.parse()
        .ok()
        .filter(|name| registry.is_enabled(*name))
}

fn check<T>(
    errors: &mut Vec<FieldError>,
    param: &str,
    value: Option<&str>,
    msg: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        errors.push(FieldError::new(param, "Invalid value"));
        return None;
    };
    let parsed = parse(value);
    if parsed.is_none() {
        errors.push(FieldError::new(param, msg));
    }
    parsed
}

/// Validates every field and builds the canonical request, or reports all rejected fields.
pub fn validate_charge(
    body: &ChargeRequestBody,
    registry: &ProviderRegistry,
    today: Date,
) -> Result<CanonicalChargeRequest, Vec<FieldError>> {
    let mut errors = Vec::new();

    let full_name = check(
        &mut errors,
        "fullName",
        body.full_name.as_deref(),
        "Invalid full name",
        |v| validate_full_name(v).then(|| v.trim().to_string()),
    );
    let card_number = check(
        &mut errors,
        "creditCardNumber",
        body.credit_card_number.as_deref(),
        "Invalid credit card number",
        |v| validate_card_number(v).then(|| sanitize_card_number(v)),
    );
    let provider = check(
        &mut errors,
        "creditCardCompany",
        body.credit_card_company.as_deref(),
        "Invalid credit card company name",
        |v| validate_company(v, registry),
    );
    let cvv = check(
        &mut errors,
        "cvv",
        body.cvv.as_deref(),
        "Invalid cvv number",
        |v| validate_cvv(v).then(|| v.to_string()),
    );
    let expiration = check(
        &mut errors,
        "expirationDate",
        body.expiration_date.as_deref(),
        "Invalid expiration Date",
        |v| validate_expiration(v, today),
    );
    let amount = check(
        &mut errors,
        "amount",
        body.amount.as_deref(),
        "Invalid amount",
        validate_amount,
    );

    match (full_name, card_number, provider, cvv, expiration, amount) {
        (
            Some(full_name),
            Some(card_number),
            Some(provider),
            Some(cvv),
            Some(expiration),
            Some(amount),
        ) => {
            Ok(CanonicalChargeRequest::new(
                full_name,
                card_number,
                expiration,
                cvv,
                amount,
                provider,
            ))
        }
        _ => Err(errors),
    }
}

use super::provider::ProviderName;
use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::LazyLock;

static EXPIRATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/?([0-9]{2})$").expect("valid expiration pattern"));

/// Removes all whitespace from a card number ("4580 4580 ..." -> "45804580...").
pub fn sanitize_card_number(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Card expiration in `MM/YY` (or `MMYY`) form.
///
/// Holds the text the caller submitted alongside the parsed month and
/// two-digit year, so adapters can forward either representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expiration {
    raw: String,
    month: u8,
    year: u8,
}

impl Expiration {
    /// Parses an expiration with the same grammar used by request validation.
    pub fn parse(raw: &str) -> Option<Self> {
        let captures = EXPIRATION_PATTERN.captures(raw)?;
        let month = captures.get(1)?.as_str().parse().ok()?;
        let year = captures.get(2)?.as_str().parse().ok()?;
        Some(Self {
            raw: raw.to_string(),
            month,
            year,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    /// Two-digit year.
    pub fn year(&self) -> u8 {
        self.year
    }

    /// Months elapsed since January 2000, used to compare against the current date.
    pub fn month_index(&self) -> i32 {
        i32::from(self.month) + 12 * i32::from(self.year)
    }

    /// `MM-YY`, as expected by processors that take a dashed expiration.
    pub fn dashed(&self) -> String {
        format!("{:02}-{:02}", self.month, self.year)
    }
}

/// A validated charge request, independent of any processor's wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalChargeRequest {
    full_name: String,
    card_number: String,
    expiration: Expiration,
    cvv: String,
    amount: Decimal,
    provider: ProviderName,
}

impl CanonicalChargeRequest {
    pub fn new(
        full_name: impl Into<String>,
        card_number: impl Into<String>,
        expiration: Expiration,
        cvv: impl Into<String>,
        amount: Decimal,
        provider: ProviderName,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            card_number: sanitize_card_number(&card_number.into()),
            expiration,
            cvv: cvv.into(),
            amount,
            provider,
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn card_number(&self) -> &str {
        &self.card_number
    }

    pub fn expiration(&self) -> &Expiration {
        &self.expiration
    }

    pub fn cvv(&self) -> &str {
        &self.cvv
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn provider(&self) -> ProviderName {
        self.provider
    }
}

/// Merchant bucket that decline counters are recorded under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MerchantId(String);

impl MerchantId {
    pub const UNSPECIFIED: &'static str = "unspecified-merchant-id";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Maps a missing or blank identification header to the unspecified bucket.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(id) if !id.is_empty() => Self(id.to_string()),
            _ => Self::unspecified(),
        }
    }

    pub fn unspecified() -> Self {
        Self(Self::UNSPECIFIED.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MerchantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final outcome of a charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeResult {
    Charged,
    /// The processor reported a reason that must not be retried.
    Declined { reason: String },
    /// Every attempt was declined with a retryable (or missing) reason.
    Exhausted { last_reason: Option<String> },
}

impl ChargeResult {
    pub fn is_charged(&self) -> bool {
        matches!(self, Self::Charged)
    }

    pub fn decline_reason(&self) -> Option<&str> {
        match self {
            Self::Charged => None,
            Self::Declined { reason } => Some(reason),
            Self::Exhausted { last_reason } => last_reason.as_deref(),
        }
    }
}

use super::charge::MerchantId;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Raw processor reply; any HTTP status is a valid response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorResponse {
    pub status: u16,
    pub body: String,
}

/// Outbound transport to the card processors.
///
/// Implementations return `GatewayError::Network` for transport failures only.
#[async_trait]
pub trait ProcessorClient: Send + Sync {
    async fn post(&self, endpoint: &str, payload: &[u8]) -> Result<ProcessorResponse>;
    async fn health(&self) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclineCount {
    pub reason: String,
    pub count: u64,
}

/// Per-merchant tally of decline reasons.
///
/// Increments may arrive concurrently for the same merchant and reason.
#[async_trait]
pub trait DeclineCounterStore: Send + Sync {
    async fn record_decline(&self, merchant: &MerchantId, reason: &str) -> Result<()>;
    async fn decline_counts(&self, merchant: &MerchantId) -> Result<Vec<DeclineCount>>;
}

pub type ProcessorClientBox = Box<dyn ProcessorClient>;
pub type DeclineCounterStoreBox = Box<dyn DeclineCounterStore>;

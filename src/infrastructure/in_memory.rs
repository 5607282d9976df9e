use crate::domain::charge::MerchantId;
use crate::domain::ports::{DeclineCount, DeclineCounterStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory tally of decline reasons per merchant.
///
/// Uses `Arc<RwLock<..>>` so clones share the same counters. Increments take
/// the write lock, so concurrent increments for the same merchant and reason
/// are serialized and none are lost.
#[derive(Default, Clone)]
pub struct InMemoryDeclineCounters {
    counters: Arc<RwLock<HashMap<MerchantId, BTreeMap<String, u64>>>>,
}

impl InMemoryDeclineCounters {
    /// Creates a new, empty counter store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeclineCounterStore for InMemoryDeclineCounters {
    async fn record_decline(&self, merchant: &MerchantId, reason: &str) -> Result<()> {
        let mut counters = self.counters.write().await;
        *counters
            .entry(merchant.clone())
            .or_default()
            .entry(reason.to_string())
            .or_default() += 1;
        Ok(())
    }

    async fn decline_counts(&self, merchant: &MerchantId) -> Result<Vec<DeclineCount>> {
        let counters = self.counters.read().await;
        Ok(counters
            .get(merchant)
            .into_iter()
            .flatten()
            .map(|(reason, count)| DeclineCount {
                reason: reason.clone(),
                count: *count,
            })
            .collect())
    }
}

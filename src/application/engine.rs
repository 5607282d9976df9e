use super::retry::{ChargeState, RetryPolicy};
use crate::adapters::{self, ProcessorRequest};
use crate::domain::charge::{CanonicalChargeRequest, ChargeResult, MerchantId};
use crate::domain::decision::AttemptOutcome;
use crate::domain::ports::{DeclineCount, DeclineCounterStoreBox, ProcessorClientBox};
use crate::domain::provider::{ProviderKey, ProviderRegistry};
use crate::error::{GatewayError, Result};
use tracing::{debug, error, info, warn};

/// Recorded when every attempt was declined without the processor naming a reason.
pub const UNKNOWN_DECLINE_REASON: &str = "Unknown decline reason";

/// The main entry point for charging cards.
///
/// `ChargeEngine` resolves the card company, builds the processor request once,
/// and drives the attempt loop. Each call runs on the caller's task; the engine
/// holds no per-request state, so concurrent charges do not contend on it.
pub struct ChargeEngine {
    registry: ProviderRegistry,
    processor: ProcessorClientBox,
    counters: DeclineCounterStoreBox,
    policy: RetryPolicy,
}

impl ChargeEngine {
    /// Creates a new `ChargeEngine` with the default retry policy.
    ///
    /// # Arguments
    ///
    /// * `registry` - Activation status of each card company.
    /// * `processor` - Transport used to reach the processors.
    /// * `counters` - Store for per-merchant decline reasons.
    pub fn new(
        registry: ProviderRegistry,
        processor: ProcessorClientBox,
        counters: DeclineCounterStoreBox,
    ) -> Self {
        Self {
            registry,
            processor,
            counters,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Charges a card, retrying transient declines.
    ///
    /// Declines are returned as [`ChargeResult`] values and recorded against
    /// `merchant`. A transport failure aborts the charge without further
    /// attempts; its error text is recorded as the reason and the error is
    /// returned to the caller.
    pub async fn charge(
        &self,
        merchant: &MerchantId,
        request: &CanonicalChargeRequest,
    ) -> Result<ChargeResult> {
        let key = self.registry.resolve_name(request.provider()).inspect_err(|e| {
            if let GatewayError::AdapterMismatch(name) = e {
                error!(provider = %name, "provider is enabled but no adapter is registered");
            }
        })?;
        let processor_request = adapters::build_request(key, request)?;

        match self.run_attempts(key, &processor_request).await {
            Ok(result) => {
                let reason = result.decline_reason().unwrap_or(UNKNOWN_DECLINE_REASON);
                match &result {
                    ChargeResult::Charged => {
                        info!(%merchant, provider = %key, "charge succeeded");
                    }
                    ChargeResult::Declined { .. } => {
                        info!(%merchant, provider = %key, %reason, "charge declined");
                        self.record(merchant, reason).await;
                    }
                    ChargeResult::Exhausted { .. } => {
                        info!(%merchant, provider = %key, %reason, "charge retries exhausted");
                        self.record(merchant, reason).await;
                    }
                }
                Ok(result)
            }
            Err(GatewayError::Network(message)) => {
                warn!(%merchant, provider = %key, error = %message, "processor unreachable, aborting charge");
                self.record(merchant, &message).await;
                Err(GatewayError::Network(message))
            }
            Err(e) => Err(e),
        }
    }

    /// Lists the decline reasons recorded for `merchant`.
    pub async fn charge_statuses(&self, merchant: &MerchantId) -> Result<Vec<DeclineCount>> {
        self.counters.decline_counts(merchant).await
    }

    /// Probes the processor health endpoint.
    pub async fn processor_health(&self) -> Result<String> {
        self.processor.health().await
    }

    async fn run_attempts(&self, key: ProviderKey, request: &ProcessorRequest) -> Result<ChargeResult> {
        let mut state = ChargeState::start();
        loop {
            let attempt = match state {
                ChargeState::Finished(result) => return Ok(result),
                ChargeState::Pending { attempt } => attempt,
            };

            let delay = self.policy.delay_before(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            debug!(provider = %key, attempt, endpoint = request.endpoint, "sending charge attempt");
            let response = self.processor.post(request.endpoint, &request.payload).await?;
            let outcome = AttemptOutcome {
                attempt,
                decision: adapters::classify(key, response.status, &response.body),
                status: response.status,
                body: response.body,
            };
            debug!(
                provider = %key,
                attempt = outcome.attempt,
                status = outcome.status,
                retry = outcome.decision.retry(),
                reason = outcome.decision.reason().unwrap_or_default(),
                "charge attempt classified"
            );

            state = state.advance(outcome.decision, &self.policy);
        }
    }

    async fn record(&self, merchant: &MerchantId, reason: &str) {
        if let Err(e) = self.counters.record_decline(merchant, reason).await {
            warn!(%merchant, %reason, error = %e, "failed to record decline reason");
        }
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use charge_gateway::application::engine::ChargeEngine;
use charge_gateway::application::retry::{Backoff, MAX_ATTEMPTS, RetryPolicy};
use charge_gateway::domain::charge::{CanonicalChargeRequest, Expiration};
use charge_gateway::domain::ports::{ProcessorClient, ProcessorResponse};
use charge_gateway::domain::provider::{ProviderName, ProviderRegistry};
use charge_gateway::error::{GatewayError, Result};
use charge_gateway::infrastructure::in_memory::InMemoryDeclineCounters;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One scripted processor reaction.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond(u16, String),
    Fail(String),
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Reply::Respond(status, body.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SentRequest {
    pub endpoint: String,
    pub payload: Vec<u8>,
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Reply>,
    last: Option<Reply>,
    sent: Vec<SentRequest>,
    unhealthy: Option<String>,
}

/// Processor double that plays back replies in order and repeats the last one.
#[derive(Clone, Default)]
pub struct ScriptedProcessor {
    script: Arc<Mutex<Script>>,
}

impl ScriptedProcessor {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        let processor = Self::default();
        processor.script.lock().unwrap().replies = replies.into_iter().collect();
        processor
    }

    pub fn always(reply: Reply) -> Self {
        Self::new([reply])
    }

    pub fn unhealthy(self, message: &str) -> Self {
        self.script.lock().unwrap().unhealthy = Some(message.to_string());
        self
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.script.lock().unwrap().sent.clone()
    }

    pub fn attempts(&self) -> usize {
        self.script.lock().unwrap().sent.len()
    }
}

#[async_trait]
impl ProcessorClient for ScriptedProcessor {
    async fn post(&self, endpoint: &str, payload: &[u8]) -> Result<ProcessorResponse> {
        let mut script = self.script.lock().unwrap();
        script.sent.push(SentRequest {
            endpoint: endpoint.to_string(),
            payload: payload.to_vec(),
        });
        let reply = match script.replies.pop_front() {
            Some(reply) => {
                script.last = Some(reply.clone());
                reply
            }
            None => script.last.clone().expect("processor script is empty"),
        };
        match reply {
            Reply::Respond(status, body) => Ok(ProcessorResponse { status, body }),
            Reply::Fail(message) => Err(GatewayError::Network(message)),
        }
    }

    async fn health(&self) -> Result<String> {
        match &self.script.lock().unwrap().unhealthy {
            Some(message) => Err(GatewayError::Network(message.clone())),
            None => Ok("OK".to_string()),
        }
    }
}

pub struct Harness {
    pub engine: Arc<ChargeEngine>,
    pub processor: ScriptedProcessor,
    pub counters: InMemoryDeclineCounters,
}

/// Engine wired to a scripted processor and fresh counters, without backoff waits.
pub fn harness(processor: ScriptedProcessor) -> Harness {
    harness_with_registry(processor, ProviderRegistry::default())
}

pub fn harness_with_registry(processor: ScriptedProcessor, registry: ProviderRegistry) -> Harness {
    let counters = InMemoryDeclineCounters::new();
    let engine = ChargeEngine::new(
        registry,
        Box::new(processor.clone()),
        Box::new(counters.clone()),
    )
    .with_retry_policy(RetryPolicy::new(MAX_ATTEMPTS, Backoff::none()));
    Harness {
        engine: Arc::new(engine),
        processor,
        counters,
    }
}

pub fn charge_request(provider: ProviderName) -> CanonicalChargeRequest {
    CanonicalChargeRequest::new(
        "Ada King Lovelace",
        "4580 4580 4580 4580",
        Expiration::parse("07/29").expect("valid expiration"),
        "123",
        Decimal::new(1250, 2),
        provider,
    )
}

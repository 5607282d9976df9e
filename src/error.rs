use crate::domain::provider::ProviderName;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// A single rejected field of an inbound charge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub param: String,
    pub msg: String,
}

impl FieldError {
    pub fn new(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            msg: msg.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),
    #[error("Provider {0} is enabled but has no adapter")]
    AdapterMismatch(ProviderName),
    #[error("{0}")]
    Network(String),
    #[error("Invalid charge request ({} field(s) rejected)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

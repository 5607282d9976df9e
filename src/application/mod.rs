//! Application layer containing the charge orchestration.
//!
//! This module defines the `ChargeEngine`, the entry point used by the HTTP
//! layer, and the retry policy and attempt state machine it drives.

pub mod engine;
pub mod retry;

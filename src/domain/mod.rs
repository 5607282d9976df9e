//! Processor-independent charge types and the ports the engine depends on.

pub mod charge;
pub mod decision;
pub mod ports;
pub mod provider;

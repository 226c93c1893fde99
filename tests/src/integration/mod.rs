//! # Integration Tests
//!
//! Cross-subsystem scenarios: schema (ds-01), partitions (ds-02), referral
//! classification (ds-03) and the router with its interceptor chain (ds-04)
//! wired together as the node wires them.

pub mod interceptor_chain;
pub mod referral_resolution;

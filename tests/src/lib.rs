//! # Directory Core Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs        # Service bootstrapped from JSON config + seeded tree
//! │   └── integration/       # Cross-subsystem scenarios
//! │       ├── referral_resolution.rs
//! │       └── interceptor_chain.rs
//! └── benches/
//!     └── routing_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ds-tests
//!
//! # By category
//! cargo test -p ds-tests integration::referral_resolution
//!
//! # Benchmarks
//! cargo bench -p ds-tests
//! ```

pub mod fixtures;
pub mod integration;

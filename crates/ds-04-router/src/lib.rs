//! # DS-04 Operation Router
//!
//! The public entry point of the directory core.
//!
//! **Subsystem ID:** 04
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! For every operation kind (add, modify, delete, move/rename, search,
//! compare, lookup, exists) the router:
//! 1. normalizes names through the schema facade
//! 2. resolves the owning partition and takes a read snapshot
//! 3. walks the target's ancestors and classifies the referral outcome
//! 4. dispatches `Proceed` writes to the partition, or returns the outcome
//!    as a typed error
//!
//! Operations reach the router through a fixed interceptor chain:
//!
//! ```text
//! Request → Tracing → AccessControl → OperationalAttributes → Router → Partition
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! ds-04-router/
//! ├── domain/          # Requests, responses, search filters, configuration
//! ├── ports/           # OperationHandler trait
//! ├── middleware/      # Interceptor trait, chain and built-in stages
//! ├── router.rs        # OperationRouter
//! └── service.rs       # DirectoryService facade and sessions
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod middleware;
pub mod ports;
pub mod router;
pub mod service;

// Re-exports
pub use domain::{
    AccessControlConfig, ConfigError, DirectoryConfig, Filter, OperationContext,
    OperationRequest, OperationResponse, PartitionConfig, SearchReference, SearchResult,
    SearchScope,
};
pub use ds_03_referral::{OperationKind, ReferralPolicyConfig};
pub use middleware::{
    AccessControlInterceptor, Interceptor, InterceptorChain, Next, OperationalAttributeInterceptor,
    TracingInterceptor,
};
pub use ports::OperationHandler;
pub use router::{NameGuard, NameLocks, OperationRouter};
pub use service::{DirectoryService, Session};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

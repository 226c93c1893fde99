//! # Domain Module
//!
//! Operation requests and responses, search filters and service
//! configuration.

pub mod config;
pub mod filter;
pub mod request;

pub use config::{AccessControlConfig, ConfigError, DirectoryConfig, PartitionConfig};
pub use filter::Filter;
pub use request::{
    OperationContext, OperationRequest, OperationResponse, SearchReference, SearchResult,
    SearchScope,
};

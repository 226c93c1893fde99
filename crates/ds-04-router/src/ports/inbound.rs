//! # Inbound Ports
//!
//! What the interceptor chain calls at its end.

use crate::domain::{OperationContext, OperationResponse};
use async_trait::async_trait;
use shared_types::DirectoryError;

/// Executes a fully intercepted operation.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    /// Run the operation described by `ctx`.
    async fn handle(&self, ctx: &mut OperationContext) -> Result<OperationResponse, DirectoryError>;
}

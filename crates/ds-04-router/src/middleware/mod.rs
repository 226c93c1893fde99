//! Interceptor chain wrapped around the operation router.
//!
//! Stage order: Request → Tracing → AccessControl → OperationalAttributes → Router
//!
//! Every stage sees the operation context before the router does and may
//! short-circuit it, rewrite the request, or observe the result on the way
//! out. The order is fixed when the chain is built.

pub mod access;
pub mod operational;
pub mod tracing;

pub use access::AccessControlInterceptor;
pub use operational::OperationalAttributeInterceptor;
pub use tracing::TracingInterceptor;

use crate::domain::{ConfigError, DirectoryConfig, OperationContext, OperationResponse};
use crate::ports::OperationHandler;
use async_trait::async_trait;
use shared_types::DirectoryError;
use std::sync::Arc;

/// One stage of the chain.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Stage name for logs and introspection.
    fn name(&self) -> &'static str;

    /// Handle the operation. Call `next.run(ctx)` to continue down the chain.
    async fn handle(
        &self,
        ctx: &mut OperationContext,
        next: Next<'_>,
    ) -> Result<OperationResponse, DirectoryError>;
}

/// The rest of the chain after the current stage.
pub struct Next<'a> {
    stages: &'a [Arc<dyn Interceptor>],
    handler: &'a dyn OperationHandler,
}

impl<'a> Next<'a> {
    /// Run the remaining stages, then the handler.
    pub async fn run(self, ctx: &mut OperationContext) -> Result<OperationResponse, DirectoryError> {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                let next = Next {
                    stages: rest,
                    handler: self.handler,
                };
                stage.handle(ctx, next).await
            }
            None => self.handler.handle(ctx).await,
        }
    }
}

/// Ordered interceptors in front of a handler.
pub struct InterceptorChain {
    stages: Vec<Arc<dyn Interceptor>>,
    handler: Arc<dyn OperationHandler>,
}

impl InterceptorChain {
    /// Chain with no stages.
    pub fn new(handler: Arc<dyn OperationHandler>) -> Self {
        Self {
            stages: Vec::new(),
            handler,
        }
    }

    /// Append a stage; it runs after the stages already added.
    pub fn with(mut self, stage: impl Interceptor + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// The standard chain for a service configuration.
    pub fn from_config(
        config: &DirectoryConfig,
        handler: Arc<dyn OperationHandler>,
    ) -> Result<Self, ConfigError> {
        let mut chain = Self::new(handler)
            .with(TracingInterceptor::new())
            .with(AccessControlInterceptor::from_config(&config.access)?);
        if config.operational_attributes {
            chain = chain.with(OperationalAttributeInterceptor::new());
        }
        Ok(chain)
    }

    /// Run `ctx` through every stage and the handler.
    pub async fn execute(
        &self,
        ctx: &mut OperationContext,
    ) -> Result<OperationResponse, DirectoryError> {
        Next {
            stages: &self.stages,
            handler: self.handler.as_ref(),
        }
        .run(ctx)
        .await
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

#[async_trait]
impl OperationHandler for InterceptorChain {
    async fn handle(&self, ctx: &mut OperationContext) -> Result<OperationResponse, DirectoryError> {
        self.execute(ctx).await
    }
}

//! Operational attribute interceptor.
//!
//! Stamps `createTimestamp`/`creatorsName` on added entries and
//! `modifyTimestamp`/`modifiersName` on modified ones. Timestamps use the
//! GeneralizedTime form `YYYYMMDDHHMMSSZ`.

use super::{Interceptor, Next};
use crate::domain::{OperationContext, OperationRequest, OperationResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{DirectoryError, Modification};
use std::sync::Arc;

const GENERALIZED_TIME: &str = "%Y%m%d%H%M%SZ";

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Maintains creation and modification metadata.
#[derive(Clone)]
pub struct OperationalAttributeInterceptor {
    clock: Clock,
}

impl Default for OperationalAttributeInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationalAttributeInterceptor {
    /// Stage reading the system clock.
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Stage with a fixed time source.
    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    fn stamp(&self, ctx: &mut OperationContext) {
        let now = (self.clock)().format(GENERALIZED_TIME).to_string();
        let principal = ctx.principal.as_ref().map(|dn| dn.to_string());

        match &mut ctx.request {
            OperationRequest::Add { entry } => {
                entry.put("createTimestamp", vec![now]);
                if let Some(principal) = principal {
                    entry.put("creatorsName", vec![principal]);
                }
            }
            OperationRequest::Modify { changes, .. } => {
                changes.push(Modification::replace("modifyTimestamp", &[now.as_str()]));
                if let Some(principal) = &principal {
                    changes.push(Modification::replace("modifiersName", &[principal.as_str()]));
                }
            }
            _ => {}
        }
    }
}

#[async_trait]
impl Interceptor for OperationalAttributeInterceptor {
    fn name(&self) -> &'static str {
        "operational_attributes"
    }

    async fn handle(
        &self,
        ctx: &mut OperationContext,
        next: Next<'_>,
    ) -> Result<OperationResponse, DirectoryError> {
        self.stamp(ctx);
        next.run(ctx).await
    }
}

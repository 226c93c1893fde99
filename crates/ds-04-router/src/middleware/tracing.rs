//! Tracing interceptor.
//!
//! Opens one span per operation and records how it ended. Referral
//! outcomes are normal control flow and log at debug; other failures warn.

use super::{Interceptor, Next};
use crate::domain::{OperationContext, OperationResponse};
use async_trait::async_trait;
use shared_types::DirectoryError;
use std::time::Instant;
use tracing::{debug, info_span, warn, Instrument, Span};

/// Per-operation span.
#[derive(Clone, Default)]
pub struct TracingInterceptor;

impl TracingInterceptor {
    /// Create the stage.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Interceptor for TracingInterceptor {
    fn name(&self) -> &'static str {
        "tracing"
    }

    async fn handle(
        &self,
        ctx: &mut OperationContext,
        next: Next<'_>,
    ) -> Result<OperationResponse, DirectoryError> {
        let span = info_span!(
            "ds_operation",
            op = %ctx.kind(),
            dn = %ctx.target(),
            mode = %ctx.mode,
            result_code = tracing::field::Empty,
        );
        let started = Instant::now();

        async move {
            let result = next.run(ctx).await;
            let elapsed_us = started.elapsed().as_micros() as u64;

            match &result {
                Ok(_) => {
                    Span::current().record("result_code", 0u16);
                    debug!(elapsed_us, "[ds-04] Operation completed");
                }
                Err(e) => {
                    Span::current().record("result_code", e.result_code().code());
                    if e.is_referral_outcome() || matches!(e, DirectoryError::NoSuchObject(_)) {
                        debug!(elapsed_us, outcome = %e, "[ds-04] Operation redirected or not found");
                    } else {
                        warn!(elapsed_us, error = %e, "[ds-04] Operation failed");
                    }
                }
            }

            result
        }
        .instrument(span)
        .await
    }
}

//! Access control interceptor.
//!
//! Writes need an authenticated principal; when administrators are
//! configured, only they may write. Anonymous reads are allowed unless the
//! configuration turns them off.

use super::{Interceptor, Next};
use crate::domain::{AccessControlConfig, ConfigError, OperationContext, OperationResponse};
use async_trait::async_trait;
use shared_types::{DirectoryError, Dn};
use tracing::debug;

/// Principal-based gate in front of the router.
#[derive(Clone, Debug)]
pub struct AccessControlInterceptor {
    allow_anonymous_reads: bool,
    administrators: Vec<Dn>,
}

impl AccessControlInterceptor {
    /// Create the stage.
    pub fn new(allow_anonymous_reads: bool, administrators: Vec<Dn>) -> Self {
        Self {
            allow_anonymous_reads,
            administrators,
        }
    }

    /// Build from configuration, parsing administrator names.
    pub fn from_config(config: &AccessControlConfig) -> Result<Self, ConfigError> {
        let administrators = config
            .administrators
            .iter()
            .map(|text| {
                Dn::parse(text).map_err(|e| ConfigError::InvalidAdministrator {
                    dn: text.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(config.allow_anonymous_reads, administrators))
    }

    fn check(&self, ctx: &OperationContext) -> Result<(), DirectoryError> {
        let kind = ctx.kind();
        let denied = match &ctx.principal {
            None if kind.is_write() => Some("anonymous writes are not allowed"),
            None if !self.allow_anonymous_reads => Some("anonymous reads are not allowed"),
            Some(principal)
                if kind.is_write()
                    && !self.administrators.is_empty()
                    && !self.administrators.contains(principal) =>
            {
                Some("principal is not an administrator")
            }
            _ => None,
        };

        match denied {
            Some(reason) => {
                debug!(
                    "[ds-04] {} of {} denied: {}",
                    kind,
                    ctx.target(),
                    reason
                );
                Err(DirectoryError::InsufficientAccessRights(format!(
                    "{} of {}: {}",
                    kind,
                    ctx.target(),
                    reason
                )))
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Interceptor for AccessControlInterceptor {
    fn name(&self) -> &'static str {
        "access_control"
    }

    async fn handle(
        &self,
        ctx: &mut OperationContext,
        next: Next<'_>,
    ) -> Result<OperationResponse, DirectoryError> {
        self.check(ctx)?;
        next.run(ctx).await
    }
}

//! Directory service - the public facade over the interceptor chain.
//!
//! Builds the schema, partitions, router and chain from configuration,
//! seeds configured context entries, and hands out sessions that carry a
//! principal and a default referral mode.

use crate::domain::{
    DirectoryConfig, Filter, OperationContext, OperationRequest, OperationResponse, SearchResult,
    SearchScope,
};
use crate::middleware::InterceptorChain;
use crate::ports::OperationHandler;
use crate::router::OperationRouter;
use ds_01_schema::{InMemorySchema, SchemaFacade};
use ds_02_partitions::{InMemoryPartition, PartitionRegistry};
use ds_03_referral::{OperationKind, ReferralPolicy};
use shared_types::{DirectoryError, Dn, Entry, Modification, Rdn, ReferralMode};
use std::sync::Arc;
use tracing::{debug, info};

/// Directory service handle. Cheap to clone.
#[derive(Clone)]
pub struct DirectoryService {
    router: Arc<OperationRouter>,
    chain: Arc<InterceptorChain>,
    default_mode: ReferralMode,
}

impl DirectoryService {
    /// Assemble a service over an existing schema and partition registry.
    pub fn new(
        schema: Arc<dyn SchemaFacade>,
        partitions: PartitionRegistry,
        config: &DirectoryConfig,
    ) -> Result<Self, DirectoryError> {
        config.validate()?;

        let router = Arc::new(OperationRouter::new(
            schema,
            Arc::new(partitions),
            ReferralPolicy::new(config.referral.clone()),
        ));
        let handler: Arc<dyn OperationHandler> = Arc::clone(&router) as Arc<dyn OperationHandler>;
        let chain = InterceptorChain::from_config(config, handler)?;
        debug!("[ds-04] Interceptor chain: {:?}", chain.stage_names());

        Ok(Self {
            router,
            chain: Arc::new(chain),
            default_mode: config.default_referral_mode,
        })
    }

    /// Build the whole service from configuration: core schema plus
    /// configured extensions, one in-memory partition per configured
    /// suffix, and the configured context entries.
    pub async fn from_config(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        config.validate()?;

        let schema: Arc<dyn SchemaFacade> = Arc::new(
            InMemorySchema::core_builder()
                .extend(config.schema.clone())
                .build()?,
        );

        let mut registry = PartitionRegistry::new();
        let mut context_entries = Vec::new();
        for partition in &config.partitions {
            let suffix = schema.normalize_dn(partition.suffix_dn()?)?;
            registry.register(Arc::new(InMemoryPartition::new(
                partition.id.clone(),
                suffix.clone(),
            )))?;
            context_entries.extend(partition.context_entry(&suffix));
        }

        let service = Self::new(schema, registry, config)?;
        for entry in context_entries {
            service.seed(entry).await?;
        }

        info!(
            "[ds-04] Directory service ready with {} naming contexts",
            service.naming_contexts().len()
        );
        Ok(service)
    }

    /// Create `entry` below the chain, as the system. Returns `false` when
    /// the entry already exists.
    pub async fn seed(&self, entry: Entry) -> Result<bool, DirectoryError> {
        let dn = entry.dn().clone();
        match self.router.add(entry, ReferralMode::ManageDsaIt).await {
            Ok(()) => {
                info!("[ds-04] Seeded {}", dn);
                Ok(true)
            }
            Err(DirectoryError::AlreadyExists(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Open a session. `principal` is the bound name, `None` for anonymous.
    pub fn session(&self, principal: Option<&str>) -> Result<Session, DirectoryError> {
        let principal = principal.map(Dn::parse).transpose()?;
        Ok(Session {
            service: self.clone(),
            principal,
            mode: self.default_mode,
        })
    }

    /// Run a prepared operation through the chain.
    pub async fn execute(
        &self,
        ctx: &mut OperationContext,
    ) -> Result<OperationResponse, DirectoryError> {
        self.chain.execute(ctx).await
    }

    /// Suffixes of the registered partitions.
    pub fn naming_contexts(&self) -> Vec<Dn> {
        self.router.naming_contexts()
    }

    /// The router at the end of the chain.
    pub fn router(&self) -> &Arc<OperationRouter> {
        &self.router
    }

    /// The interceptor chain.
    pub fn chain(&self) -> &InterceptorChain {
        &self.chain
    }
}

/// Caller-side handle: a principal, a referral mode and text-level
/// operations.
#[derive(Clone)]
pub struct Session {
    service: DirectoryService,
    principal: Option<Dn>,
    mode: ReferralMode,
}

impl Session {
    /// Use `mode` for every following operation.
    pub fn with_mode(mut self, mode: ReferralMode) -> Self {
        self.mode = mode;
        self
    }

    /// Active referral mode.
    pub fn mode(&self) -> ReferralMode {
        self.mode
    }

    /// Bound principal.
    pub fn principal(&self) -> Option<&Dn> {
        self.principal.as_ref()
    }

    /// Add an entry.
    pub async fn add(&self, entry: Entry) -> Result<(), DirectoryError> {
        self.write(OperationRequest::Add { entry }).await
    }

    /// Modify the entry at `dn`.
    pub async fn modify(&self, dn: &str, changes: Vec<Modification>) -> Result<(), DirectoryError> {
        self.write(OperationRequest::Modify {
            dn: Dn::parse(dn)?,
            changes,
        })
        .await
    }

    /// Delete the leaf entry at `dn`.
    pub async fn delete(&self, dn: &str) -> Result<(), DirectoryError> {
        self.write(OperationRequest::Delete { dn: Dn::parse(dn)? })
            .await
    }

    /// Move `dn` under `new_superior`, keeping its RDN.
    pub async fn move_entry(&self, dn: &str, new_superior: &str) -> Result<(), DirectoryError> {
        self.write(OperationRequest::Move {
            dn: Dn::parse(dn)?,
            new_superior: Some(Dn::parse(new_superior)?),
            new_rdn: None,
            delete_old_rdn: false,
        })
        .await
    }

    /// Rename `dn` in place.
    pub async fn rename(
        &self,
        dn: &str,
        new_rdn: &str,
        delete_old_rdn: bool,
    ) -> Result<(), DirectoryError> {
        self.write(OperationRequest::Move {
            dn: Dn::parse(dn)?,
            new_superior: None,
            new_rdn: Some(new_rdn.parse::<Rdn>()?),
            delete_old_rdn,
        })
        .await
    }

    /// Move `dn` under `new_superior` with a new RDN.
    pub async fn move_and_rename(
        &self,
        dn: &str,
        new_superior: &str,
        new_rdn: &str,
        delete_old_rdn: bool,
    ) -> Result<(), DirectoryError> {
        self.write(OperationRequest::Move {
            dn: Dn::parse(dn)?,
            new_superior: Some(Dn::parse(new_superior)?),
            new_rdn: Some(new_rdn.parse::<Rdn>()?),
            delete_old_rdn,
        })
        .await
    }

    /// Search below `base`.
    pub async fn search(
        &self,
        base: &str,
        scope: SearchScope,
        filter: &str,
    ) -> Result<SearchResult, DirectoryError> {
        let request = OperationRequest::Search {
            base: Dn::parse(base)?,
            scope,
            filter: Filter::parse(filter)?,
        };
        match self.run(request).await? {
            OperationResponse::Search(result) => Ok(result),
            other => Err(unexpected(OperationKind::Search, &other)),
        }
    }

    /// Compare an attribute value.
    pub async fn compare(
        &self,
        dn: &str,
        attribute: &str,
        value: &str,
    ) -> Result<bool, DirectoryError> {
        let request = OperationRequest::Compare {
            dn: Dn::parse(dn)?,
            attribute: attribute.to_string(),
            value: value.to_string(),
        };
        match self.run(request).await? {
            OperationResponse::Compared(matched) => Ok(matched),
            other => Err(unexpected(OperationKind::Compare, &other)),
        }
    }

    /// Read the entry at `dn`.
    pub async fn lookup(&self, dn: &str) -> Result<Entry, DirectoryError> {
        match self.run(OperationRequest::Lookup { dn: Dn::parse(dn)? }).await? {
            OperationResponse::Entry(entry) => Ok(*entry),
            other => Err(unexpected(OperationKind::Lookup, &other)),
        }
    }

    /// True if `dn` exists.
    pub async fn exists(&self, dn: &str) -> Result<bool, DirectoryError> {
        match self.run(OperationRequest::Exists { dn: Dn::parse(dn)? }).await? {
            OperationResponse::Exists(found) => Ok(found),
            other => Err(unexpected(OperationKind::Exists, &other)),
        }
    }

    async fn write(&self, request: OperationRequest) -> Result<(), DirectoryError> {
        let kind = request.kind();
        match self.run(request).await? {
            OperationResponse::Done => Ok(()),
            other => Err(unexpected(kind, &other)),
        }
    }

    async fn run(&self, request: OperationRequest) -> Result<OperationResponse, DirectoryError> {
        let mut ctx = OperationContext::new(request, self.mode, self.principal.clone());
        self.service.execute(&mut ctx).await
    }
}

fn unexpected(kind: OperationKind, response: &OperationResponse) -> DirectoryError {
    DirectoryError::UnwillingToPerform(format!("unexpected {:?} response to {}", response, kind))
}

//! # Interceptor Chain Integration
//!
//! Custom stages in front of a live router, and the built-in stages as the
//! service assembles them from configuration.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use async_trait::async_trait;
    use ds_04_router::{
        Interceptor, InterceptorChain, Next, OperationContext, OperationHandler,
        OperationRequest, OperationResponse, TracingInterceptor,
    };
    use parking_lot::Mutex;
    use shared_types::{DirectoryError, Modification, ReferralMode};
    use std::sync::Arc;

    /// Records `kind:result` for every operation that passes.
    struct Audit {
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Interceptor for Audit {
        fn name(&self) -> &'static str {
            "audit"
        }

        async fn handle(
            &self,
            ctx: &mut OperationContext,
            next: Next<'_>,
        ) -> Result<OperationResponse, DirectoryError> {
            let kind = ctx.kind();
            let result = next.run(ctx).await;
            let label = match &result {
                Ok(_) => "ok".to_string(),
                Err(e) => e.result_code().code().to_string(),
            };
            self.log.lock().push(format!("{kind}:{label}"));
            result
        }
    }

    /// Rejects every write before it reaches storage.
    struct ReadOnly;

    #[async_trait]
    impl Interceptor for ReadOnly {
        fn name(&self) -> &'static str {
            "read_only"
        }

        async fn handle(
            &self,
            ctx: &mut OperationContext,
            next: Next<'_>,
        ) -> Result<OperationResponse, DirectoryError> {
            if ctx.kind().is_write() {
                return Err(DirectoryError::UnwillingToPerform("read-only".into()));
            }
            next.run(ctx).await
        }
    }

    fn add(name: &str, mode: ReferralMode) -> OperationContext {
        OperationContext::new(
            OperationRequest::Add {
                entry: person(name),
            },
            mode,
            Some(dn(ADMIN)),
        )
    }

    #[tokio::test]
    async fn test_custom_stage_sees_router_outcomes() {
        let service = directory().await;
        let log = Arc::new(Mutex::new(Vec::new()));
        let router: Arc<dyn OperationHandler> = service.router().clone();
        let chain = InterceptorChain::new(router)
            .with(TracingInterceptor::new())
            .with(Audit {
                log: Arc::clone(&log),
            });

        chain
            .execute(&mut add("cn=Kim,o=PNN,c=WW,ou=system", ReferralMode::Throw))
            .await
            .unwrap();
        let err = chain
            .execute(&mut add("cn=Kim,ou=Roles,o=MNN,c=WW,ou=system", ReferralMode::Throw))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Referral { .. }));
        let err = chain
            .execute(&mut add("cn=Kim,ou=Roles,o=MNN,c=WW,ou=system", ReferralMode::Ignore))
            .await
            .unwrap_err();
        assert_eq!(err, DirectoryError::PartialResult);

        assert_eq!(*log.lock(), vec!["add:ok", "add:10", "add:9"]);
    }

    #[tokio::test]
    async fn test_short_circuit_keeps_storage_untouched() {
        let service = directory().await;
        let router: Arc<dyn OperationHandler> = service.router().clone();
        let chain = InterceptorChain::new(router).with(ReadOnly);

        let err = chain
            .execute(&mut add("cn=Kim,o=PNN,c=WW,ou=system", ReferralMode::Throw))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::UnwillingToPerform(_)));

        let mut exists = OperationContext::new(
            OperationRequest::Exists {
                dn: dn("cn=Kim,o=PNN,c=WW,ou=system"),
            },
            ReferralMode::Throw,
            None,
        );
        assert_eq!(
            chain.execute(&mut exists).await.unwrap(),
            OperationResponse::Exists(false)
        );
    }

    #[tokio::test]
    async fn test_service_chain_from_config() {
        let service = directory().await;
        assert_eq!(
            service.chain().stage_names(),
            vec!["tracing", "access_control", "operational_attributes"]
        );
    }

    #[tokio::test]
    async fn test_operational_attributes_through_service() {
        let service = directory().await;
        let session = admin(&service, ReferralMode::Throw);
        let name = "cn=Kim,o=PNN,c=WW,ou=system";

        session.add(person(name)).await.unwrap();
        let entry = session.lookup(name).await.unwrap();
        assert_eq!(entry.values("createTimestamp").len(), 1);
        assert!(entry.values("createTimestamp")[0].ends_with('Z'));
        assert_eq!(entry.values("creatorsName"), &[ADMIN.to_string()]);
        assert!(entry.values("modifyTimestamp").is_empty());

        session
            .modify(name, vec![Modification::add("description", &["night shift"])])
            .await
            .unwrap();
        let entry = session.lookup(name).await.unwrap();
        assert_eq!(entry.values("modifyTimestamp").len(), 1);
        assert_eq!(entry.values("modifiersName"), &[ADMIN.to_string()]);
        assert!(entry.contains_value("description", "night shift"));
    }

    #[tokio::test]
    async fn test_access_control_before_referral_handling() {
        let service = directory().await;

        let anonymous = service.session(None).unwrap();
        let err = anonymous
            .add(person("cn=Kim,ou=Roles,o=MNN,c=WW,ou=system"))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::InsufficientAccessRights(_)));

        let stranger = service.session(Some("uid=guest,ou=system")).unwrap();
        let err = stranger.delete(AKARASULU).await.unwrap_err();
        assert!(matches!(err, DirectoryError::InsufficientAccessRights(_)));
        assert!(anonymous.exists(AKARASULU).await.unwrap());

        assert_eq!(
            referral_urls(anonymous.lookup("cn=Kim,ou=Roles,o=MNN,c=WW,ou=system").await),
            vec!["ldap://hostd/cn=Kim,ou=Roles,dc=apache,dc=org"]
        );
    }
}

//! Deployment facade over the metadata store
//!
//! The application-LCM surface installs and uninstalls application
//! instances. Uninstall is idempotent at this layer: an instance that is
//! already gone counts as uninstalled, while the underlying repository
//! still surfaces not-found to direct metadata callers.

use crate::error::MetastoreError;
use crate::metastore::MetaStore;
use crate::models::ApplicationInstance;

/// Deployment operations consumed by the application-LCM handler
#[derive(Clone)]
pub struct DeploymentClient {
    metastore: MetaStore,
}

impl DeploymentClient {
    pub fn new(metastore: MetaStore) -> Self {
        Self { metastore }
    }

    /// Record the instance and return its identifier
    pub async fn install(
        &self,
        instance: &ApplicationInstance,
    ) -> Result<String, MetastoreError> {
        self.metastore.add_application_instance(instance).await?;
        Ok(instance.app_instance_id.clone())
    }

    /// Remove the instance, treating an already-removed instance as success
    pub async fn uninstall(
        &self,
        federation_context_id: &str,
        id: &str,
    ) -> Result<(), MetastoreError> {
        match self
            .metastore
            .remove_application_instance(federation_context_id, id)
            .await
        {
            Err(err) if err.is_not_found() => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metastore::application::tests::onboard_input;
    use crate::metastore::application_instance::tests::instance_input;
    use crate::metastore::testutil::{metastore, seed_federation};

    #[tokio::test]
    async fn test_install_returns_instance_id() {
        let (store, meta) = metastore();
        seed_federation(&store, "acme", "ctx-1").await;
        meta.onboard_application(&onboard_input("ctx-1", "app-1", &[]))
            .await
            .unwrap();

        let client = DeploymentClient::new(meta);
        let id = client
            .install(&instance_input("ctx-1", "inst-1", "app-1"))
            .await
            .unwrap();
        assert_eq!(id, "inst-1");
    }

    #[tokio::test]
    async fn test_uninstall_idempotent() {
        let (store, meta) = metastore();
        seed_federation(&store, "acme", "ctx-1").await;
        meta.onboard_application(&onboard_input("ctx-1", "app-1", &[]))
            .await
            .unwrap();

        let client = DeploymentClient::new(meta.clone());
        client
            .install(&instance_input("ctx-1", "inst-1", "app-1"))
            .await
            .unwrap();

        client.uninstall("ctx-1", "inst-1").await.unwrap();
        // second uninstall finds nothing and still succeeds
        client.uninstall("ctx-1", "inst-1").await.unwrap();

        // the repository itself keeps surfacing not-found
        let err = meta
            .remove_application_instance("ctx-1", "inst-1")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

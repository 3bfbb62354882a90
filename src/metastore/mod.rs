//! Metadata store facade
//!
//! [`MetaStore`] is the single entry point the handler layer talks to. It
//! aggregates one repository per entity kind (colocated in the submodules),
//! resolves ownership so federation deletion cascades, and normalizes every
//! backend error into the five-kind taxonomy in [`crate::error`].
//!
//! Lookup-by-id is emulated over the backend's exact-match label listing:
//! build the selector for `(kind, scope, id, relation)`, list, and take the
//! first match in stable order. More than one match is a store anomaly; it
//! is logged and resolved deterministically to the first element.

use std::sync::Arc;

use tracing::{error, warn};

use crate::error::MetastoreError;
use crate::labels;
use crate::store::{
    LabelSelector, ObjectKind, ObjectStore, OwnerReference, StoreError, StoredObject,
};

pub mod application;
pub mod application_instance;
pub mod artefact;
pub mod availability_zone;
pub mod credentials;
pub mod federation;
pub mod file;

/// Facade over all entity repositories
#[derive(Clone)]
pub struct MetaStore {
    store: Arc<dyn ObjectStore>,
    namespace: String,
}

impl MetaStore {
    /// Create a facade over the given backend, scoped to one namespace
    pub fn new(store: Arc<dyn ObjectStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub(crate) fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// List objects matching the selector, surfacing backend failures as
    /// opaque internal errors
    pub(crate) async fn search_objects(
        &self,
        kind: ObjectKind,
        selector: &LabelSelector,
    ) -> Result<Vec<StoredObject>, MetastoreError> {
        self.store
            .list(kind, &self.namespace, selector)
            .await
            .map_err(|err| {
                error!(kind = %kind, ?selector, error = %err, "failed to list objects");
                MetastoreError::Internal {
                    detail: "internal error".to_string(),
                }
            })
    }

    /// Resolve the selector to exactly one object
    ///
    /// The backend gives no uniqueness guarantee, so multiple matches are
    /// tolerated: the first element in stable order wins and the anomaly is
    /// logged. An object of an unexpected kind is surfaced as an internal
    /// error without backend detail.
    pub(crate) async fn search_object(
        &self,
        kind: ObjectKind,
        selector: &LabelSelector,
    ) -> Result<StoredObject, MetastoreError> {
        let matches = self.search_objects(kind, selector).await?;
        if matches.len() > 1 {
            warn!(
                kind = %kind,
                ?selector,
                count = matches.len(),
                "multiple objects matched a unique selector, resolving to first"
            );
        }
        let object = matches.into_iter().next().ok_or_else(|| {
            warn!(kind = %kind, ?selector, "no objects matched selector");
            MetastoreError::NotFound {
                detail: kind.to_string(),
            }
        })?;
        if object.kind != kind {
            return Err(kind_mismatch(kind, &object));
        }
        Ok(object)
    }

    /// Look up an entity we host by federation context id and entity id
    pub(crate) async fn get_host_object(
        &self,
        kind: ObjectKind,
        federation_context_id: &str,
        id: &str,
    ) -> Result<StoredObject, MetastoreError> {
        self.search_object(kind, &labels::host_selector(federation_context_id, id))
            .await
    }

    /// Look up a partner-hosted entity by federation callback id and entity id
    pub(crate) async fn get_callback_object(
        &self,
        kind: ObjectKind,
        federation_callback_id: &str,
        id: &str,
    ) -> Result<StoredObject, MetastoreError> {
        self.search_object(kind, &labels::callback_selector(federation_callback_id, id))
            .await
    }

    pub(crate) async fn create_object(&self, object: StoredObject) -> Result<(), MetastoreError> {
        let kind = object.kind;
        let id = object
            .labels
            .get(&labels::label(labels::LabelKey::Id))
            .cloned()
            .unwrap_or_default();
        self.store.create(object).await.map_err(|err| {
            let detail = format!("failed to create {} (id: {})", kind, id);
            error!(error = %err, "{}", detail);
            match err {
                StoreError::AlreadyExists { .. } => MetastoreError::AlreadyExists { detail },
                other => other.into(),
            }
        })
    }

    pub(crate) async fn update_object(&self, object: StoredObject) -> Result<(), MetastoreError> {
        self.store.update(object).await.map_err(Into::into)
    }

    pub(crate) async fn patch_object_status(
        &self,
        kind: ObjectKind,
        name: &str,
        state: &str,
    ) -> Result<(), MetastoreError> {
        self.store
            .patch_status(kind, &self.namespace, name, state)
            .await
            .map_err(Into::into)
    }

    pub(crate) async fn delete_object(
        &self,
        kind: ObjectKind,
        name: &str,
    ) -> Result<(), MetastoreError> {
        self.store
            .delete(kind, &self.namespace, name)
            .await
            .map_err(Into::into)
    }

    /// Resolve the live Federation object owning a scope and build the owner
    /// reference attached to dependents created there
    ///
    /// A dependent entity can never be created without its owning
    /// Federation: resolution failures propagate and abort the create.
    pub(crate) async fn owner_reference(
        &self,
        federation_context_id: &str,
    ) -> Result<OwnerReference, MetastoreError> {
        let federation = self
            .get_host_object(
                ObjectKind::Federation,
                federation_context_id,
                federation_context_id,
            )
            .await?;
        Ok(OwnerReference {
            kind: ObjectKind::Federation,
            name: federation.name,
        })
    }
}

/// Decode a store object's spec document into its typed form
pub(crate) fn decode_spec<T: serde::de::DeserializeOwned>(
    object: &StoredObject,
) -> Result<T, MetastoreError> {
    serde_json::from_value(object.spec.clone()).map_err(|err| {
        error!(kind = %object.kind, name = %object.name, error = %err, "failed to decode object spec");
        MetastoreError::Internal {
            detail: "internal error".to_string(),
        }
    })
}

/// Encode a typed spec into the store object's spec document
pub(crate) fn encode_spec<T: serde::Serialize>(spec: &T) -> Result<serde_json::Value, MetastoreError> {
    serde_json::to_value(spec).map_err(|err| {
        error!(error = %err, "failed to encode object spec");
        MetastoreError::Internal {
            detail: "internal error".to_string(),
        }
    })
}

fn kind_mismatch(expected: ObjectKind, got: &StoredObject) -> MetastoreError {
    error!(
        expected = %expected,
        got = %got.kind,
        name = %got.name,
        "kind mismatch on object lookup"
    );
    MetastoreError::Internal {
        detail: "internal error".to_string(),
    }
}

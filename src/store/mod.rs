//! Generic object-store backend contract
//!
//! The metadata store persists every entity as a [`StoredObject`]: a named,
//! labeled object with an opaque JSON spec and an optional lifecycle state.
//! The backend only supports exact-match label selection and atomic
//! name-conflict detection on create; everything relational (lookup by id,
//! foreign keys, uniqueness) is emulated on top of this surface.
//!
//! Implementations are injected through the [`ObjectStore`] trait so the
//! facade can run against a production backend or the in-memory fake in
//! [`memory`].

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory;

pub use memory::InMemoryStore;

/// Exact-match label selector
pub type LabelSelector = BTreeMap<String, String>;

/// The closed set of entity kinds persisted by this layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    Federation,
    Application,
    ApplicationInstance,
    Artefact,
    AvailabilityZone,
    File,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Federation => "federation",
            ObjectKind::Application => "application",
            ObjectKind::ApplicationInstance => "applicationInstance",
            ObjectKind::Artefact => "artefact",
            ObjectKind::AvailabilityZone => "availabilityZone",
            ObjectKind::File => "file",
        }
    }

    /// Prefix used when deriving object names for this kind
    pub fn name_prefix(&self) -> &'static str {
        match self {
            ObjectKind::ApplicationInstance => "application-instance",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to the object owning a dependent object
///
/// Attached at creation time; the backend cascade-deletes every object whose
/// owner is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    pub kind: ObjectKind,
    pub name: String,
}

/// A persisted store object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub name: String,
    pub namespace: String,
    /// Queryable secondary index over the object
    pub labels: BTreeMap<String, String>,
    pub owner: Option<OwnerReference>,
    /// Kind-specific spec document
    pub spec: serde_json::Value,
    /// Lifecycle state, mutated only through status patches
    pub status: Option<String>,
}

/// Errors surfaced by an object-store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("object '{name}' not found")]
    NotFound { name: String },

    #[error("backend failure: {message}")]
    Backend { message: String },
}

/// Object-store backend operations consumed by the metadata store
///
/// All operations are scoped to a single configured namespace and are
/// synchronous single round-trips: no retries, no caching. `create` must be
/// atomic on name conflicts and `patch_status` must be a merge that leaves
/// spec and labels untouched.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn create(&self, object: StoredObject) -> Result<(), StoreError>;

    async fn get(
        &self,
        kind: ObjectKind,
        namespace: &str,
        name: &str,
    ) -> Result<StoredObject, StoreError>;

    /// List objects of `kind` matching every label in `selector`, in stable
    /// name order
    async fn list(
        &self,
        kind: ObjectKind,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<StoredObject>, StoreError>;

    /// Full replace of an existing object
    async fn update(&self, object: StoredObject) -> Result<(), StoreError>;

    /// Status-only merge patch
    async fn patch_status(
        &self,
        kind: ObjectKind,
        namespace: &str,
        name: &str,
        state: &str,
    ) -> Result<(), StoreError>;

    /// Delete an object, cascading to objects owned by it
    async fn delete(&self, kind: ObjectKind, namespace: &str, name: &str)
        -> Result<(), StoreError>;
}

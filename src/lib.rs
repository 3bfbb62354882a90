//! Federation Metadata Store Library
//!
//! This library persists federation metadata (federations, applications,
//! application instances, artefacts, files, availability zones) as labeled
//! objects in a generic object store, and exposes typed repositories over
//! that projection.
//!
//! ## Features
//!
//! - **Federation Lifecycle**: Claiming pre-provisioned federation objects,
//!   status callbacks, zone subscriptions, cascading removal
//! - **Entity Repositories**: Applications, application instances, artefacts
//!   and files, each resolved by label selection rather than native keys
//! - **Deployment Facade**: Install/uninstall surface for application
//!   instance lifecycle management
//! - **Pluggable Backend**: `ObjectStore` trait with an in-memory
//!   implementation for embedding and tests
//!
//! ## Architecture
//!
//! ```text
//! Metadata Store
//! ├── MetaStore (label selection, naming, object plumbing)
//! │   ├── Federation repository
//! │   ├── Application repository
//! │   ├── Application instance repository
//! │   ├── Artefact repository
//! │   ├── File repository
//! │   └── Availability zone repository
//! ├── DeploymentClient (instance install/uninstall facade)
//! └── ObjectStore backend (in-memory or external)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use federation_metastore::{InMemoryStore, MetaStore};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), federation_metastore::MetastoreError> {
//! let store = Arc::new(InMemoryStore::new());
//! let metastore = MetaStore::new(store, "federation");
//!
//! let zones = metastore.list_availability_zones().await?;
//! assert!(zones.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod deployment;
pub mod error;
pub mod labels;
pub mod metastore;
pub mod models;
pub mod store;
pub mod telemetry;

// Re-export commonly used types
pub use config::{Config, StoreConfig, TelemetryConfig};
pub use deployment::DeploymentClient;
pub use error::MetastoreError;
pub use labels::{LabelKey, Relation, LABEL_KEY_PREFIX};
pub use metastore::MetaStore;
pub use models::{
    Application, ApplicationInstance, ApplicationInstanceStatus, ApplicationInstanceStatusUpdate,
    ApplicationStatus, ApplicationStatusUpdate, Artefact, CallbackCredentials, ClientCredentials,
    Federation, FederationRequestData, FederationStatus, File, OnboardApplication, UploadArtefact,
    UploadFile, ZoneDetails, ZoneRegisteredData,
};
pub use store::{InMemoryStore, ObjectKind, ObjectStore, StoredObject};
pub use telemetry::init_tracing;

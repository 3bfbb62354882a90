//! Label index: the addressing scheme attached to every store object
//!
//! Each entity is addressable by the triple `(kind, federation scope, id)`.
//! The backend offers neither composite keys nor unique indexes, so two
//! derived structures stand in for them:
//!
//! - a deterministic object name `<kindPrefix>-<uuidv5(scope + "/" + id)>`
//!   acting as the primary key (conflicts surface as already-exists), and
//! - a redundant label set acting as a queryable secondary index.

use uuid::Uuid;

use crate::store::{LabelSelector, ObjectKind};

/// Prefix shared by every label key owned by this layer
pub const LABEL_KEY_PREFIX: &str = "metastore.federation.io";

/// Label keys attached to store objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKey {
    /// Identity of the client that originated the federation
    ClientId,
    /// Guest-relation scope identifier
    FederationCallbackId,
    /// Host-relation scope identifier
    FederationContextId,
    /// Whether we host the entity or the partner does
    FederationRelation,
    /// Caller-supplied entity identifier
    Id,
}

impl LabelKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelKey::ClientId => "origin-client-id",
            LabelKey::FederationCallbackId => "federation-callback-id",
            LabelKey::FederationContextId => "federation-context-id",
            LabelKey::FederationRelation => "federation-relation",
            LabelKey::Id => "id",
        }
    }
}

/// Direction of the federation relation an entity is labeled under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// We host the entity for the partner, scoped by federation context id
    Host,
    /// The partner hosts it, scoped by federation callback id
    Guest,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Host => "host",
            Relation::Guest => "guest",
        }
    }
}

/// Fully qualified label key
pub fn label(key: LabelKey) -> String {
    format!("{}/{}", LABEL_KEY_PREFIX, key.as_str())
}

/// Derive the store-object name for an entity
///
/// Caller-supplied ids may contain characters the backend rejects as object
/// names, so the name is the kind prefix plus a stable hash of the scoped
/// id. Same input always yields the same name across process restarts.
pub fn object_name(kind: ObjectKind, scope: &str, id: &str) -> String {
    let hashed = Uuid::new_v5(&Uuid::nil(), format!("{}/{}", scope, id).as_bytes());
    format!("{}-{}", kind.name_prefix(), hashed)
}

/// Labels attached to an entity we host in a federation scope
pub fn host_labels(federation_context_id: &str, id: &str) -> LabelSelector {
    LabelSelector::from([
        (
            label(LabelKey::FederationContextId),
            federation_context_id.to_string(),
        ),
        (label(LabelKey::Id), id.to_string()),
        (
            label(LabelKey::FederationRelation),
            Relation::Host.as_str().to_string(),
        ),
    ])
}

/// Selector for looking up a hosted entity by scope and id
pub fn host_selector(federation_context_id: &str, id: &str) -> LabelSelector {
    host_labels(federation_context_id, id)
}

/// Selector for looking up a partner-hosted entity addressed by a callback
pub fn callback_selector(federation_callback_id: &str, id: &str) -> LabelSelector {
    LabelSelector::from([
        (
            label(LabelKey::FederationCallbackId),
            federation_callback_id.to_string(),
        ),
        (label(LabelKey::Id), id.to_string()),
        (
            label(LabelKey::FederationRelation),
            Relation::Guest.as_str().to_string(),
        ),
    ])
}

/// Selector for the guest-relation Federation object behind a callback id
pub fn guest_federation_selector(federation_callback_id: &str) -> LabelSelector {
    LabelSelector::from([
        (
            label(LabelKey::FederationCallbackId),
            federation_callback_id.to_string(),
        ),
        (
            label(LabelKey::FederationRelation),
            Relation::Guest.as_str().to_string(),
        ),
    ])
}

/// Selector for the host-relation Federation object of a client
pub fn host_client_selector(client_id: &str) -> LabelSelector {
    LabelSelector::from([
        (label(LabelKey::ClientId), client_id.to_string()),
        (
            label(LabelKey::FederationRelation),
            Relation::Host.as_str().to_string(),
        ),
    ])
}

/// Selector for any Federation object carrying a client credential
pub fn client_selector(client_id: &str) -> LabelSelector {
    LabelSelector::from([(label(LabelKey::ClientId), client_id.to_string())])
}

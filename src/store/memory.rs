//! In-memory object store
//!
//! A process-local [`ObjectStore`] used in tests and local development. It
//! reproduces the backend guarantees the metadata store relies on: atomic
//! create on name conflict, exact-match label selection with stable
//! name-ordered results, status-only merge patches, and owner-reference
//! cascade deletion.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use async_trait::async_trait;

use super::{LabelSelector, ObjectKind, ObjectStore, StoreError, StoredObject};

type ObjectKey = (ObjectKind, String, String);

/// DashMap-backed object store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: DashMap<ObjectKey, StoredObject>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(kind: ObjectKind, namespace: &str, name: &str) -> ObjectKey {
        (kind, namespace.to_string(), name.to_string())
    }

    fn matches(object: &StoredObject, selector: &LabelSelector) -> bool {
        selector
            .iter()
            .all(|(key, value)| object.labels.get(key) == Some(value))
    }

    /// Collect the keys of all objects owned (transitively) by `owner`
    fn owned_keys(&self, namespace: &str, owner_kind: ObjectKind, owner_name: &str) -> Vec<ObjectKey> {
        let mut owned = Vec::new();
        for entry in self.objects.iter() {
            let object = entry.value();
            if object.namespace != namespace {
                continue;
            }
            if let Some(owner) = &object.owner {
                if owner.kind == owner_kind && owner.name == owner_name {
                    owned.push(entry.key().clone());
                    owned.extend(self.owned_keys(namespace, object.kind, &object.name));
                }
            }
        }
        owned
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn create(&self, object: StoredObject) -> Result<(), StoreError> {
        let key = Self::key(object.kind, &object.namespace, &object.name);
        match self.objects.entry(key) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists {
                name: object.name,
            }),
            Entry::Vacant(slot) => {
                slot.insert(object);
                Ok(())
            }
        }
    }

    async fn get(
        &self,
        kind: ObjectKind,
        namespace: &str,
        name: &str,
    ) -> Result<StoredObject, StoreError> {
        self.objects
            .get(&Self::key(kind, namespace, name))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
            })
    }

    async fn list(
        &self,
        kind: ObjectKind,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<StoredObject>, StoreError> {
        let mut matched: Vec<StoredObject> = self
            .objects
            .iter()
            .filter(|entry| {
                let object = entry.value();
                object.kind == kind
                    && object.namespace == namespace
                    && Self::matches(object, selector)
            })
            .map(|entry| entry.value().clone())
            .collect();
        matched.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matched)
    }

    async fn update(&self, object: StoredObject) -> Result<(), StoreError> {
        let key = Self::key(object.kind, &object.namespace, &object.name);
        match self.objects.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.insert(object);
                Ok(())
            }
            Entry::Vacant(_) => Err(StoreError::NotFound {
                name: object.name,
            }),
        }
    }

    async fn patch_status(
        &self,
        kind: ObjectKind,
        namespace: &str,
        name: &str,
        state: &str,
    ) -> Result<(), StoreError> {
        match self.objects.get_mut(&Self::key(kind, namespace, name)) {
            Some(mut entry) => {
                entry.value_mut().status = Some(state.to_string());
                Ok(())
            }
            None => Err(StoreError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    async fn delete(
        &self,
        kind: ObjectKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        let removed = self.objects.remove(&Self::key(kind, namespace, name));
        if removed.is_none() {
            return Err(StoreError::NotFound {
                name: name.to_string(),
            });
        }
        for key in self.owned_keys(namespace, kind, name) {
            self.objects.remove(&key);
        }
        Ok(())
    }
}

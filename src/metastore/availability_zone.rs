//! Availability zone repository
//!
//! Zones are resource-pool advertisements global to the operator: they are
//! provisioned externally, named directly by zone id, and only read here,
//! either one by one or as a flat list.

use super::MetaStore;
use crate::error::MetastoreError;
use crate::models::{PartnerAvailabilityZone, ZoneDetails};
use crate::store::{LabelSelector, ObjectKind, StoredObject};

fn zone_from_object(object: &StoredObject) -> PartnerAvailabilityZone {
    PartnerAvailabilityZone {
        zone_details: Some(ZoneDetails {
            zone_id: object.name.clone(),
            geolocation: None,
            geography_details: None,
        }),
        zone_registered_data: None,
    }
}

impl MetaStore {
    /// Get a zone by id; the zone id is the object name, no label lookup
    pub async fn get_availability_zone(
        &self,
        _federation_context_id: &str,
        id: &str,
    ) -> Result<PartnerAvailabilityZone, MetastoreError> {
        let object = self
            .store()
            .get(ObjectKind::AvailabilityZone, self.namespace(), id)
            .await?;
        Ok(zone_from_object(&object))
    }

    pub async fn list_availability_zones(
        &self,
    ) -> Result<Vec<PartnerAvailabilityZone>, MetastoreError> {
        let objects = self
            .search_objects(ObjectKind::AvailabilityZone, &LabelSelector::new())
            .await?;
        Ok(objects.iter().map(zone_from_object).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metastore::testutil::{metastore, zone_object};
    use crate::store::ObjectStore;

    #[tokio::test]
    async fn test_get_zone() {
        let (store, meta) = metastore();
        store.create(zone_object("zone-a")).await.unwrap();

        let zone = meta.get_availability_zone("ctx-1", "zone-a").await.unwrap();
        assert_eq!(zone.zone_details.unwrap().zone_id, "zone-a");
    }

    #[tokio::test]
    async fn test_get_zone_missing() {
        let (_store, meta) = metastore();
        let err = meta
            .get_availability_zone("ctx-1", "zone-x")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_zones() {
        let (store, meta) = metastore();
        store.create(zone_object("zone-b")).await.unwrap();
        store.create(zone_object("zone-a")).await.unwrap();

        let zones = meta.list_availability_zones().await.unwrap();
        let ids: Vec<String> = zones
            .into_iter()
            .map(|zone| zone.zone_details.unwrap().zone_id)
            .collect();
        assert_eq!(ids, vec!["zone-a", "zone-b"]);
    }
}

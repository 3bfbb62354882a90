//! Federation repository
//!
//! A Federation is never created from scratch: every known client is
//! represented by an externally provisioned placeholder object labeled with
//! its credential. Creation claims the placeholder by setting its initial
//! date and host-relation labels; a placeholder whose initial date is
//! already set means the client has federated before and the create is
//! rejected as already-exists. This is the mechanism enforcing at most one
//! Federation per client credential.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{decode_spec, encode_spec, MetaStore};
use crate::error::MetastoreError;
use crate::labels::{self, label, LabelKey, Relation};
use crate::models::{
    CallbackCredentials, Federation, FederationRequestData, FederationStatus, MobileNetworkIds,
    ZoneDetails,
};
use crate::store::{ObjectKind, StoredObject};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct FederationSpec {
    /// Unset on externally provisioned placeholders; set once on creation
    pub initial_date: Option<DateTime<Utc>>,
    pub origin: OriginSpec,
    pub partner: PartnerSpec,
    /// Credentials we issued to the guest partner, recorded at provisioning
    pub guest_partner_credentials: GuestPartnerCredentialsSpec,
    pub accepted_availability_zones: Vec<String>,
    pub offered_availability_zones: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct OriginSpec {
    pub country_code: String,
    pub fixed_network_codes: Vec<String>,
    pub mobile_network_codes: MobileNetworkCodesSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct MobileNetworkCodesSpec {
    pub mcc: String,
    pub mncs: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PartnerSpec {
    pub callback_credentials: CallbackCredentialsSpec,
    pub status_link: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CallbackCredentialsSpec {
    pub client_id: String,
    pub token_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct GuestPartnerCredentialsSpec {
    pub client_id: String,
}

/// Fold the creation request into the placeholder's spec, defaulting every
/// absent optional field to its zero value
fn apply_request(spec: &mut FederationSpec, input: &Federation) {
    let request = &input.request;
    spec.initial_date = Some(request.initial_date);
    spec.origin = OriginSpec {
        country_code: request.orig_op_country_code.clone().unwrap_or_default(),
        fixed_network_codes: request
            .orig_op_fixed_network_codes
            .clone()
            .unwrap_or_default(),
        mobile_network_codes: request
            .orig_op_mobile_network_codes
            .as_ref()
            .map(|codes| MobileNetworkCodesSpec {
                mcc: codes.mcc.clone().unwrap_or_default(),
                mncs: codes.mncs.clone().unwrap_or_default(),
            })
            .unwrap_or_default(),
    };
    spec.partner = PartnerSpec {
        callback_credentials: request
            .partner_callback_credentials
            .as_ref()
            .map(|credentials| CallbackCredentialsSpec {
                client_id: credentials.client_id.clone(),
                token_url: credentials.token_url.clone(),
            })
            .unwrap_or_default(),
        status_link: request.partner_status_link.clone(),
    };
    spec.accepted_availability_zones = input
        .accepted_availability_zones
        .clone()
        .unwrap_or_default();
}

pub(crate) fn federation_from_object(object: &StoredObject) -> Result<Federation, MetastoreError> {
    let spec: FederationSpec = decode_spec(object)?;
    let context_id = object
        .labels
        .get(&label(LabelKey::FederationContextId))
        .cloned()
        .unwrap_or_default();
    let offered = spec
        .offered_availability_zones
        .iter()
        .map(|zone_id| ZoneDetails {
            zone_id: zone_id.clone(),
            geolocation: None,
            geography_details: None,
        })
        .collect();
    Ok(Federation {
        request: FederationRequestData {
            initial_date: spec.initial_date.unwrap_or(DateTime::UNIX_EPOCH),
            orig_op_country_code: Some(spec.origin.country_code),
            orig_op_fixed_network_codes: Some(spec.origin.fixed_network_codes),
            orig_op_mobile_network_codes: Some(MobileNetworkIds {
                mcc: Some(spec.origin.mobile_network_codes.mcc),
                mncs: Some(spec.origin.mobile_network_codes.mncs),
            }),
            partner_callback_credentials: Some(CallbackCredentials {
                client_id: spec.partner.callback_credentials.client_id,
                token_url: spec.partner.callback_credentials.token_url,
            }),
            partner_status_link: spec.partner.status_link,
        },
        client_credentials: Default::default(),
        federation_context_id: context_id,
        accepted_availability_zones: Some(spec.accepted_availability_zones),
        offered_availability_zones: Some(offered),
    })
}

/// Merge two id lists into one without duplicates, preserving the order of
/// first appearance
fn merge_unique(existing: Vec<String>, incoming: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut merged = Vec::new();
    for value in existing.into_iter().chain(incoming.iter().cloned()) {
        if seen.insert(value.clone()) {
            merged.push(value);
        }
    }
    merged
}

impl MetaStore {
    /// Establish the federation for the client identified by the request
    /// credentials
    ///
    /// Fails with already-exists if the client's placeholder was claimed
    /// before, and with not-found if the client has no placeholder at all.
    pub async fn create_federation(
        &self,
        input: &Federation,
    ) -> Result<Federation, MetastoreError> {
        let client_id = &input.client_credentials.client_id;
        let mut object = self
            .search_object(
                ObjectKind::Federation,
                &labels::host_client_selector(client_id),
            )
            .await?;

        let mut spec: FederationSpec = decode_spec(&object)?;
        if spec.initial_date.is_some() {
            return Err(MetastoreError::AlreadyExists {
                detail: format!("failed to create federation (clientId: {})", client_id),
            });
        }

        object.labels.insert(
            label(LabelKey::FederationContextId),
            input.federation_context_id.clone(),
        );
        object
            .labels
            .insert(label(LabelKey::Id), input.federation_context_id.clone());
        object.labels.insert(
            label(LabelKey::FederationRelation),
            Relation::Host.as_str().to_string(),
        );
        apply_request(&mut spec, input);
        object.spec = encode_spec(&spec)?;

        self.update_object(object.clone()).await?;
        federation_from_object(&object)
    }

    pub async fn get_federation(
        &self,
        federation_context_id: &str,
    ) -> Result<Federation, MetastoreError> {
        let object = self
            .get_host_object(
                ObjectKind::Federation,
                federation_context_id,
                federation_context_id,
            )
            .await?;
        federation_from_object(&object)
    }

    /// Remove the federation; the backend cascades the deletion to every
    /// entity it owns
    pub async fn remove_federation(
        &self,
        federation_context_id: &str,
    ) -> Result<(), MetastoreError> {
        let object = self
            .get_host_object(
                ObjectKind::Federation,
                federation_context_id,
                federation_context_id,
            )
            .await?;
        self.delete_object(ObjectKind::Federation, &object.name).await
    }

    /// Apply a partner status callback to the guest-relation federation
    ///
    /// Unrecognized status values are dropped without error, per the
    /// callback contract.
    pub async fn update_federation_status(
        &self,
        federation_callback_id: &str,
        status: &str,
    ) -> Result<(), MetastoreError> {
        let object = self
            .search_object(
                ObjectKind::Federation,
                &labels::guest_federation_selector(federation_callback_id),
            )
            .await?;

        match status.parse::<FederationStatus>() {
            Ok(state) => {
                self.patch_object_status(ObjectKind::Federation, &object.name, state.as_str())
                    .await
            }
            Err(_) => {
                debug!(status, "dropping unrecognized federation status");
                Ok(())
            }
        }
    }

    /// Subscribe the partner to availability zones
    ///
    /// Every requested zone must be in the federation's offered list. The
    /// accepted list grows without duplicates; re-subscribing to an already
    /// accepted zone is a no-op.
    pub async fn subscribe_availability_zones(
        &self,
        federation_context_id: &str,
        zones: &[String],
    ) -> Result<(), MetastoreError> {
        let mut object = self
            .get_host_object(
                ObjectKind::Federation,
                federation_context_id,
                federation_context_id,
            )
            .await?;
        let mut spec: FederationSpec = decode_spec(&object)?;

        for zone in zones {
            if !spec.offered_availability_zones.contains(zone) {
                return Err(MetastoreError::BadRequest {
                    detail: format!("accepted availability zone '{}': not found", zone),
                });
            }
        }

        spec.accepted_availability_zones =
            merge_unique(spec.accepted_availability_zones, zones);
        object.spec = encode_spec(&spec)?;
        self.update_object(object).await
    }
}

//! Application instance repository
//!
//! An instance deploys one application into one zone. The referenced
//! application is checked best-effort at creation (only not-found blocks);
//! the instance is owned by its Federation like every other dependent.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{decode_spec, encode_spec, MetaStore};
use crate::error::MetastoreError;
use crate::labels::{self, label, LabelKey};
use crate::models::{
    ApplicationInstance, ApplicationInstanceStatus, ApplicationInstanceStatusUpdate, ZoneInfo,
};
use crate::store::{ObjectKind, StoredObject};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ApplicationInstanceSpec {
    pub app_provider_id: String,
    pub app_id: String,
    pub app_version: String,
    pub zone_info: ZoneSpec,
    pub callback_link: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ZoneSpec {
    pub zone_id: String,
    pub flavour_id: String,
    pub resource_consumption: String,
    pub res_pool: String,
}

fn instance_spec(input: &ApplicationInstance) -> ApplicationInstanceSpec {
    ApplicationInstanceSpec {
        app_provider_id: input.app_provider_id.clone(),
        app_id: input.app_id.clone(),
        app_version: input.app_version.clone(),
        zone_info: ZoneSpec {
            zone_id: input.zone_info.zone_id.clone(),
            flavour_id: input.zone_info.flavour_id.clone(),
            resource_consumption: input
                .zone_info
                .resource_consumption
                .clone()
                .unwrap_or_default(),
            res_pool: input.zone_info.res_pool.clone().unwrap_or_default(),
        },
        callback_link: input.app_inst_callback_link.clone(),
    }
}

fn instance_from_object(object: &StoredObject) -> Result<ApplicationInstance, MetastoreError> {
    let spec: ApplicationInstanceSpec = decode_spec(object)?;
    Ok(ApplicationInstance {
        app_instance_id: object
            .labels
            .get(&label(LabelKey::Id))
            .cloned()
            .unwrap_or_default(),
        app_id: spec.app_id,
        app_provider_id: spec.app_provider_id,
        app_version: spec.app_version,
        zone_info: ZoneInfo {
            zone_id: spec.zone_info.zone_id,
            flavour_id: spec.zone_info.flavour_id,
            resource_consumption: Some(spec.zone_info.resource_consumption),
            res_pool: Some(spec.zone_info.res_pool),
        },
        app_inst_callback_link: spec.callback_link,
        federation_context_id: object
            .labels
            .get(&label(LabelKey::FederationContextId))
            .cloned()
            .unwrap_or_default(),
    })
}

impl MetaStore {
    /// Record a deployed application instance in a federation scope
    pub async fn add_application_instance(
        &self,
        input: &ApplicationInstance,
    ) -> Result<(), MetastoreError> {
        match self
            .get_application(&input.federation_context_id, &input.app_id)
            .await
        {
            Ok(_) => {}
            Err(err) if err.is_not_found() => {
                return Err(MetastoreError::BadRequest {
                    detail: err.to_string(),
                });
            }
            Err(err) => {
                warn!(app_id = %input.app_id, error = %err, "application reference check failed, continuing");
            }
        }

        let owner = self.owner_reference(&input.federation_context_id).await?;
        let object = StoredObject {
            kind: ObjectKind::ApplicationInstance,
            name: labels::object_name(
                ObjectKind::ApplicationInstance,
                &input.federation_context_id,
                &input.app_instance_id,
            ),
            namespace: self.namespace().to_string(),
            labels: labels::host_labels(&input.federation_context_id, &input.app_instance_id),
            owner: Some(owner),
            spec: encode_spec(&instance_spec(input))?,
            status: None,
        };
        self.create_object(object).await
    }

    pub async fn get_application_instance(
        &self,
        federation_context_id: &str,
        id: &str,
    ) -> Result<ApplicationInstance, MetastoreError> {
        let object = self
            .get_host_object(ObjectKind::ApplicationInstance, federation_context_id, id)
            .await?;
        instance_from_object(&object)
    }

    pub async fn remove_application_instance(
        &self,
        federation_context_id: &str,
        id: &str,
    ) -> Result<(), MetastoreError> {
        let name =
            labels::object_name(ObjectKind::ApplicationInstance, federation_context_id, id);
        self.delete_object(ObjectKind::ApplicationInstance, &name)
            .await
    }

    /// Apply an application-instance status callback
    ///
    /// Unrecognized or absent states are dropped without error.
    pub async fn update_application_instance_status(
        &self,
        federation_callback_id: &str,
        update: &ApplicationInstanceStatusUpdate,
    ) -> Result<(), MetastoreError> {
        let object = self
            .get_callback_object(
                ObjectKind::ApplicationInstance,
                federation_callback_id,
                &update.app_instance_id,
            )
            .await?;

        let Some(state) = update.app_instance_info.app_instance_state.as_deref() else {
            return Ok(());
        };
        match state.parse::<ApplicationInstanceStatus>() {
            Ok(state) => {
                self.patch_object_status(
                    ObjectKind::ApplicationInstance,
                    &object.name,
                    state.as_str(),
                )
                .await
            }
            Err(_) => {
                debug!(state, "dropping unrecognized application instance status");
                Ok(())
            }
        }
    }
}

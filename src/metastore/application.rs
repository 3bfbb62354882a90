//! Application repository
//!
//! Onboarding validates artefact references best-effort: only a not-found
//! on a referenced artefact blocks the create; any other lookup failure is
//! logged and the create proceeds. The created object is owned by its
//! Federation so removal of the federation cascades to it.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{decode_spec, encode_spec, MetaStore};
use crate::error::MetastoreError;
use crate::labels::{self, label, LabelKey};
use crate::models::{
    AppComponentSpec, AppMetaData, AppQosProfile, Application, ApplicationStatus,
    ApplicationStatusUpdate, OnboardApplication,
};
use crate::store::{ObjectKind, StoredObject};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ApplicationSpec {
    pub app_provider_id: String,
    pub component_specs: Vec<ComponentSpecRef>,
    pub meta_data: AppMetaDataSpec,
    pub qos_profile: QosProfileSpec,
    pub status_link: String,
}

/// Reference to an artefact backing one application component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ComponentSpecRef {
    pub artefact_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct AppMetaDataSpec {
    pub access_token: String,
    pub name: String,
    pub mobility_support: bool,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct QosProfileSpec {
    pub provisioning: bool,
    pub latency_constraints: String,
    pub multi_user_clients: String,
    pub users_per_app_inst: i64,
}

fn application_spec(input: &OnboardApplication) -> ApplicationSpec {
    ApplicationSpec {
        app_provider_id: input.app_provider_id.clone(),
        component_specs: input
            .app_component_specs
            .iter()
            .map(|component| ComponentSpecRef {
                artefact_id: component.artefact_id.clone(),
            })
            .collect(),
        meta_data: AppMetaDataSpec {
            access_token: input.app_meta_data.access_token.clone(),
            name: input.app_meta_data.app_name.clone(),
            mobility_support: input.app_meta_data.mobility_support.unwrap_or_default(),
            version: input.app_meta_data.version.clone(),
        },
        qos_profile: QosProfileSpec {
            provisioning: input.app_qos_profile.app_provisioning.unwrap_or_default(),
            latency_constraints: input.app_qos_profile.latency_constraints.clone(),
            multi_user_clients: input
                .app_qos_profile
                .multi_user_clients
                .clone()
                .unwrap_or_default(),
            users_per_app_inst: input
                .app_qos_profile
                .no_of_users_per_app_inst
                .unwrap_or_default(),
        },
        status_link: input.app_status_callback_link.clone(),
    }
}

fn application_from_object(object: &StoredObject) -> Result<Application, MetastoreError> {
    let spec: ApplicationSpec = decode_spec(object)?;
    Ok(Application {
        app_provider_id: spec.app_provider_id,
        app_component_specs: spec
            .component_specs
            .into_iter()
            .map(|component| AppComponentSpec {
                artefact_id: component.artefact_id,
                component_name: None,
                service_name_ew: None,
                service_name_nb: None,
            })
            .collect(),
        app_meta_data: AppMetaData {
            access_token: spec.meta_data.access_token,
            app_name: spec.meta_data.name,
            version: spec.meta_data.version,
            mobility_support: Some(spec.meta_data.mobility_support),
        },
        app_qos_profile: AppQosProfile {
            app_provisioning: Some(spec.qos_profile.provisioning),
            latency_constraints: spec.qos_profile.latency_constraints,
            multi_user_clients: Some(spec.qos_profile.multi_user_clients),
            no_of_users_per_app_inst: Some(spec.qos_profile.users_per_app_inst),
        },
        federation_context_id: object
            .labels
            .get(&label(LabelKey::FederationContextId))
            .cloned()
            .unwrap_or_default(),
    })
}

impl MetaStore {
    /// Onboard an application descriptor into a federation scope
    pub async fn onboard_application(
        &self,
        input: &OnboardApplication,
    ) -> Result<(), MetastoreError> {
        for artefact_id in input.artefact_ids() {
            match self
                .get_artefact(&input.federation_context_id, artefact_id)
                .await
            {
                Ok(_) => {}
                Err(err) if err.is_not_found() => {
                    return Err(MetastoreError::BadRequest {
                        detail: err.to_string(),
                    });
                }
                Err(err) => {
                    warn!(artefact_id, error = %err, "artefact reference check failed, continuing");
                }
            }
        }

        let owner = self.owner_reference(&input.federation_context_id).await?;
        let object = StoredObject {
            kind: ObjectKind::Application,
            name: labels::object_name(
                ObjectKind::Application,
                &input.federation_context_id,
                &input.app_id,
            ),
            namespace: self.namespace().to_string(),
            labels: labels::host_labels(&input.federation_context_id, &input.app_id),
            owner: Some(owner),
            spec: encode_spec(&application_spec(input))?,
            status: None,
        };
        self.create_object(object).await
    }

    pub async fn get_application(
        &self,
        federation_context_id: &str,
        id: &str,
    ) -> Result<Application, MetastoreError> {
        let object = self
            .get_host_object(ObjectKind::Application, federation_context_id, id)
            .await?;
        application_from_object(&object)
    }

    pub async fn remove_application(
        &self,
        federation_context_id: &str,
        id: &str,
    ) -> Result<(), MetastoreError> {
        let name = labels::object_name(ObjectKind::Application, federation_context_id, id);
        self.delete_object(ObjectKind::Application, &name).await
    }

    /// Apply an application status callback
    ///
    /// Reads the first status entry of the payload; unrecognized or absent
    /// statuses are dropped without error.
    pub async fn update_application_status(
        &self,
        federation_callback_id: &str,
        update: &ApplicationStatusUpdate,
    ) -> Result<(), MetastoreError> {
        let object = self
            .get_callback_object(ObjectKind::Application, federation_callback_id, &update.app_id)
            .await?;

        let Some(info) = update.status_info.first() else {
            return Ok(());
        };
        match info.onboard_status_info.parse::<ApplicationStatus>() {
            Ok(state) => {
                self.patch_object_status(ObjectKind::Application, &object.name, state.as_str())
                    .await
            }
            Err(_) => {
                debug!(
                    status = %info.onboard_status_info,
                    "dropping unrecognized application status"
                );
                Ok(())
            }
        }
    }
}

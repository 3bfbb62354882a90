//! Artefact repository
//!
//! Uploads validate file references best-effort (component images must name
//! existing File entities; only not-found blocks). The uploaded package
//! content itself belongs to the file-transfer collaborator and is stripped
//! before the descriptor is persisted.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{decode_spec, encode_spec, MetaStore};
use crate::error::MetastoreError;
use crate::labels::{self, label, LabelKey};
use crate::models::{
    Artefact, CommandLineParams, ComponentSpec, ComputeResourceInfo, InterfaceDetails,
    UploadArtefact,
};
use crate::store::{ObjectKind, StoredObject};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ArtefactSpec {
    pub app_provider_id: String,
    pub artefact_name: String,
    pub artefact_version: String,
    pub descriptor_type: String,
    pub virt_type: String,
    pub component_spec: Vec<ComponentSpecStored>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ComponentSpecStored {
    pub name: String,
    pub images: Vec<String>,
    pub command_line_params: CommandLineStored,
    pub num_of_instances: i64,
    pub restart_policy: String,
    pub exposed_interfaces: Vec<ExposedInterfaceStored>,
    pub compute_resource_profile: ComputeResourceStored,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CommandLineStored {
    pub command: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ExposedInterfaceStored {
    pub port: i64,
    pub interface_id: String,
    pub protocol: String,
    pub visibility_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ComputeResourceStored {
    pub cpu_arch_type: String,
    pub cpu_exclusivity: bool,
    pub memory: i64,
    #[serde(rename = "numCPU")]
    pub num_cpu: i64,
}

/// Build the persisted spec; the binary payload is deliberately absent
fn artefact_spec(input: &UploadArtefact) -> ArtefactSpec {
    ArtefactSpec {
        app_provider_id: input.app_provider_id.clone(),
        artefact_name: input.artefact_name.clone(),
        artefact_version: input.artefact_version_info.clone(),
        descriptor_type: input.artefact_descriptor_type.clone(),
        virt_type: input.artefact_virt_type.clone(),
        component_spec: input
            .component_spec
            .iter()
            .map(|component| {
                let exposed = component
                    .exposed_interfaces
                    .clone()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|interface| ExposedInterfaceStored {
                        port: i64::from(interface.comm_port),
                        interface_id: interface.interface_id,
                        protocol: interface.comm_protocol,
                        visibility_type: interface.visibility_type,
                    })
                    .collect();
                let command_line = component.command_line_params.clone().unwrap_or_default();
                ComponentSpecStored {
                    name: component.component_name.clone(),
                    images: component.images.clone(),
                    command_line_params: CommandLineStored {
                        command: command_line.command,
                        args: command_line.command_args.unwrap_or_default(),
                    },
                    num_of_instances: i64::from(component.num_of_instances),
                    restart_policy: component.restart_policy.clone(),
                    exposed_interfaces: exposed,
                    compute_resource_profile: ComputeResourceStored {
                        cpu_arch_type: component.compute_resource_profile.cpu_arch_type.clone(),
                        cpu_exclusivity: component
                            .compute_resource_profile
                            .cpu_exclusivity
                            .unwrap_or_default(),
                        memory: component.compute_resource_profile.memory,
                        num_cpu: component.compute_resource_profile.num_cpu,
                    },
                }
            })
            .collect(),
    }
}

fn artefact_from_object(object: &StoredObject) -> Result<Artefact, MetastoreError> {
    let spec: ArtefactSpec = decode_spec(object)?;
    let component_spec = spec
        .component_spec
        .into_iter()
        .map(|component| ComponentSpec {
            component_name: component.name,
            images: component.images,
            num_of_instances: component.num_of_instances as i32,
            restart_policy: component.restart_policy,
            command_line_params: Some(CommandLineParams {
                command: component.command_line_params.command,
                command_args: Some(component.command_line_params.args),
            }),
            exposed_interfaces: Some(
                component
                    .exposed_interfaces
                    .into_iter()
                    .map(|interface| InterfaceDetails {
                        comm_port: interface.port as i32,
                        comm_protocol: interface.protocol,
                        interface_id: interface.interface_id,
                        visibility_type: interface.visibility_type,
                    })
                    .collect(),
            ),
            compute_resource_profile: ComputeResourceInfo {
                cpu_arch_type: component.compute_resource_profile.cpu_arch_type,
                cpu_exclusivity: Some(component.compute_resource_profile.cpu_exclusivity),
                memory: component.compute_resource_profile.memory,
                num_cpu: component.compute_resource_profile.num_cpu,
            },
        })
        .collect();
    Ok(Artefact {
        artefact_id: object
            .labels
            .get(&label(LabelKey::Id))
            .cloned()
            .unwrap_or_default(),
        app_provider_id: spec.app_provider_id,
        artefact_name: spec.artefact_name,
        artefact_version_info: spec.artefact_version,
        artefact_descriptor_type: spec.descriptor_type,
        artefact_virt_type: spec.virt_type,
        component_spec,
        federation_context_id: object
            .labels
            .get(&label(LabelKey::FederationContextId))
            .cloned()
            .unwrap_or_default(),
    })
}

impl MetaStore {
    /// Upload an artefact descriptor into a federation scope
    pub async fn upload_artefact(&self, input: &UploadArtefact) -> Result<(), MetastoreError> {
        for file_id in input.file_ids() {
            match self.get_file(&input.federation_context_id, file_id).await {
                Ok(_) => {}
                Err(err) if err.is_not_found() => {
                    return Err(MetastoreError::BadRequest {
                        detail: err.to_string(),
                    });
                }
                Err(err) => {
                    warn!(file_id, error = %err, "file reference check failed, continuing");
                }
            }
        }

        let owner = self.owner_reference(&input.federation_context_id).await?;
        let object = StoredObject {
            kind: ObjectKind::Artefact,
            name: labels::object_name(
                ObjectKind::Artefact,
                &input.federation_context_id,
                &input.artefact_id,
            ),
            namespace: self.namespace().to_string(),
            labels: labels::host_labels(&input.federation_context_id, &input.artefact_id),
            owner: Some(owner),
            spec: encode_spec(&artefact_spec(input))?,
            status: None,
        };
        self.create_object(object).await
    }

    pub async fn get_artefact(
        &self,
        federation_context_id: &str,
        id: &str,
    ) -> Result<Artefact, MetastoreError> {
        let object = self
            .get_host_object(ObjectKind::Artefact, federation_context_id, id)
            .await?;
        artefact_from_object(&object)
    }

    pub async fn remove_artefact(
        &self,
        federation_context_id: &str,
        id: &str,
    ) -> Result<(), MetastoreError> {
        let name = labels::object_name(ObjectKind::Artefact, federation_context_id, id);
        self.delete_object(ObjectKind::Artefact, &name).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metastore::testutil::{metastore, seed_federation, FailingListStore, NAMESPACE};
    use crate::store::{InMemoryStore, ObjectStore};

    pub(crate) fn upload_input(
        context_id: &str,
        artefact_id: &str,
        images: &[&str],
    ) -> UploadArtefact {
        UploadArtefact {
            artefact_id: artefact_id.to_string(),
            app_provider_id: "provider-1".to_string(),
            artefact_name: "demo-chart".to_string(),
            artefact_version_info: "1.0".to_string(),
            artefact_descriptor_type: "HELM".to_string(),
            artefact_virt_type: "CONTAINER_TYPE".to_string(),
            component_spec: vec![ComponentSpec {
                component_name: "main".to_string(),
                images: images.iter().map(|image| image.to_string()).collect(),
                num_of_instances: 2,
                restart_policy: "RESTART_POLICY_ALWAYS".to_string(),
                command_line_params: None,
                exposed_interfaces: Some(vec![InterfaceDetails {
                    comm_port: 8080,
                    comm_protocol: "TCP".to_string(),
                    interface_id: "http".to_string(),
                    visibility_type: "VISIBILITY_EXTERNAL".to_string(),
                }]),
                compute_resource_profile: ComputeResourceInfo {
                    cpu_arch_type: "ISA_X86_64".to_string(),
                    cpu_exclusivity: None,
                    memory: 1024,
                    num_cpu: 2,
                },
            }],
            artefact_file: Some(vec![0xde, 0xad, 0xbe, 0xef]),
            federation_context_id: context_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_upload_with_dangling_file() {
        let (store, meta) = metastore();
        seed_federation(&store, "acme", "ctx-1").await;

        let err = meta
            .upload_artefact(&upload_input("ctx-1", "art-1", &["missing-file"]))
            .await
            .unwrap_err();
        assert!(err.is_bad_request());
    }

    #[tokio::test]
    async fn test_upload_proceeds_when_file_check_degraded() {
        let inner = InMemoryStore::new();
        seed_federation(&inner, "acme", "ctx-1").await;
        let store = Arc::new(FailingListStore {
            inner,
            fail_kind: ObjectKind::File,
        });
        let meta = MetaStore::new(store, NAMESPACE);

        meta.upload_artefact(&upload_input("ctx-1", "art-1", &["f1"]))
            .await
            .unwrap();
        assert!(meta.get_artefact("ctx-1", "art-1").await.is_ok());
    }

    #[tokio::test]
    async fn test_upload_strips_binary_payload() {
        let (store, meta) = metastore();
        seed_federation(&store, "acme", "ctx-1").await;

        meta.upload_artefact(&upload_input("ctx-1", "art-1", &[]))
            .await
            .unwrap();

        let name = labels::object_name(ObjectKind::Artefact, "ctx-1", "art-1");
        let object = store
            .get(ObjectKind::Artefact, NAMESPACE, &name)
            .await
            .unwrap();
        assert!(object.spec.get("artefactFile").is_none());
        assert_eq!(object.spec["artefactName"], "demo-chart");
    }

    #[tokio::test]
    async fn test_upload_and_get_roundtrip() {
        let (store, meta) = metastore();
        seed_federation(&store, "acme", "ctx-1").await;
        meta.upload_file(&crate::metastore::file::tests::upload_input("ctx-1", "f1"))
            .await
            .unwrap();

        meta.upload_artefact(&upload_input("ctx-1", "art-1", &["f1"]))
            .await
            .unwrap();

        let artefact = meta.get_artefact("ctx-1", "art-1").await.unwrap();
        assert_eq!(artefact.artefact_id, "art-1");
        assert_eq!(artefact.component_spec.len(), 1);
        let component = &artefact.component_spec[0];
        assert_eq!(component.images, vec!["f1"]);
        assert_eq!(component.num_of_instances, 2);
        let interfaces = component.exposed_interfaces.as_ref().unwrap();
        assert_eq!(interfaces[0].comm_port, 8080);
        // absent optionals come back as zero values, not nulls
        assert_eq!(
            component.command_line_params.as_ref().unwrap().command,
            ""
        );
        assert_eq!(
            component.compute_resource_profile.cpu_exclusivity,
            Some(false)
        );
    }

    #[tokio::test]
    async fn test_remove_artefact() {
        let (store, meta) = metastore();
        seed_federation(&store, "acme", "ctx-1").await;
        meta.upload_artefact(&upload_input("ctx-1", "art-1", &[]))
            .await
            .unwrap();

        meta.remove_artefact("ctx-1", "art-1").await.unwrap();
        let err = meta.get_artefact("ctx-1", "art-1").await.unwrap_err();
        assert!(err.is_not_found());
    }
}

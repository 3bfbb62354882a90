//! End-to-end federation lifecycle over the in-memory backend

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use federation_metastore::labels::{label, LabelKey, Relation};
use federation_metastore::models::{
    AppComponentSpec, AppMetaData, AppQosProfile, ApplicationStatusUpdate, ClientCredentials,
    ComponentSpec, ComputeResourceInfo, Federation, FederationRequestData, MobileNetworkIds,
    OnboardApplication, OnboardStatusInfo, OsType, UploadArtefact, UploadFile,
};
use federation_metastore::{
    InMemoryStore, MetaStore, MetastoreError, ObjectKind, ObjectStore, StoredObject,
};

const NAMESPACE: &str = "federation";
const CLIENT_ID: &str = "acme";
const CONTEXT_ID: &str = "ctx-acme";
const PROVIDER_ID: &str = "provider-1";

async fn provisioned_metastore() -> (Arc<InMemoryStore>, MetaStore) {
    let store = Arc::new(InMemoryStore::new());
    // the placeholder object an operator provisions before the partner
    // calls in, labeled by the partner's client credential
    store
        .create(StoredObject {
            kind: ObjectKind::Federation,
            name: "federation-placeholder-acme".to_string(),
            namespace: NAMESPACE.to_string(),
            labels: [
                (label(LabelKey::ClientId), CLIENT_ID.to_string()),
                (
                    label(LabelKey::FederationRelation),
                    Relation::Host.as_str().to_string(),
                ),
            ]
            .into(),
            owner: None,
            spec: json!({
                "guestPartnerCredentials": { "clientId": "guest-acme" },
                "offeredAvailabilityZones": ["zone-a", "zone-b"],
            }),
            status: None,
        })
        .await
        .unwrap();
    let meta = MetaStore::new(store.clone(), NAMESPACE);
    (store, meta)
}

fn federation_request() -> Federation {
    Federation {
        request: FederationRequestData {
            initial_date: Utc::now(),
            orig_op_country_code: Some("NL".to_string()),
            orig_op_fixed_network_codes: None,
            orig_op_mobile_network_codes: Some(MobileNetworkIds {
                mcc: Some("204".to_string()),
                mncs: Some(vec!["04".to_string()]),
            }),
            partner_callback_credentials: None,
            partner_status_link: "https://partner.example/status".to_string(),
        },
        client_credentials: ClientCredentials {
            client_id: CLIENT_ID.to_string(),
        },
        federation_context_id: CONTEXT_ID.to_string(),
        accepted_availability_zones: None,
        offered_availability_zones: None,
    }
}

fn upload_file_input(file_id: &str) -> UploadFile {
    UploadFile {
        file_id: file_id.to_string(),
        app_provider_id: PROVIDER_ID.to_string(),
        file_name: "app-image".to_string(),
        file_version_info: "1.0.0".to_string(),
        file_type: "QCOW2".to_string(),
        repo_type: None,
        file_repo_location: None,
        img_ins_set_arch: "x86_64".to_string(),
        img_os_type: OsType {
            architecture: "x86_64".to_string(),
            distribution: "UBUNTU".to_string(),
            license: "OS_LICENSE_TYPE_FREE".to_string(),
            version: "OS_VERSION_UBUNTU_2204_LTS".to_string(),
        },
        file: Some(vec![0x51, 0x46, 0x49]),
        federation_context_id: CONTEXT_ID.to_string(),
    }
}

fn upload_artefact_input(artefact_id: &str, image: &str) -> UploadArtefact {
    UploadArtefact {
        artefact_id: artefact_id.to_string(),
        app_provider_id: PROVIDER_ID.to_string(),
        artefact_name: "worker".to_string(),
        artefact_version_info: "1.0.0".to_string(),
        artefact_descriptor_type: "COMPONENTSPEC".to_string(),
        artefact_virt_type: "VM_TYPE".to_string(),
        component_spec: vec![ComponentSpec {
            component_name: "worker".to_string(),
            images: vec![image.to_string()],
            num_of_instances: 1,
            restart_policy: "RESTART_POLICY_ALWAYS".to_string(),
            command_line_params: None,
            exposed_interfaces: None,
            compute_resource_profile: ComputeResourceInfo {
                cpu_arch_type: "ISA_X86_64".to_string(),
                cpu_exclusivity: None,
                memory: 4096,
                num_cpu: 2,
            },
        }],
        artefact_file: Some(vec![1, 2, 3]),
        federation_context_id: CONTEXT_ID.to_string(),
    }
}

fn onboard_input(app_id: &str, artefact_id: &str) -> OnboardApplication {
    OnboardApplication {
        app_id: app_id.to_string(),
        app_provider_id: PROVIDER_ID.to_string(),
        app_component_specs: vec![AppComponentSpec {
            artefact_id: artefact_id.to_string(),
            component_name: Some("worker".to_string()),
            service_name_ew: None,
            service_name_nb: None,
        }],
        app_meta_data: AppMetaData {
            access_token: "token".to_string(),
            app_name: "demo-app".to_string(),
            version: "1.0.0".to_string(),
            mobility_support: Some(false),
        },
        app_qos_profile: AppQosProfile {
            app_provisioning: Some(true),
            latency_constraints: "NONE".to_string(),
            multi_user_clients: None,
            no_of_users_per_app_inst: None,
        },
        app_status_callback_link: "https://partner.example/app-status".to_string(),
        federation_context_id: CONTEXT_ID.to_string(),
    }
}

#[tokio::test]
async fn test_federation_lifecycle_with_cascading_removal() {
    let (_store, meta) = provisioned_metastore().await;

    let federation = meta.create_federation(&federation_request()).await.unwrap();
    let offered: Vec<String> = federation
        .offered_availability_zones
        .unwrap_or_default()
        .into_iter()
        .map(|z| z.zone_id)
        .collect();
    assert_eq!(offered, vec!["zone-a", "zone-b"]);

    // claiming the same placeholder twice is a conflict
    let err = meta
        .create_federation(&federation_request())
        .await
        .unwrap_err();
    assert!(err.is_already_exists());

    meta.upload_file(&upload_file_input("file-1")).await.unwrap();
    meta.upload_artefact(&upload_artefact_input("artefact-1", "file-1"))
        .await
        .unwrap();
    meta.onboard_application(&onboard_input("app-1", "artefact-1"))
        .await
        .unwrap();

    let application = meta.get_application(CONTEXT_ID, "app-1").await.unwrap();
    assert_eq!(application.app_provider_id, PROVIDER_ID);
    assert_eq!(application.app_component_specs.len(), 1);
    assert_eq!(application.app_component_specs[0].artefact_id, "artefact-1");

    meta.subscribe_availability_zones(CONTEXT_ID, &["zone-b".to_string()])
        .await
        .unwrap();
    let federation = meta.get_federation(CONTEXT_ID).await.unwrap();
    assert_eq!(
        federation.accepted_availability_zones.unwrap_or_default(),
        vec!["zone-b"]
    );

    // removing the federation takes every owned entity with it
    meta.remove_federation(CONTEXT_ID).await.unwrap();
    for result in [
        meta.get_application(CONTEXT_ID, "app-1").await.err(),
        meta.get_artefact(CONTEXT_ID, "artefact-1").await.err(),
        meta.get_file(CONTEXT_ID, "file-1").await.err(),
    ] {
        assert!(matches!(result, Some(MetastoreError::NotFound { .. })));
    }
}

#[tokio::test]
async fn test_onboarding_requires_known_artefact() {
    let (_store, meta) = provisioned_metastore().await;
    meta.create_federation(&federation_request()).await.unwrap();

    let err = meta
        .onboard_application(&onboard_input("app-1", "artefact-missing"))
        .await
        .unwrap_err();
    assert!(err.is_bad_request());
}

#[tokio::test]
async fn test_status_callback_patches_state_and_leaves_spec() {
    let store = Arc::new(InMemoryStore::new());
    let meta = MetaStore::new(store.clone(), NAMESPACE);

    // partner-side projection of an application, addressable by callback id
    let spec = json!({ "appProviderId": PROVIDER_ID });
    store
        .create(StoredObject {
            kind: ObjectKind::Application,
            name: "application-partner-1".to_string(),
            namespace: NAMESPACE.to_string(),
            labels: [
                (
                    label(LabelKey::FederationCallbackId),
                    "cb-acme".to_string(),
                ),
                (label(LabelKey::Id), "app-1".to_string()),
                (
                    label(LabelKey::FederationRelation),
                    Relation::Guest.as_str().to_string(),
                ),
            ]
            .into(),
            owner: None,
            spec: spec.clone(),
            status: None,
        })
        .await
        .unwrap();

    let update = ApplicationStatusUpdate {
        app_id: "app-1".to_string(),
        status_info: vec![OnboardStatusInfo {
            onboard_status_info: "ONBOARDED".to_string(),
            zone_id: None,
        }],
    };
    meta.update_application_status("cb-acme", &update)
        .await
        .unwrap();

    let object = store
        .get(ObjectKind::Application, NAMESPACE, "application-partner-1")
        .await
        .unwrap();
    assert_eq!(object.status.as_deref(), Some("Onboarded"));
    assert_eq!(object.spec, spec);
}

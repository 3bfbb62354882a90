//! Data models for the federation metadata store
//!
//! This module defines the API-facing DTOs exchanged with the handler layer
//! and the lifecycle status enums gating callback-driven updates. Store-side
//! spec documents live next to their repositories in the `metastore` module.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ================================================================================================
// Federation Models
// ================================================================================================

/// Opaque bearer identity supplied by the partner operator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCredentials {
    pub client_id: String,
}

/// Credentials the partner exposes for callback delivery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackCredentials {
    pub client_id: String,
    pub token_url: String,
}

/// Mobile network identifiers of the originating operator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileNetworkIds {
    pub mcc: Option<String>,
    pub mncs: Option<Vec<String>>,
}

/// Federation establishment request supplied by the originating operator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederationRequestData {
    /// Time at which the originating operator initiated the federation
    pub initial_date: DateTime<Utc>,
    pub orig_op_country_code: Option<String>,
    pub orig_op_fixed_network_codes: Option<Vec<String>>,
    pub orig_op_mobile_network_codes: Option<MobileNetworkIds>,
    /// Endpoint credentials for partner status callbacks
    pub partner_callback_credentials: Option<CallbackCredentials>,
    /// Partner callback endpoint for federation status changes
    pub partner_status_link: String,
}

/// Availability-zone advertisement offered to the partner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDetails {
    pub zone_id: String,
    pub geolocation: Option<String>,
    pub geography_details: Option<String>,
}

/// A bidirectional trust relationship with one partner operator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Federation {
    #[serde(flatten)]
    pub request: FederationRequestData,
    /// Credential identifying the originating client
    #[serde(skip)]
    pub client_credentials: ClientCredentials,
    /// Host-relation scope identifier generated at creation
    pub federation_context_id: String,
    /// Zones the partner has subscribed to; grows only via subscription
    pub accepted_availability_zones: Option<Vec<String>>,
    /// Zones this operator advertises to the partner
    pub offered_availability_zones: Option<Vec<ZoneDetails>>,
}

// ================================================================================================
// Application Models
// ================================================================================================

/// Application component referencing an onboarded artefact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppComponentSpec {
    /// Identifier of an artefact that must already exist in the same scope
    pub artefact_id: String,
    pub component_name: Option<String>,
    pub service_name_ew: Option<String>,
    pub service_name_nb: Option<String>,
}

/// Descriptive metadata of an onboarded application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppMetaData {
    pub access_token: String,
    pub app_name: String,
    pub version: String,
    pub mobility_support: Option<bool>,
}

/// Quality-of-service expectations of an application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppQosProfile {
    pub app_provisioning: Option<bool>,
    pub latency_constraints: String,
    pub multi_user_clients: Option<String>,
    pub no_of_users_per_app_inst: Option<i64>,
}

/// Application onboarding request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardApplication {
    pub app_id: String,
    pub app_provider_id: String,
    pub app_component_specs: Vec<AppComponentSpec>,
    pub app_meta_data: AppMetaData,
    pub app_qos_profile: AppQosProfile,
    /// Partner callback endpoint for onboarding status changes
    pub app_status_callback_link: String,
    #[serde(skip)]
    pub federation_context_id: String,
}

impl OnboardApplication {
    /// Artefact ids referenced by the application's components, in input order
    pub fn artefact_ids(&self) -> Vec<&str> {
        self.app_component_specs
            .iter()
            .map(|component| component.artefact_id.as_str())
            .collect()
    }
}

/// Onboarded application as returned to the handler layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub app_provider_id: String,
    pub app_component_specs: Vec<AppComponentSpec>,
    pub app_meta_data: AppMetaData,
    pub app_qos_profile: AppQosProfile,
    #[serde(skip)]
    pub federation_context_id: String,
}

// ================================================================================================
// Application Instance Models
// ================================================================================================

/// Placement of an application instance in a specific zone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneInfo {
    pub zone_id: String,
    pub flavour_id: String,
    pub resource_consumption: Option<String>,
    pub res_pool: Option<String>,
}

/// A deployed instance of an application in a specific zone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInstance {
    pub app_instance_id: String,
    /// Identifier of the application this instance deploys
    pub app_id: String,
    pub app_provider_id: String,
    pub app_version: String,
    pub zone_info: ZoneInfo,
    /// Partner callback endpoint for instance state changes
    pub app_inst_callback_link: String,
    #[serde(skip)]
    pub federation_context_id: String,
}

// ================================================================================================
// Artefact Models
// ================================================================================================

/// Network interface exposed by an artefact component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDetails {
    pub comm_port: i32,
    pub comm_protocol: String,
    pub interface_id: String,
    pub visibility_type: String,
}

/// Command-line invocation of an artefact component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandLineParams {
    pub command: String,
    pub command_args: Option<Vec<String>>,
}

/// Compute resources required by an artefact component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResourceInfo {
    pub cpu_arch_type: String,
    pub cpu_exclusivity: Option<bool>,
    pub memory: i64,
    #[serde(rename = "numCPU")]
    pub num_cpu: i64,
}

/// One deployable component of an artefact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    pub component_name: String,
    /// File ids of the images backing this component
    pub images: Vec<String>,
    pub num_of_instances: i32,
    pub restart_policy: String,
    pub command_line_params: Option<CommandLineParams>,
    pub exposed_interfaces: Option<Vec<InterfaceDetails>>,
    pub compute_resource_profile: ComputeResourceInfo,
}

/// Artefact upload request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadArtefact {
    pub artefact_id: String,
    pub app_provider_id: String,
    pub artefact_name: String,
    pub artefact_version_info: String,
    pub artefact_descriptor_type: String,
    pub artefact_virt_type: String,
    pub component_spec: Vec<ComponentSpec>,
    /// Uploaded package content; handed to the file-transfer collaborator
    /// and never persisted in the metadata store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artefact_file: Option<Vec<u8>>,
    #[serde(skip)]
    pub federation_context_id: String,
}

impl UploadArtefact {
    /// File ids referenced by the artefact's component images, flattened in
    /// input order
    pub fn file_ids(&self) -> Vec<&str> {
        self.component_spec
            .iter()
            .flat_map(|component| component.images.iter().map(String::as_str))
            .collect()
    }
}

/// Uploaded artefact as returned to the handler layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artefact {
    pub artefact_id: String,
    pub app_provider_id: String,
    pub artefact_name: String,
    pub artefact_version_info: String,
    pub artefact_descriptor_type: String,
    pub artefact_virt_type: String,
    pub component_spec: Vec<ComponentSpec>,
    #[serde(skip)]
    pub federation_context_id: String,
}

// ================================================================================================
// File Models
// ================================================================================================

/// Location of an image or binary in an external repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRepoLocation {
    #[serde(rename = "repoURL")]
    pub repo_url: Option<String>,
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

/// Operating system descriptor of an image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsType {
    pub architecture: String,
    pub distribution: String,
    pub license: String,
    pub version: String,
}

/// File upload request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFile {
    pub file_id: String,
    pub app_provider_id: String,
    pub file_name: String,
    pub file_version_info: String,
    pub file_type: String,
    pub repo_type: Option<String>,
    pub file_repo_location: Option<ObjectRepoLocation>,
    pub img_ins_set_arch: String,
    pub img_os_type: OsType,
    /// Uploaded binary content; handed to the file-transfer collaborator and
    /// never persisted in the metadata store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<Vec<u8>>,
    #[serde(skip)]
    pub federation_context_id: String,
}

/// Uploaded file descriptor as returned to the handler layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub file_id: String,
    pub app_provider_id: String,
    pub file_name: String,
    pub file_version_info: String,
    pub file_type: String,
    pub repo_type: Option<String>,
    pub file_repo_location: Option<ObjectRepoLocation>,
    pub img_ins_set_arch: String,
    pub img_os_type: OsType,
    #[serde(skip)]
    pub federation_context_id: String,
}

// ================================================================================================
// Availability Zone Models
// ================================================================================================

/// Resources registered for a subscribed zone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRegisteredData {
    pub zone_id: String,
}

/// A resource-pool advertisement, global to the operator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerAvailabilityZone {
    pub zone_details: Option<ZoneDetails>,
    pub zone_registered_data: Option<ZoneRegisteredData>,
}

// ================================================================================================
// Status Callback Models
// ================================================================================================

/// One onboarding status report within an application status callback
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardStatusInfo {
    /// Free-form status string; validated against [`ApplicationStatus`]
    pub onboard_status_info: String,
    pub zone_id: Option<String>,
}

/// Application status callback payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusUpdate {
    pub app_id: String,
    pub status_info: Vec<OnboardStatusInfo>,
}

/// Instance state within an application-instance status callback
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInstanceInfo {
    /// Free-form state string; validated against [`ApplicationInstanceStatus`]
    pub app_instance_state: Option<String>,
    pub message: Option<String>,
}

/// Application-instance status callback payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInstanceStatusUpdate {
    pub app_instance_id: String,
    pub app_instance_info: AppInstanceInfo,
}

// ================================================================================================
// Lifecycle Status Enums
// ================================================================================================

/// Normalize a free-form callback status for membership checks
///
/// Callbacks deliver statuses in arbitrary casing conventions
/// (`TEMPORARY_FAILURE`, `pending`, `Ready`); comparison ignores case and
/// separator characters.
fn status_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Lifecycle states of a guest-relation Federation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FederationStatus {
    Available,
    Locked,
    NotAvailable,
    TemporaryFailure,
    Failed,
}

impl FederationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FederationStatus::Available => "Available",
            FederationStatus::Locked => "Locked",
            FederationStatus::NotAvailable => "NotAvailable",
            FederationStatus::TemporaryFailure => "TemporaryFailure",
            FederationStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for FederationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FederationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match status_key(s).as_str() {
            "available" => Ok(FederationStatus::Available),
            "locked" => Ok(FederationStatus::Locked),
            "notavailable" => Ok(FederationStatus::NotAvailable),
            "temporaryfailure" => Ok(FederationStatus::TemporaryFailure),
            "failed" => Ok(FederationStatus::Failed),
            _ => Err(format!("invalid federation status: {}", s)),
        }
    }
}

/// Lifecycle states of an onboarded Application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Onboarded,
    Deboarding,
    Failed,
    Removed,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Onboarded => "Onboarded",
            ApplicationStatus::Deboarding => "Deboarding",
            ApplicationStatus::Failed => "Failed",
            ApplicationStatus::Removed => "Removed",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match status_key(s).as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "onboarded" => Ok(ApplicationStatus::Onboarded),
            "deboarding" => Ok(ApplicationStatus::Deboarding),
            "failed" => Ok(ApplicationStatus::Failed),
            "removed" => Ok(ApplicationStatus::Removed),
            _ => Err(format!("invalid application status: {}", s)),
        }
    }
}

/// Lifecycle states of a deployed ApplicationInstance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationInstanceStatus {
    Pending,
    Ready,
    Failed,
    Terminating,
}

impl ApplicationInstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationInstanceStatus::Pending => "Pending",
            ApplicationInstanceStatus::Ready => "Ready",
            ApplicationInstanceStatus::Failed => "Failed",
            ApplicationInstanceStatus::Terminating => "Terminating",
        }
    }
}

impl fmt::Display for ApplicationInstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationInstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match status_key(s).as_str() {
            "pending" => Ok(ApplicationInstanceStatus::Pending),
            "ready" => Ok(ApplicationInstanceStatus::Ready),
            "failed" => Ok(ApplicationInstanceStatus::Failed),
            "terminating" => Ok(ApplicationInstanceStatus::Terminating),
            _ => Err(format!("invalid application instance status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_normalization() {
        assert_eq!(
            "TEMPORARY_FAILURE".parse::<FederationStatus>().unwrap(),
            FederationStatus::TemporaryFailure
        );
        assert_eq!(
            "not-available".parse::<FederationStatus>().unwrap(),
            FederationStatus::NotAvailable
        );
        assert_eq!(
            "ONBOARDED".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Onboarded
        );
        assert_eq!(
            "Ready".parse::<ApplicationInstanceStatus>().unwrap(),
            ApplicationInstanceStatus::Ready
        );
    }

    #[test]
    fn test_status_rejects_unknown() {
        assert!("RUNNING".parse::<ApplicationStatus>().is_err());
        assert!("".parse::<FederationStatus>().is_err());
        assert!("gone".parse::<ApplicationInstanceStatus>().is_err());
    }

    #[test]
    fn test_status_canonical_casing() {
        assert_eq!(FederationStatus::TemporaryFailure.as_str(), "TemporaryFailure");
        assert_eq!(ApplicationStatus::Deboarding.to_string(), "Deboarding");
    }

    #[test]
    fn test_artefact_file_ids_flattened_in_order() {
        let artefact = UploadArtefact {
            artefact_id: "a1".to_string(),
            app_provider_id: "provider".to_string(),
            artefact_name: "name".to_string(),
            artefact_version_info: "1.0".to_string(),
            artefact_descriptor_type: "HELM".to_string(),
            artefact_virt_type: "VM_TYPE".to_string(),
            component_spec: vec![
                ComponentSpec {
                    component_name: "c1".to_string(),
                    images: vec!["f1".to_string(), "f2".to_string()],
                    ..Default::default()
                },
                ComponentSpec {
                    component_name: "c2".to_string(),
                    images: vec!["f3".to_string()],
                    ..Default::default()
                },
            ],
            artefact_file: None,
            federation_context_id: "ctx".to_string(),
        };
        assert_eq!(artefact.file_ids(), vec!["f1", "f2", "f3"]);
    }

    #[test]
    fn test_dto_serde_casing() {
        let component = AppComponentSpec {
            artefact_id: "a1".to_string(),
            component_name: Some("c1".to_string()),
            service_name_ew: None,
            service_name_nb: None,
        };
        let value = serde_json::to_value(&component).unwrap();
        assert_eq!(value["artefactId"], "a1");
        assert_eq!(value["componentName"], "c1");
    }
}

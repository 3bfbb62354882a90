//! File repository
//!
//! Files are image/binary descriptors with repository location metadata.
//! The uploaded binary itself is handed to the file-transfer collaborator;
//! only the descriptor is persisted here.

use serde::{Deserialize, Serialize};

use super::{decode_spec, encode_spec, MetaStore};
use crate::error::MetastoreError;
use crate::labels::{self, label, LabelKey};
use crate::models::{File, ObjectRepoLocation, OsType, UploadFile};
use crate::store::{ObjectKind, StoredObject};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct FileSpec {
    pub app_provider_id: String,
    pub file_name: String,
    pub file_version: String,
    pub file_type: String,
    pub repo: RepoSpec,
    pub image: ImageSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RepoSpec {
    #[serde(rename = "type")]
    pub repo_type: String,
    pub url: String,
    pub user_name: String,
    pub password: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ImageSpec {
    pub instruction_set_architecture: String,
    pub os: OsSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct OsSpec {
    pub architecture: String,
    pub distribution: String,
    pub license: String,
    pub version: String,
}

/// Build the persisted spec; the binary payload is deliberately absent
fn file_spec(input: &UploadFile) -> FileSpec {
    let location = input.file_repo_location.clone().unwrap_or_default();
    FileSpec {
        app_provider_id: input.app_provider_id.clone(),
        file_name: input.file_name.clone(),
        file_version: input.file_version_info.clone(),
        file_type: input.file_type.clone(),
        repo: RepoSpec {
            repo_type: input.repo_type.clone().unwrap_or_default(),
            url: location.repo_url.unwrap_or_default(),
            user_name: location.user_name.unwrap_or_default(),
            password: location.password.unwrap_or_default(),
            token: location.token.unwrap_or_default(),
        },
        image: ImageSpec {
            instruction_set_architecture: input.img_ins_set_arch.clone(),
            os: OsSpec {
                architecture: input.img_os_type.architecture.clone(),
                distribution: input.img_os_type.distribution.clone(),
                license: input.img_os_type.license.clone(),
                version: input.img_os_type.version.clone(),
            },
        },
    }
}

fn file_from_object(object: &StoredObject) -> Result<File, MetastoreError> {
    let spec: FileSpec = decode_spec(object)?;
    Ok(File {
        file_id: object
            .labels
            .get(&label(LabelKey::Id))
            .cloned()
            .unwrap_or_default(),
        app_provider_id: spec.app_provider_id,
        file_name: spec.file_name,
        file_version_info: spec.file_version,
        file_type: spec.file_type,
        repo_type: Some(spec.repo.repo_type),
        file_repo_location: Some(ObjectRepoLocation {
            repo_url: Some(spec.repo.url),
            user_name: Some(spec.repo.user_name),
            password: Some(spec.repo.password),
            token: Some(spec.repo.token),
        }),
        img_ins_set_arch: spec.image.instruction_set_architecture,
        img_os_type: OsType {
            architecture: spec.image.os.architecture,
            distribution: spec.image.os.distribution,
            license: spec.image.os.license,
            version: spec.image.os.version,
        },
        federation_context_id: object
            .labels
            .get(&label(LabelKey::FederationContextId))
            .cloned()
            .unwrap_or_default(),
    })
}

impl MetaStore {
    /// Upload a file descriptor into a federation scope
    pub async fn upload_file(&self, input: &UploadFile) -> Result<(), MetastoreError> {
        let owner = self.owner_reference(&input.federation_context_id).await?;
        let object = StoredObject {
            kind: ObjectKind::File,
            name: labels::object_name(
                ObjectKind::File,
                &input.federation_context_id,
                &input.file_id,
            ),
            namespace: self.namespace().to_string(),
            labels: labels::host_labels(&input.federation_context_id, &input.file_id),
            owner: Some(owner),
            spec: encode_spec(&file_spec(input))?,
            status: None,
        };
        self.create_object(object).await
    }

    pub async fn get_file(
        &self,
        federation_context_id: &str,
        id: &str,
    ) -> Result<File, MetastoreError> {
        let object = self
            .get_host_object(ObjectKind::File, federation_context_id, id)
            .await?;
        file_from_object(&object)
    }

    pub async fn remove_file(
        &self,
        federation_context_id: &str,
        id: &str,
    ) -> Result<(), MetastoreError> {
        let name = labels::object_name(ObjectKind::File, federation_context_id, id);
        self.delete_object(ObjectKind::File, &name).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::metastore::testutil::{metastore, seed_federation, NAMESPACE};
    use crate::store::ObjectStore;

    pub(crate) fn upload_input(context_id: &str, file_id: &str) -> UploadFile {
        UploadFile {
            file_id: file_id.to_string(),
            app_provider_id: "provider-1".to_string(),
            file_name: "app-image".to_string(),
            file_version_info: "1.0".to_string(),
            file_type: "QCOW2".to_string(),
            repo_type: Some("PRIVATEREPO".to_string()),
            file_repo_location: Some(ObjectRepoLocation {
                repo_url: Some("https://registry.example/app".to_string()),
                user_name: Some("robot".to_string()),
                password: None,
                token: None,
            }),
            img_ins_set_arch: "ISA_X86_64".to_string(),
            img_os_type: OsType {
                architecture: "x86_64".to_string(),
                distribution: "UBUNTU".to_string(),
                license: "OS_LICENSE_TYPE_FREE".to_string(),
                version: "OS_VERSION_UBUNTU_2204_LTS".to_string(),
            },
            file: Some(vec![1, 2, 3]),
            federation_context_id: context_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_upload_and_get_defaults() {
        let (store, meta) = metastore();
        seed_federation(&store, "acme", "ctx-1").await;

        meta.upload_file(&upload_input("ctx-1", "f1")).await.unwrap();

        let file = meta.get_file("ctx-1", "f1").await.unwrap();
        assert_eq!(file.file_id, "f1");
        assert_eq!(file.file_name, "app-image");
        assert_eq!(file.federation_context_id, "ctx-1");
        let location = file.file_repo_location.unwrap();
        assert_eq!(
            location.repo_url.as_deref(),
            Some("https://registry.example/app")
        );
        // absent optionals persisted as zero values, returned non-null
        assert_eq!(location.password.as_deref(), Some(""));
        assert_eq!(location.token.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_upload_strips_binary_payload() {
        let (store, meta) = metastore();
        seed_federation(&store, "acme", "ctx-1").await;

        meta.upload_file(&upload_input("ctx-1", "f1")).await.unwrap();

        let name = labels::object_name(ObjectKind::File, "ctx-1", "f1");
        let object = store.get(ObjectKind::File, NAMESPACE, &name).await.unwrap();
        assert!(object.spec.get("file").is_none());
    }

    #[tokio::test]
    async fn test_upload_without_federation() {
        let (_store, meta) = metastore();
        let err = meta
            .upload_file(&upload_input("ctx-none", "f1"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_remove_file_missing() {
        let (store, meta) = metastore();
        seed_federation(&store, "acme", "ctx-1").await;
        let err = meta.remove_file("ctx-1", "f1").await.unwrap_err();
        assert!(err.is_not_found());
    }
}

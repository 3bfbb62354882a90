//! Client credential lookup
//!
//! Every client known to the operator is represented by a Federation object
//! labeled with its credential. Resolving a client id returns the guest
//! partner credentials recorded in that federation's spec, so inbound
//! callers can be matched to their callback identity.

use super::{decode_spec, MetaStore};
use crate::error::MetastoreError;
use crate::labels;
use crate::metastore::federation::FederationSpec;
use crate::models::ClientCredentials;
use crate::store::ObjectKind;

impl MetaStore {
    pub async fn get_client_credentials(
        &self,
        client_id: &str,
    ) -> Result<ClientCredentials, MetastoreError> {
        let object = self
            .search_object(ObjectKind::Federation, &labels::client_selector(client_id))
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    MetastoreError::NotFound {
                        detail: "unknown client id".to_string(),
                    }
                } else {
                    err
                }
            })?;
        let spec: FederationSpec = decode_spec(&object)?;
        Ok(ClientCredentials {
            client_id: spec.guest_partner_credentials.client_id,
        })
    }
}

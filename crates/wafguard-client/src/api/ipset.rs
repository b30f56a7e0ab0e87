//! IP set API endpoints.

use crate::WafClient;
use tracing::debug;
use wafguard_core::{
    GetIpSetResponse, GuardError, IpSetRef, IpSetSnapshot, Result, Scope, UpdateIpSetRequest,
    UpdateIpSetResponse,
};

/// IP set API endpoints
pub struct IpSetApi<'a> {
    client: &'a WafClient,
}

impl<'a> IpSetApi<'a> {
    pub(crate) const fn new(client: &'a WafClient) -> Self {
        Self { client }
    }

    /// Fetch a set's addresses together with its current lock token
    pub async fn get(&self, scope: Scope, set: &IpSetRef) -> Result<IpSetSnapshot> {
        let response: GetIpSetResponse = self
            .client
            .get(&["ipsets", scope.as_str(), set.name.as_str(), set.id.as_str()], &[])
            .await?;

        debug!(
            set = %set.name,
            addresses = response.ip_set.addresses.len(),
            "fetched IP set"
        );
        Ok(response.into())
    }

    /// Replace a set's addresses under `lock_token`, returning the next token
    pub async fn update(
        &self,
        scope: Scope,
        set: &IpSetRef,
        addresses: Vec<String>,
        lock_token: impl Into<String>,
    ) -> Result<String> {
        let request = UpdateIpSetRequest {
            addresses,
            lock_token: lock_token.into(),
        };

        let response: UpdateIpSetResponse = self
            .client
            .put(&["ipsets", scope.as_str(), set.name.as_str(), set.id.as_str()], &request)
            .await
            .map_err(|e| match e {
                GuardError::TokenMismatch { .. } => GuardError::TokenMismatch {
                    set: set.name.clone(),
                },
                other => other,
            })?;

        Ok(response.next_lock_token)
    }
}

//! Set admission: merge an observed address into its family's IP set.
//!
//! One admission is one fetch-merge-update pass under the lock token from the
//! fetch. If another writer (a concurrent admission, or the expiry reaper)
//! got in between, the update is rejected and the whole pass fails with
//! [`GuardError::Conflict`]; the caller re-runs it from the fetch.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use wafguard_client::SetStore;
use wafguard_core::{AddressFamily, FamilySets, GuardError, IpSetRef, ObservedAddress, Result, Scope};

use crate::telemetry::{NoopTelemetry, UsageTelemetry};

/// Outcome of a successful admission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationResult {
    /// Family of the admitted address
    pub family: AddressFamily,
    /// Set that was updated
    pub set: IpSetRef,
    /// Host network that was admitted
    pub network: String,
    /// Full address list written to the set
    pub addresses: Vec<String>,
    /// Lock token after the update
    pub lock_token: String,
    /// False when the network was already present
    pub inserted: bool,
}

/// Admits observed addresses into the v4 or v6 set
pub struct AdmissionController {
    store: Arc<dyn SetStore>,
    telemetry: Arc<dyn UsageTelemetry>,
}

impl AdmissionController {
    /// Controller without usage reporting
    pub fn new(store: Arc<dyn SetStore>) -> Self {
        Self {
            store,
            telemetry: Arc::new(NoopTelemetry),
        }
    }

    /// Report usage after each successful admission
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn UsageTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Parse `raw` and admit it
    pub async fn admit_literal(
        &self,
        scope: Scope,
        raw: &str,
        sets: &FamilySets,
    ) -> Result<MutationResult> {
        let address = ObservedAddress::parse(raw)?;
        self.admit(scope, address, sets).await
    }

    /// Admit `address` into the set matching its family.
    ///
    /// The update is issued even when the address is already present, so a
    /// successful call always leaves the set with a fresh lock token.
    #[instrument(skip_all, fields(scope = %scope, address = %address))]
    pub async fn admit(
        &self,
        scope: Scope,
        address: ObservedAddress,
        sets: &FamilySets,
    ) -> Result<MutationResult> {
        let family = address.family();
        let set = sets.for_family(family);
        let network = address.network();

        let snapshot = self.store.get_ip_set(scope, set).await?;
        let (addresses, inserted) = merge_network(&snapshot.addresses, &network);

        let lock_token = self
            .store
            .update_ip_set(scope, set, &addresses, &snapshot.lock_token)
            .await
            .map_err(|e| match e {
                GuardError::TokenMismatch { set } => GuardError::Conflict { set },
                other => other,
            })?;

        info!(
            set = %set.name,
            %family,
            inserted,
            size = addresses.len(),
            "IP set updated"
        );

        if let Err(e) = self.telemetry.report(scope, sets).await {
            warn!(error = %e, "usage report failed");
        }

        Ok(MutationResult {
            family,
            set: set.clone(),
            network,
            addresses,
            lock_token,
            inserted,
        })
    }
}

/// Set union of `current` and `network`, in sorted order. The flag is false
/// when `network` was already present.
pub fn merge_network(current: &[String], network: &str) -> (Vec<String>, bool) {
    let mut merged: BTreeSet<&str> = current.iter().map(String::as_str).collect();
    let inserted = merged.insert(network);
    (merged.into_iter().map(String::from).collect(), inserted)
}

//! Invocation entry points.
//!
//! Each handler is built once per process from [`GuardConfig`] and then
//! driven with one event per invocation.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, instrument};
use wafguard_client::api::TableLedger;
use wafguard_client::{RetentionLedger, SetStore, WafClient};
use wafguard_core::{AccessEvent, FamilySets, GuardError, MutationEnvelope, Result, Scope};

use crate::admission::AdmissionController;
use crate::config::GuardConfig;
use crate::retention::{RecordOutcome, RetentionRecorder};
use crate::source::source_address;
use crate::telemetry::UsageReporter;

/// Response returned to the caller of the access endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    /// HTTP status, always 200 on success
    pub status_code: u16,
    /// Response headers
    pub headers: BTreeMap<String, String>,
    /// Acknowledgement naming the admitted address
    pub body: String,
}

impl AccessResponse {
    /// The fixed acknowledgement for a recorded visit
    #[must_use]
    pub fn thanks(ip: &str) -> Self {
        Self {
            status_code: 200,
            headers: BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())]),
            body: format!("message: [{ip}] Thanks for the visit."),
        }
    }
}

/// Admits the source of every request that reaches the access endpoint
pub struct AccessHandler {
    controller: AdmissionController,
    scope: Scope,
    sets: FamilySets,
}

impl AccessHandler {
    /// Handler admitting into `sets` within `scope`
    pub const fn new(controller: AdmissionController, scope: Scope, sets: FamilySets) -> Self {
        Self {
            controller,
            scope,
            sets,
        }
    }

    /// Wire a handler to the HTTP store described by `config`
    pub fn from_config(config: &GuardConfig) -> Result<Self> {
        let sets = config.require_admission_sets()?.clone();

        let mut builder = WafClient::builder(config.require_store_url()?);
        if let Some(url) = &config.telemetry.usage_url {
            builder = builder.usage_url(url.as_str());
        }
        let client = builder.build()?;
        let store: Arc<dyn SetStore> = Arc::new(client.clone());

        let mut controller = AdmissionController::new(store.clone());
        if config.telemetry.enabled {
            let client = Arc::new(client);
            controller = controller.with_telemetry(Arc::new(UsageReporter::new(
                store,
                client.clone(),
                client,
                &config.telemetry,
            )));
        }

        Ok(Self::new(controller, config.scope, sets))
    }

    /// Handle one request event
    #[instrument(skip_all)]
    pub async fn handle(&self, event: &AccessEvent) -> Result<AccessResponse> {
        match self.admit_source(event).await {
            Ok(ip) => Ok(AccessResponse::thanks(&ip)),
            Err(e) => {
                error!(error = %e, kind = ?e.kind(), "admission failed");
                Err(e)
            }
        }
    }

    async fn admit_source(&self, event: &AccessEvent) -> Result<String> {
        let address = source_address(event)?;
        let ip = address.to_string();
        self.controller.admit(self.scope, address, &self.sets).await?;
        Ok(ip)
    }
}

/// Records retention for every set-mutation notification
pub struct RetentionHandler {
    recorder: RetentionRecorder,
}

impl RetentionHandler {
    /// Handler driving `recorder`
    pub const fn new(recorder: RetentionRecorder) -> Self {
        Self { recorder }
    }

    /// Wire a handler to the HTTP ledger described by `config`
    pub fn from_config(config: &GuardConfig) -> Result<Self> {
        let table = config
            .retention
            .table_name
            .as_deref()
            .ok_or_else(|| GuardError::Config("no retention table configured".to_string()))?;
        let client = WafClient::new(config.require_store_url()?)?;
        let ledger: Arc<dyn RetentionLedger> = Arc::new(TableLedger::new(client, table));

        Ok(Self::new(RetentionRecorder::new(ledger, config.retention.clone())))
    }

    /// Handle one mutation notification
    #[instrument(skip_all)]
    pub async fn handle(&self, envelope: &MutationEnvelope) -> Result<RecordOutcome> {
        self.recorder.record(&envelope.detail).await.map_err(|e| {
            error!(error = %e, kind = ?e.kind(), "retention recording failed");
            e
        })
    }
}

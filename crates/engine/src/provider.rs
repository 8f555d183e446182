//! Collaborator interfaces: the metrics source and the remediation sink.
//! Platform-specific clients (Google, Meta) implement these outside the
//! engine.

use adpulse_core::{EngineResult, EntityKind, EntityRef, MetricRecord};
use async_trait::async_trait;

/// Record selection passed through to the provider.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Restrict to a single campaign and its children.
    pub campaign_id: Option<String>,
    /// Drop entities below this many impressions at the source.
    pub min_impressions: Option<u64>,
}

/// Source of campaign/ad-group/keyword metrics. A fetch failure is fatal to
/// the analysis pass: the engine must distinguish "no campaigns" (empty Ok)
/// from "fetch failed" (Err).
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    async fn get_records(
        &self,
        customer_id: &str,
        entity_kind: EntityKind,
        filter: &RecordFilter,
    ) -> EngineResult<Vec<MetricRecord>>;
}

/// Applies an approved action back to the ad platform. Returns `Ok(false)`
/// when the platform declines the action without erroring.
#[async_trait]
pub trait RemediationExecutor: Send + Sync {
    async fn apply(
        &self,
        action_type: &str,
        action_data: Option<&serde_json::Value>,
        entity_ref: Option<&EntityRef>,
    ) -> EngineResult<bool>;
}

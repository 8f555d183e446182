//! Public engine surface: run an analysis pass, apply remediations.

use crate::aggregator;
use crate::provider::{MetricsProvider, RecordFilter, RemediationExecutor};
use crate::remediation::{RemediationCoordinator, RemediationResult};
use adpulse_advisor::{AdvisorBridge, AdvisorContext};
use adpulse_core::{EngineConfig, EngineResult, EntityKind, Insight, MetricRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Which entity levels a pass fetches and analyzes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisScope {
    Campaigns,
    Keywords,
    /// Campaigns and keywords together.
    Full,
}

/// Ranked output of one analysis pass.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub pass_id: Uuid,
    pub customer_id: String,
    pub generated_at: DateTime<Utc>,
    pub insights: Vec<Insight>,
}

/// The insight generation and prioritization engine. All collaborators are
/// injected at construction; nothing is read from ambient process state.
pub struct InsightEngine<P> {
    provider: P,
    bridge: AdvisorBridge,
    config: EngineConfig,
    remediation: RemediationCoordinator,
}

impl<P: MetricsProvider> InsightEngine<P> {
    pub fn new(provider: P, bridge: AdvisorBridge, config: EngineConfig) -> Self {
        Self {
            provider,
            bridge,
            config,
            remediation: RemediationCoordinator::new(),
        }
    }

    /// Run one analysis pass: fetch fresh records, fan out to the rule-based
    /// analyzers while the advisor call is in flight, fan in, aggregate.
    ///
    /// A provider failure propagates. An advisor failure or timeout degrades
    /// to rule-based results only and is invisible to the caller.
    pub async fn analyze(
        &self,
        customer_id: &str,
        scope: AnalysisScope,
    ) -> EngineResult<AnalysisReport> {
        let records = self.fetch_records(customer_id, scope).await?;
        for record in &records {
            record.validate()?;
        }

        let advisor_batch = async {
            if !self.config.advisor.enabled || !self.bridge.is_enabled() {
                return Vec::new();
            }
            let context = AdvisorContext::from_records(customer_id, &records);
            let deadline = Duration::from_millis(self.config.advisor.timeout_ms);
            match tokio::time::timeout(deadline, self.bridge.enrich(&records, &context)).await {
                Ok(batch) => batch,
                Err(_) => {
                    warn!(customer_id, "advisor call timed out; proceeding with rule-based insights");
                    metrics::counter!("engine.advisor_timeouts").increment(1);
                    Vec::new()
                }
            }
        };

        // The rule-based analyzers are pure and CPU-cheap; they run on this
        // task while the advisor request is in flight.
        let rule_batches = async {
            let thresholds = adpulse_analysis::threshold::analyze(&records, &self.config.thresholds);
            let anomalies = adpulse_analysis::anomaly::detect(&records);
            let keywords = adpulse_analysis::keyword::analyze_keywords(&records);
            (thresholds, anomalies, keywords)
        };

        let ((thresholds, anomalies, keywords), enrichment) =
            tokio::join!(rule_batches, advisor_batch);

        let insights = aggregator::aggregate(
            vec![thresholds, anomalies, keywords, enrichment],
            self.config.max_results,
        );

        metrics::counter!("engine.passes").increment(1);
        metrics::counter!("engine.insights_generated").increment(insights.len() as u64);
        info!(
            customer_id,
            records = records.len(),
            insights = insights.len(),
            "analysis pass complete"
        );

        Ok(AnalysisReport {
            pass_id: Uuid::new_v4(),
            customer_id: customer_id.to_string(),
            generated_at: Utc::now(),
            insights,
        })
    }

    /// Apply a single actionable insight through the executor. Failures are
    /// returned in the result, never raised.
    pub async fn apply_remediation<E>(&self, insight: &Insight, executor: &E) -> RemediationResult
    where
        E: RemediationExecutor + ?Sized,
    {
        self.remediation.apply(insight, executor).await
    }

    /// Auto-apply eligible insights from a report, at most `max_actions`,
    /// sequentially with independent per-action outcomes.
    pub async fn auto_apply<E>(
        &self,
        report: &AnalysisReport,
        executor: &E,
        max_actions: Option<usize>,
    ) -> Vec<RemediationResult>
    where
        E: RemediationExecutor + ?Sized,
    {
        self.remediation
            .apply_batch(&report.insights, executor, max_actions)
            .await
    }

    /// The remediation coordinator, for callers that track action state.
    pub fn remediation(&self) -> &RemediationCoordinator {
        &self.remediation
    }

    async fn fetch_records(
        &self,
        customer_id: &str,
        scope: AnalysisScope,
    ) -> EngineResult<Vec<MetricRecord>> {
        let filter = RecordFilter::default();
        let mut records = Vec::new();

        if matches!(scope, AnalysisScope::Campaigns | AnalysisScope::Full) {
            records.extend(
                self.provider
                    .get_records(customer_id, EntityKind::Campaign, &filter)
                    .await?,
            );
        }
        if matches!(scope, AnalysisScope::Keywords | AnalysisScope::Full) {
            records.extend(
                self.provider
                    .get_records(customer_id, EntityKind::Keyword, &filter)
                    .await?,
            );
        }

        Ok(records)
    }
}

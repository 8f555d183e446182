use crate::client::{AdvisorClient, AdvisorContext, RawCandidateInsight};
use adpulse_core::{EntityKind, EntityRef, Impact, Insight, InsightKind, MetricRecord};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default action name for candidates that do not carry one.
const DEFAULT_ACTION: &str = "optimize";

/// Failure-tolerant wrapper around an optional [`AdvisorClient`].
///
/// Built with either a present or absent client so that call sites stay
/// branch-free: an absent client short-circuits `enrich` to an empty batch
/// without attempting a call.
pub struct AdvisorBridge {
    client: Option<Arc<dyn AdvisorClient>>,
}

impl AdvisorBridge {
    pub fn new(client: Option<Arc<dyn AdvisorClient>>) -> Self {
        Self { client }
    }

    /// Bridge with no advisor configured.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Ask the advisor for candidate insights, coerce them into trusted
    /// [`Insight`] values, and swallow any failure. One call per analysis
    /// pass; retries belong to the client, not this layer.
    pub async fn enrich(&self, records: &[MetricRecord], context: &AdvisorContext) -> Vec<Insight> {
        let Some(client) = &self.client else {
            return Vec::new();
        };

        match client.suggest(context).await {
            Ok(candidates) => {
                debug!(count = candidates.len(), "advisor returned candidates");
                coerce_candidates(candidates, records)
            }
            Err(e) => {
                warn!(error = %e, "advisor enrichment failed, continuing with rule-based insights only");
                Vec::new()
            }
        }
    }
}

/// Validate and coerce untrusted advisor output. The advisor is trusted for
/// content, not for urgency: kind and priority are forced, impact falls back
/// to medium, confidence is clamped, and campaign names are resolved to ids
/// against the pass records (unresolvable names keep the insight with no
/// entity reference).
fn coerce_candidates(
    candidates: Vec<RawCandidateInsight>,
    records: &[MetricRecord],
) -> Vec<Insight> {
    let ids_by_name: HashMap<&str, &str> = records
        .iter()
        .filter(|r| r.entity_kind == EntityKind::Campaign)
        .map(|r| (r.entity_name.as_str(), r.entity_id.as_str()))
        .collect();

    candidates
        .into_iter()
        .enumerate()
        .map(|(seq, candidate)| {
            let entity_ref = candidate
                .campaign_name
                .as_deref()
                .and_then(|name| ids_by_name.get(name))
                .map(|id| EntityRef::campaign(*id));
            let action_type = candidate
                .action_type
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ACTION.to_string());
            let confidence = candidate.confidence.unwrap_or(0.7).clamp(0.0, 1.0);

            Insight {
                id: Insight::make_id(
                    InsightKind::Recommendation,
                    "advisor",
                    entity_ref.as_ref(),
                    Some(&action_type),
                    seq as u32,
                ),
                kind: InsightKind::Recommendation,
                title: candidate
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| "AI Recommendation".to_string()),
                description: candidate.description.unwrap_or_default(),
                impact: candidate
                    .impact
                    .as_deref()
                    .map(Impact::parse_lenient)
                    .unwrap_or(Impact::Medium),
                confidence,
                entity_ref,
                actionable: true,
                action_type: Some(action_type),
                action_data: None,
                created_at: Utc::now(),
                priority: 2,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

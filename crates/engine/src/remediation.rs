//! Bounded auto-apply workflow for actionable insights.

use crate::provider::RemediationExecutor;
use adpulse_core::types::action;
use adpulse_core::Insight;
use dashmap::DashMap;
use serde::Serialize;
use tracing::{info, warn};

/// Lifecycle of one remediation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationState {
    Pending,
    Applying,
    Applied,
    Failed,
}

/// Per-action outcome. Executor failures are captured here, never raised.
#[derive(Debug, Clone, Serialize)]
pub struct RemediationResult {
    pub insight_id: String,
    pub success: bool,
    pub actions_taken: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemediationResult {
    fn failure(insight_id: &str, error: impl Into<String>) -> Self {
        Self {
            insight_id: insight_id.to_string(),
            success: false,
            actions_taken: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Thin state machine around the executor: `pending -> applying -> applied`
/// on success, `-> failed` on error. Exactly one executor attempt per
/// insight per call; callers needing retry must re-invoke with a fresh
/// insight snapshot so they never act twice on stale data.
pub struct RemediationCoordinator {
    states: DashMap<String, RemediationState>,
}

impl RemediationCoordinator {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    /// Last observed state for an insight, if it was ever submitted.
    pub fn state(&self, insight_id: &str) -> Option<RemediationState> {
        self.states.get(insight_id).map(|s| *s)
    }

    /// Apply one insight. Ineligible insights (not actionable, or missing an
    /// action type) fail fast without touching the executor.
    pub async fn apply<E>(&self, insight: &Insight, executor: &E) -> RemediationResult
    where
        E: RemediationExecutor + ?Sized,
    {
        let Some(action_type) = insight.action_type.as_deref().filter(|_| insight.actionable)
        else {
            return RemediationResult::failure(&insight.id, "insight is not actionable");
        };

        self.states
            .insert(insight.id.clone(), RemediationState::Applying);

        let outcome = executor
            .apply(
                action_type,
                insight.action_data.as_ref(),
                insight.entity_ref.as_ref(),
            )
            .await;

        match outcome {
            Ok(true) => {
                self.states
                    .insert(insight.id.clone(), RemediationState::Applied);
                let summary = action_summary(insight, action_type);
                info!(insight_id = %insight.id, action = action_type, "remediation applied");
                RemediationResult {
                    insight_id: insight.id.clone(),
                    success: true,
                    actions_taken: vec![summary],
                    error: None,
                }
            }
            Ok(false) => {
                self.states
                    .insert(insight.id.clone(), RemediationState::Failed);
                warn!(insight_id = %insight.id, action = action_type, "executor declined action");
                RemediationResult::failure(&insight.id, "executor declined the action")
            }
            Err(e) => {
                self.states
                    .insert(insight.id.clone(), RemediationState::Failed);
                warn!(insight_id = %insight.id, action = action_type, error = %e, "remediation failed");
                RemediationResult::failure(&insight.id, e.to_string())
            }
        }
    }

    /// Apply a batch of insights sequentially with independent result
    /// capture: one failure never aborts the rest. Remediations mutate live
    /// platform state, so same-entity actions must not race.
    pub async fn apply_batch<E>(
        &self,
        insights: &[Insight],
        executor: &E,
        max_actions: Option<usize>,
    ) -> Vec<RemediationResult>
    where
        E: RemediationExecutor + ?Sized,
    {
        let limit = max_actions.unwrap_or(usize::MAX);
        let mut results = Vec::new();

        for insight in insights
            .iter()
            .filter(|i| i.actionable && i.action_type.is_some())
            .take(limit)
        {
            results.push(self.apply(insight, executor).await);
        }

        results
    }
}

impl Default for RemediationCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable summary of what was done, e.g. budget old -> new.
fn action_summary(insight: &Insight, action_type: &str) -> String {
    let data = insight.action_data.as_ref();
    match action_type {
        action::INCREASE_BUDGET => {
            let current = data
                .and_then(|d| d["current_budget"].as_f64())
                .unwrap_or(0.0);
            let increase = data
                .and_then(|d| d["suggested_increase"].as_f64())
                .unwrap_or(0.0);
            format!(
                "increased budget {:.2} -> {:.2}",
                current,
                current + increase
            )
        }
        action::PAUSE_KEYWORD => {
            let text = data
                .and_then(|d| d["keyword_text"].as_str())
                .unwrap_or("keyword");
            format!("paused keyword '{}'", text)
        }
        action::INCREASE_BID => {
            let current = data.and_then(|d| d["current_bid"].as_f64()).unwrap_or(0.0);
            let increase = data
                .and_then(|d| d["suggested_increase"].as_f64())
                .unwrap_or(0.0);
            format!("raised bid {:.2} -> {:.2}", current, current + increase)
        }
        other => format!("applied {}", other),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Rule-based budget and performance checks against configured thresholds.

use adpulse_core::types::action;
use adpulse_core::{EntityKind, Impact, Insight, InsightKind, MetricRecord, ThresholdConfig};
use chrono::Utc;
use serde_json::json;
use tracing::debug;

/// Run every threshold rule over the records. Multiple checks may fire for
/// the same record; there is no early exit. Pure function, no I/O.
pub fn analyze(records: &[MetricRecord], thresholds: &ThresholdConfig) -> Vec<Insight> {
    let mut insights = Vec::new();

    for record in records {
        if record.entity_kind == EntityKind::Campaign && record.budget_amount > 0.0 {
            check_budget_utilization(record, thresholds, &mut insights);
        }
        if record.clicks > 0 || record.impressions > 0 {
            check_performance(record, thresholds, &mut insights);
        }
    }

    debug!(
        records = records.len(),
        insights = insights.len(),
        "threshold analysis complete"
    );
    insights
}

fn check_budget_utilization(
    record: &MetricRecord,
    thresholds: &ThresholdConfig,
    insights: &mut Vec<Insight>,
) {
    let utilization = record.cost / record.budget_amount;
    let entity = record.entity_ref();

    if utilization > thresholds.budget_utilization_high {
        let severe = utilization > 0.95;
        insights.push(Insight {
            id: Insight::make_id(
                InsightKind::BudgetAlert,
                "budget_high",
                Some(&entity),
                Some(action::INCREASE_BUDGET),
                0,
            ),
            kind: InsightKind::BudgetAlert,
            title: format!("High Budget Utilization: {}", record.entity_name),
            description: format!(
                "Campaign has used {:.1}% of its budget. Consider increasing budget \
                 or monitoring closely to avoid early exhaustion.",
                utilization * 100.0
            ),
            impact: if severe { Impact::High } else { Impact::Medium },
            confidence: 0.9,
            entity_ref: Some(entity),
            actionable: true,
            action_type: Some(action::INCREASE_BUDGET.to_string()),
            action_data: Some(json!({
                "current_budget": record.budget_amount,
                "suggested_increase": record.budget_amount * 0.2,
            })),
            created_at: Utc::now(),
            priority: if severe { 1 } else { 2 },
        });
    } else if utilization < thresholds.budget_utilization_low {
        insights.push(Insight {
            id: Insight::make_id(
                InsightKind::Optimization,
                "budget_low",
                Some(&entity),
                Some(action::OPTIMIZE_TARGETING),
                0,
            ),
            kind: InsightKind::Optimization,
            title: format!("Low Budget Utilization: {}", record.entity_name),
            description: format!(
                "Campaign is only using {:.1}% of its budget. Consider increasing \
                 bids or expanding targeting.",
                utilization * 100.0
            ),
            impact: Impact::Medium,
            confidence: 0.8,
            entity_ref: Some(entity),
            actionable: true,
            action_type: Some(action::OPTIMIZE_TARGETING.to_string()),
            action_data: None,
            created_at: Utc::now(),
            priority: 3,
        });
    }
}

fn check_performance(
    record: &MetricRecord,
    thresholds: &ThresholdConfig,
    insights: &mut Vec<Insight>,
) {
    let entity = record.entity_ref();

    let ctr = record.ctr();
    if ctr > 0.0 && ctr < thresholds.low_ctr {
        insights.push(Insight {
            id: Insight::make_id(
                InsightKind::Optimization,
                "low_ctr",
                Some(&entity),
                Some(action::IMPROVE_ADS),
                0,
            ),
            kind: InsightKind::Optimization,
            title: format!("Low CTR Alert: {}", record.entity_name),
            description: format!(
                "CTR is {:.2}%, below the recommended threshold. Consider improving \
                 ad copy or refining targeting.",
                ctr * 100.0
            ),
            impact: Impact::High,
            confidence: 0.85,
            entity_ref: Some(entity.clone()),
            actionable: true,
            action_type: Some(action::IMPROVE_ADS.to_string()),
            action_data: None,
            created_at: Utc::now(),
            priority: 2,
        });
    }

    // Records with zero clicks are exempt from CPC and conversion checks.
    if record.clicks == 0 {
        return;
    }

    let cpc = record.cpc();
    if cpc > thresholds.high_cpc {
        insights.push(Insight {
            id: Insight::make_id(
                InsightKind::Optimization,
                "high_cpc",
                Some(&entity),
                Some(action::OPTIMIZE_BIDS),
                0,
            ),
            kind: InsightKind::Optimization,
            title: format!("High CPC Alert: {}", record.entity_name),
            description: format!(
                "CPC is ${:.2}. Consider optimizing bids or improving Quality Score.",
                cpc
            ),
            impact: Impact::Medium,
            confidence: 0.8,
            entity_ref: Some(entity.clone()),
            actionable: true,
            action_type: Some(action::OPTIMIZE_BIDS.to_string()),
            action_data: None,
            created_at: Utc::now(),
            priority: 3,
        });
    }

    let conversion_rate = record.conversion_rate();
    if conversion_rate > 0.0 && conversion_rate < thresholds.low_conversion_rate {
        insights.push(Insight {
            id: Insight::make_id(
                InsightKind::Optimization,
                "low_conversion",
                Some(&entity),
                Some(action::OPTIMIZE_LANDING_PAGE),
                0,
            ),
            kind: InsightKind::Optimization,
            title: format!("Low Conversion Rate: {}", record.entity_name),
            description: format!(
                "Conversion rate is {:.2}% with cost per conversion of ${:.2}. \
                 Consider landing page optimization.",
                conversion_rate * 100.0,
                record.cost_per_conversion()
            ),
            impact: Impact::High,
            confidence: 0.9,
            entity_ref: Some(entity),
            actionable: true,
            action_type: Some(action::OPTIMIZE_LANDING_PAGE.to_string()),
            action_data: None,
            created_at: Utc::now(),
            priority: 1,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

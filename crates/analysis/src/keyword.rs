//! Keyword-level performance rules.

use adpulse_core::types::action;
use adpulse_core::{EntityKind, Impact, Insight, InsightKind, MetricRecord};
use chrono::Utc;
use serde_json::json;
use tracing::debug;

/// Evaluate the keyword rules over keyword-scoped records. Rules are
/// independent: a keyword that is both click-heavy and expensive without
/// conversions emits two insights, which the aggregator later collapses by
/// cause.
pub fn analyze_keywords(records: &[MetricRecord]) -> Vec<Insight> {
    let mut insights = Vec::new();

    for record in records {
        if record.entity_kind != EntityKind::Keyword {
            continue;
        }
        let entity = record.entity_ref();

        // Clicks without conversions.
        if record.clicks > 10 && record.conversions == 0.0 {
            insights.push(Insight {
                id: Insight::make_id(
                    InsightKind::Keyword,
                    "keyword_no_conversions",
                    Some(&entity),
                    Some(action::PAUSE_KEYWORD),
                    0,
                ),
                kind: InsightKind::Keyword,
                title: format!("Poor Performing Keyword: {}", record.entity_name),
                description: format!(
                    "Keyword '{}' has {} clicks but no conversions. Consider pausing \
                     or lowering bids.",
                    record.entity_name, record.clicks
                ),
                impact: Impact::Medium,
                confidence: 0.8,
                entity_ref: Some(entity.clone()),
                actionable: true,
                action_type: Some(action::PAUSE_KEYWORD.to_string()),
                action_data: Some(json!({
                    "keyword_id": record.entity_id,
                    "keyword_text": record.entity_name,
                })),
                created_at: Utc::now(),
                priority: 3,
            });
        }

        // High spend without conversions. Severer than the click rule; both
        // may fire and share a cause key.
        if record.cost > 50.0 && record.conversions == 0.0 {
            insights.push(Insight {
                id: Insight::make_id(
                    InsightKind::Keyword,
                    "keyword_expensive",
                    Some(&entity),
                    Some(action::PAUSE_KEYWORD),
                    0,
                ),
                kind: InsightKind::Keyword,
                title: format!("Expensive Non-Converting Keyword: {}", record.entity_name),
                description: format!(
                    "Keyword '{}' has spent ${:.2} without conversions. Review and \
                     consider pausing.",
                    record.entity_name, record.cost
                ),
                impact: Impact::High,
                confidence: 0.9,
                entity_ref: Some(entity.clone()),
                actionable: true,
                action_type: Some(action::PAUSE_KEYWORD.to_string()),
                action_data: None,
                created_at: Utc::now(),
                priority: 1,
            });
        }

        // Strong performer: cheap conversions deserve a bigger bid.
        if record.conversions > 0.0 && record.cost / record.conversions < 10.0 {
            insights.push(Insight {
                id: Insight::make_id(
                    InsightKind::Keyword,
                    "keyword_strong",
                    Some(&entity),
                    Some(action::INCREASE_BID),
                    0,
                ),
                kind: InsightKind::Keyword,
                title: format!("High-Performing Keyword: {}", record.entity_name),
                description: format!(
                    "Keyword '{}' converts at ${:.2} per conversion. Consider \
                     increasing bids.",
                    record.entity_name,
                    record.cost_per_conversion()
                ),
                impact: Impact::Medium,
                confidence: 0.85,
                entity_ref: Some(entity),
                actionable: true,
                action_type: Some(action::INCREASE_BID.to_string()),
                action_data: Some(json!({
                    "keyword_id": record.entity_id,
                    "current_bid": record.cpc_bid,
                    // Absolute bid increment in account currency.
                    "suggested_increase": 0.2,
                })),
                created_at: Utc::now(),
                priority: 2,
            });
        }
    }

    debug!(insights = insights.len(), "keyword analysis complete");
    insights
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(id: &str, clicks: u64, cost: f64, conversions: f64) -> MetricRecord {
        MetricRecord {
            entity_id: id.to_string(),
            entity_name: format!("keyword {}", id),
            entity_kind: EntityKind::Keyword,
            campaign_id: Some("c-1".to_string()),
            ad_group_id: Some(format!("ag-{}", id)),
            impressions: clicks * 20,
            clicks,
            cost,
            conversions,
            budget_amount: 0.0,
            cpc_bid: 1.5,
        }
    }

    // 1. Pause rules --------------------------------------------------------

    #[test]
    fn test_clicks_without_conversions_fires_single_pause() {
        // 15 clicks, $10 spend: only the click-based rule fires.
        let insights = analyze_keywords(&[keyword("kw-1", 15, 10.0, 0.0)]);

        assert_eq!(insights.len(), 1);
        let insight = &insights[0];
        assert_eq!(insight.kind, InsightKind::Keyword);
        assert_eq!(insight.impact, Impact::Medium);
        assert_eq!(insight.priority, 3);
        assert_eq!(insight.action_type.as_deref(), Some(action::PAUSE_KEYWORD));
    }

    #[test]
    fn test_expensive_keyword_fires_both_pause_rules() {
        // 20 clicks and $80 spend with no conversions: both rules fire with
        // the same cause key; dedup happens later in the aggregator.
        let insights = analyze_keywords(&[keyword("kw-1", 20, 80.0, 0.0)]);

        assert_eq!(insights.len(), 2);
        assert!(insights.iter().any(|i| i.priority == 3));
        assert!(insights.iter().any(|i| i.priority == 1 && i.impact == Impact::High));
        assert_eq!(insights[0].cause_key(), insights[1].cause_key());
    }

    #[test]
    fn test_expensive_rule_fires_alone_with_few_clicks() {
        // 5 clicks but $60 spend: only the cost-based rule.
        let insights = analyze_keywords(&[keyword("kw-1", 5, 60.0, 0.0)]);

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].priority, 1);
        assert!((insights[0].confidence - 0.9).abs() < f64::EPSILON);
    }

    // 2. Bid increase rule --------------------------------------------------

    #[test]
    fn test_cheap_conversions_suggest_bid_increase() {
        // $40 for 5 conversions = $8 per conversion.
        let insights = analyze_keywords(&[keyword("kw-1", 50, 40.0, 5.0)]);

        assert_eq!(insights.len(), 1);
        let insight = &insights[0];
        assert_eq!(insight.priority, 2);
        assert!((insight.confidence - 0.85).abs() < f64::EPSILON);
        assert_eq!(insight.action_type.as_deref(), Some(action::INCREASE_BID));

        let data = insight.action_data.as_ref().unwrap();
        assert!((data["current_bid"].as_f64().unwrap() - 1.5).abs() < f64::EPSILON);
        assert!((data["suggested_increase"].as_f64().unwrap() - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_expensive_conversions_do_not_suggest_bid_increase() {
        // $120 for 5 conversions = $24 per conversion.
        assert!(analyze_keywords(&[keyword("kw-1", 50, 120.0, 5.0)]).is_empty());
    }

    // 3. Scoping ------------------------------------------------------------

    #[test]
    fn test_non_keyword_records_ignored() {
        let mut record = keyword("c-1", 100, 500.0, 0.0);
        record.entity_kind = EntityKind::Campaign;
        record.ad_group_id = None;
        assert!(analyze_keywords(&[record]).is_empty());
    }

    #[test]
    fn test_keyword_insights_carry_ad_group_id() {
        for insight in analyze_keywords(&[keyword("kw-7", 15, 80.0, 0.0)]) {
            let entity = insight.entity_ref.as_ref().unwrap();
            assert!(entity.ad_group_id.is_some());
        }
    }
}

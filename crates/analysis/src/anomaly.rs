//! Cross-campaign statistical outlier detection using the IQR method.

use crate::stats;
use adpulse_core::{Impact, Insight, InsightKind, MetricRecord};
use chrono::Utc;
use tracing::debug;

/// Derived metrics examined for outliers. Conversion-rate outliers are
/// computed but not surfaced: low conversion rate is already covered by the
/// threshold rules, and an unusually *high* one is not a problem.
const METRICS: [(&str, fn(&MetricRecord) -> f64); 3] = [
    ("ctr", MetricRecord::ctr),
    ("cpc", MetricRecord::cpc),
    ("conversion_rate", MetricRecord::conversion_rate),
];

/// Flag records whose ctr/cpc fall outside the 1.5×IQR fences of the
/// population. Requires at least two records with nonzero impressions;
/// smaller populations yield no insights. A record may be an outlier on
/// several metrics at once, producing one insight per metric.
pub fn detect(records: &[MetricRecord]) -> Vec<Insight> {
    let population: Vec<&MetricRecord> = records.iter().filter(|r| r.impressions > 0).collect();
    if population.len() < 2 {
        return Vec::new();
    }

    let mut insights = Vec::new();

    for (metric, extract) in METRICS {
        let values: Vec<f64> = population.iter().map(|r| extract(r)).collect();
        if values.iter().all(|v| (v - values[0]).abs() < f64::EPSILON) {
            continue;
        }
        let Some((lower, upper)) = stats::iqr_bounds(&values) else {
            continue;
        };

        for (record, value) in population.iter().zip(&values) {
            match metric {
                "ctr" if *value < lower => {
                    insights.push(anomaly_insight(
                        record,
                        "anomaly_ctr",
                        format!("Unusually Low CTR: {}", record.entity_name),
                        format!(
                            "CTR of {:.2}% is significantly below other campaigns. \
                             Investigate ad relevance.",
                            value * 100.0
                        ),
                        0.75,
                        3,
                    ));
                }
                "cpc" if *value > upper => {
                    insights.push(anomaly_insight(
                        record,
                        "anomaly_cpc",
                        format!("Unusually High CPC: {}", record.entity_name),
                        format!(
                            "CPC of ${:.2} is significantly higher than other campaigns. \
                             Review bidding strategy.",
                            value
                        ),
                        0.8,
                        2,
                    ));
                }
                _ => {}
            }
        }
    }

    debug!(
        population = population.len(),
        insights = insights.len(),
        "anomaly detection complete"
    );
    insights
}

fn anomaly_insight(
    record: &MetricRecord,
    cause: &str,
    title: String,
    description: String,
    confidence: f64,
    priority: u8,
) -> Insight {
    let entity = record.entity_ref();
    Insight {
        id: Insight::make_id(InsightKind::Anomaly, cause, Some(&entity), None, 0),
        kind: InsightKind::Anomaly,
        title,
        description,
        impact: Impact::Medium,
        confidence,
        entity_ref: Some(entity),
        actionable: false,
        action_type: None,
        action_data: None,
        created_at: Utc::now(),
        priority,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use adpulse_core::EntityKind;

    fn campaign(id: &str, impressions: u64, clicks: u64, cost: f64) -> MetricRecord {
        MetricRecord {
            entity_id: id.to_string(),
            entity_name: format!("Campaign {}", id),
            entity_kind: EntityKind::Campaign,
            campaign_id: None,
            ad_group_id: None,
            impressions,
            clicks,
            cost,
            conversions: 0.0,
            budget_amount: 0.0,
            cpc_bid: 0.0,
        }
    }

    // 1. Population guards --------------------------------------------------

    #[test]
    fn test_fewer_than_two_records_yields_nothing() {
        assert!(detect(&[]).is_empty());
        assert!(detect(&[campaign("c-1", 1000, 50, 50.0)]).is_empty());
    }

    #[test]
    fn test_zero_impression_records_excluded_from_population() {
        // Only one record has impressions, so the population is too small.
        let records = vec![campaign("c-1", 1000, 50, 50.0), campaign("c-2", 0, 0, 0.0)];
        assert!(detect(&records).is_empty());
    }

    #[test]
    fn test_identical_values_yield_nothing() {
        // Same ctr and cpc everywhere: no distinct values, no outliers.
        let records = vec![
            campaign("c-1", 1000, 50, 50.0),
            campaign("c-2", 1000, 50, 50.0),
            campaign("c-3", 1000, 50, 50.0),
        ];
        assert!(detect(&records).is_empty());
    }

    // 2. Outlier detection --------------------------------------------------

    #[test]
    fn test_high_cpc_outlier_flagged() {
        // Four campaigns around $1 cpc, one at $10.
        let mut records = vec![
            campaign("c-1", 1000, 100, 100.0),
            campaign("c-2", 1000, 100, 102.0),
            campaign("c-3", 1000, 100, 98.0),
            campaign("c-4", 1000, 100, 101.0),
        ];
        records.push(campaign("c-5", 1000, 100, 1000.0));

        let insights = detect(&records);
        let cpc_anomalies: Vec<_> = insights
            .iter()
            .filter(|i| i.id.starts_with("anomaly_cpc-"))
            .collect();
        assert_eq!(cpc_anomalies.len(), 1);

        let anomaly = cpc_anomalies[0];
        assert_eq!(anomaly.kind, InsightKind::Anomaly);
        assert_eq!(anomaly.priority, 2);
        assert!((anomaly.confidence - 0.8).abs() < f64::EPSILON);
        assert_eq!(
            anomaly.entity_ref.as_ref().unwrap().campaign_id.as_deref(),
            Some("c-5")
        );
        assert!(!anomaly.actionable);
    }

    #[test]
    fn test_low_ctr_outlier_flagged() {
        // Four campaigns near 5% ctr, one at 0.1%.
        let records = vec![
            campaign("c-1", 1000, 50, 50.0),
            campaign("c-2", 1000, 52, 52.0),
            campaign("c-3", 1000, 48, 48.0),
            campaign("c-4", 1000, 51, 51.0),
            campaign("c-5", 1000, 1, 1.0),
        ];

        let insights = detect(&records);
        let ctr_anomalies: Vec<_> = insights
            .iter()
            .filter(|i| i.id.starts_with("anomaly_ctr-"))
            .collect();
        assert_eq!(ctr_anomalies.len(), 1);
        assert_eq!(ctr_anomalies[0].priority, 3);
        assert!((ctr_anomalies[0].confidence - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_conversion_rate_outliers_not_surfaced() {
        // One campaign with a wildly different conversion rate but identical
        // ctr/cpc: nothing is emitted.
        let mut records = vec![
            campaign("c-1", 1000, 50, 50.0),
            campaign("c-2", 1000, 50, 50.0),
            campaign("c-3", 1000, 50, 50.0),
            campaign("c-4", 1000, 50, 50.0),
        ];
        records[0].conversions = 0.1;
        records[1].conversions = 0.11;
        records[2].conversions = 0.09;
        records[3].conversions = 40.0;

        assert!(detect(&records).is_empty());
    }

    #[test]
    fn test_high_ctr_is_not_an_anomaly() {
        // The asymmetry: unusually *high* ctr is good news, not an anomaly.
        let records = vec![
            campaign("c-1", 1000, 10, 10.0),
            campaign("c-2", 1000, 11, 11.0),
            campaign("c-3", 1000, 9, 9.0),
            campaign("c-4", 1000, 10, 10.0),
            campaign("c-5", 1000, 500, 500.0),
        ];
        let insights = detect(&records);
        assert!(insights.iter().all(|i| !i.id.starts_with("anomaly_ctr-")));
    }
}

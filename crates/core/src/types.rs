use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Scope of a single metric record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Campaign,
    AdGroup,
    Keyword,
}

/// One row of ad-platform performance metrics for a campaign, ad group, or
/// keyword. Immutable once constructed for a given analysis pass; a new pass
/// re-fetches fresh records from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub entity_id: String,
    /// Human-readable name (campaign name or keyword text), used in
    /// insight titles.
    pub entity_name: String,
    pub entity_kind: EntityKind,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub ad_group_id: Option<String>,
    pub impressions: u64,
    pub clicks: u64,
    /// Spend in account currency.
    pub cost: f64,
    pub conversions: f64,
    /// Campaign-level only; 0 elsewhere.
    #[serde(default)]
    pub budget_amount: f64,
    /// Keyword/ad-group level only; 0 elsewhere.
    #[serde(default)]
    pub cpc_bid: f64,
}

impl MetricRecord {
    /// Click-through rate (`clicks / impressions`, 0 when no impressions).
    pub fn ctr(&self) -> f64 {
        if self.impressions == 0 {
            0.0
        } else {
            self.clicks as f64 / self.impressions as f64
        }
    }

    /// Cost per click (`cost / clicks`, 0 when no clicks).
    pub fn cpc(&self) -> f64 {
        if self.clicks == 0 {
            0.0
        } else {
            self.cost / self.clicks as f64
        }
    }

    /// Conversion rate (`conversions / clicks`, 0 when no clicks).
    pub fn conversion_rate(&self) -> f64 {
        if self.clicks == 0 {
            0.0
        } else {
            self.conversions / self.clicks as f64
        }
    }

    /// Cost per conversion (0 when no conversions).
    pub fn cost_per_conversion(&self) -> f64 {
        if self.conversions <= 0.0 {
            0.0
        } else {
            self.cost / self.conversions
        }
    }

    /// Reject malformed input at the provider boundary. Analyzers assume
    /// records have passed this check and never fail on well-formed input.
    pub fn validate(&self) -> EngineResult<()> {
        if self.entity_id.is_empty() {
            return Err(EngineError::Validation("record has empty entity_id".into()));
        }
        for (field, value) in [
            ("cost", self.cost),
            ("conversions", self.conversions),
            ("budget_amount", self.budget_amount),
            ("cpc_bid", self.cpc_bid),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::Validation(format!(
                    "record {}: {} must be a non-negative finite number, got {}",
                    self.entity_id, field, value
                )));
            }
        }
        if self.entity_kind == EntityKind::Keyword && self.ad_group_id.is_none() {
            return Err(EngineError::Validation(format!(
                "keyword record {} is missing its ad_group_id",
                self.entity_id
            )));
        }
        Ok(())
    }

    /// The entity reference an insight about this record should carry.
    /// Keyword records always resolve to their parent ad group.
    pub fn entity_ref(&self) -> EntityRef {
        match self.entity_kind {
            EntityKind::Campaign => EntityRef {
                campaign_id: Some(self.entity_id.clone()),
                ad_group_id: None,
            },
            EntityKind::AdGroup => EntityRef {
                campaign_id: self.campaign_id.clone(),
                ad_group_id: Some(self.entity_id.clone()),
            },
            EntityKind::Keyword => EntityRef {
                campaign_id: self.campaign_id.clone(),
                ad_group_id: self.ad_group_id.clone(),
            },
        }
    }
}

/// The kind of insight an analyzer produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Optimization,
    BudgetAlert,
    Keyword,
    Recommendation,
    Anomaly,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Optimization => "optimization",
            Self::BudgetAlert => "budget_alert",
            Self::Keyword => "keyword",
            Self::Recommendation => "recommendation",
            Self::Anomaly => "anomaly",
        }
    }
}

/// Expected impact of acting on an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    /// Lenient parse for untrusted advisor output. Unknown values
    /// default to `Medium`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

/// Reference to the ad-platform entity an insight is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_group_id: Option<String>,
}

impl EntityRef {
    pub fn campaign(id: impl Into<String>) -> Self {
        Self {
            campaign_id: Some(id.into()),
            ad_group_id: None,
        }
    }
}

/// Known remediation action names. Advisor-supplied actions may fall
/// outside this set.
pub mod action {
    pub const INCREASE_BUDGET: &str = "increase_budget";
    pub const OPTIMIZE_TARGETING: &str = "optimize_targeting";
    pub const IMPROVE_ADS: &str = "improve_ads";
    pub const OPTIMIZE_BIDS: &str = "optimize_bids";
    pub const OPTIMIZE_LANDING_PAGE: &str = "optimize_landing_page";
    pub const PAUSE_KEYWORD: &str = "pause_keyword";
    pub const INCREASE_BID: &str = "increase_bid";
}

/// Tuple identifying the underlying cause of an insight. Two insights with
/// the same cause key recommend action on the same entity/action pair and
/// are collapsed by the aggregator.
pub type CauseKey = (InsightKind, Option<EntityRef>, Option<String>);

/// One ranked, typed observation about ad performance. Value object:
/// created by exactly one analyzer, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub impact: Impact,
    /// In [0.0, 1.0].
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_ref: Option<EntityRef>,
    pub actionable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    /// 1 (most urgent) to 5.
    pub priority: u8,
}

impl Insight {
    /// Deterministic insight id: a cause slug plus a short content hash over
    /// the cause key and a pass-scoped sequence number. Identical causes
    /// produce identical ids across repeated runs, which keeps cause-based
    /// deduplication stable.
    pub fn make_id(
        kind: InsightKind,
        cause: &str,
        entity_ref: Option<&EntityRef>,
        action_type: Option<&str>,
        seq: u32,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(kind.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(cause.as_bytes());
        hasher.update(b"|");
        if let Some(entity) = entity_ref {
            hasher.update(entity.campaign_id.as_deref().unwrap_or("").as_bytes());
            hasher.update(b"/");
            hasher.update(entity.ad_group_id.as_deref().unwrap_or("").as_bytes());
        }
        hasher.update(b"|");
        hasher.update(action_type.unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(seq.to_le_bytes());
        let digest = hasher.finalize();
        format!("{}-{}", cause, &hex::encode(digest)[..12])
    }

    /// The `(kind, entity_ref, action_type)` tuple used for deduplication.
    pub fn cause_key(&self) -> CauseKey {
        (self.kind, self.entity_ref.clone(), self.action_type.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword_record() -> MetricRecord {
        MetricRecord {
            entity_id: "kw-1".to_string(),
            entity_name: "running shoes".to_string(),
            entity_kind: EntityKind::Keyword,
            campaign_id: Some("c-1".to_string()),
            ad_group_id: Some("ag-1".to_string()),
            impressions: 0,
            clicks: 0,
            cost: 0.0,
            conversions: 0.0,
            budget_amount: 0.0,
            cpc_bid: 1.5,
        }
    }

    // 1. Derived metrics ----------------------------------------------------

    #[test]
    fn test_derived_metrics_zero_denominators() {
        let record = keyword_record();
        assert_eq!(record.ctr(), 0.0);
        assert_eq!(record.cpc(), 0.0);
        assert_eq!(record.conversion_rate(), 0.0);
        assert_eq!(record.cost_per_conversion(), 0.0);
    }

    #[test]
    fn test_derived_metrics() {
        let record = MetricRecord {
            entity_id: "c-1".to_string(),
            entity_name: "Brand".to_string(),
            entity_kind: EntityKind::Campaign,
            campaign_id: None,
            ad_group_id: None,
            impressions: 1000,
            clicks: 50,
            cost: 100.0,
            conversions: 5.0,
            budget_amount: 500.0,
            cpc_bid: 0.0,
        };
        assert!((record.ctr() - 0.05).abs() < f64::EPSILON);
        assert!((record.cpc() - 2.0).abs() < f64::EPSILON);
        assert!((record.conversion_rate() - 0.1).abs() < f64::EPSILON);
        assert!((record.cost_per_conversion() - 20.0).abs() < f64::EPSILON);
    }

    // 2. Validation ---------------------------------------------------------

    #[test]
    fn test_validate_rejects_negative_cost() {
        let mut record = keyword_record();
        record.cost = -1.0;
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut record = keyword_record();
        record.conversions = f64::NAN;
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_keyword_without_ad_group() {
        let mut record = keyword_record();
        record.ad_group_id = None;
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        assert!(keyword_record().validate().is_ok());
    }

    // 3. Entity references --------------------------------------------------

    #[test]
    fn test_keyword_entity_ref_carries_ad_group() {
        let entity = keyword_record().entity_ref();
        assert_eq!(entity.ad_group_id.as_deref(), Some("ag-1"));
        assert_eq!(entity.campaign_id.as_deref(), Some("c-1"));
    }

    // 4. Insight ids --------------------------------------------------------

    #[test]
    fn test_insight_id_is_deterministic() {
        let entity = EntityRef::campaign("c-42");
        let a = Insight::make_id(
            InsightKind::BudgetAlert,
            "budget_high",
            Some(&entity),
            Some(action::INCREASE_BUDGET),
            0,
        );
        let b = Insight::make_id(
            InsightKind::BudgetAlert,
            "budget_high",
            Some(&entity),
            Some(action::INCREASE_BUDGET),
            0,
        );
        assert_eq!(a, b);
        assert!(a.starts_with("budget_high-"));
    }

    #[test]
    fn test_insight_id_varies_by_sequence() {
        let a = Insight::make_id(InsightKind::Recommendation, "advisor", None, None, 0);
        let b = Insight::make_id(InsightKind::Recommendation, "advisor", None, None, 1);
        assert_ne!(a, b);
    }

    // 5. Serialization ------------------------------------------------------

    #[test]
    fn test_insight_kind_serializes_snake_case() {
        let json = serde_json::to_string(&InsightKind::BudgetAlert).unwrap();
        assert_eq!(json, "\"budget_alert\"");
    }

    #[test]
    fn test_impact_parse_lenient() {
        assert_eq!(Impact::parse_lenient("HIGH"), Impact::High);
        assert_eq!(Impact::parse_lenient("low"), Impact::Low);
        assert_eq!(Impact::parse_lenient("critical"), Impact::Medium);
        assert_eq!(Impact::parse_lenient(""), Impact::Medium);
    }
}

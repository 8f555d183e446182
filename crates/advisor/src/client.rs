use adpulse_core::{EngineResult, EntityKind, MetricRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One candidate insight as returned by the external advisor. Every field
/// is untrusted: the bridge validates and coerces before anything reaches
/// the aggregator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCandidateInsight {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Advisors refer to campaigns by name, not id.
    #[serde(default)]
    pub campaign_name: Option<String>,
    #[serde(default)]
    pub action_type: Option<String>,
}

/// Compact per-campaign summary included in the advisor prompt context.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignSummary {
    pub name: String,
    pub budget: f64,
    pub spent: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub conversion_rate: f64,
}

/// Everything the advisor gets to see for one analysis pass.
#[derive(Debug, Clone, Serialize)]
pub struct AdvisorContext {
    pub customer_id: String,
    pub campaigns: Vec<CampaignSummary>,
}

impl AdvisorContext {
    /// Summarize campaign-scoped records for the advisor prompt.
    pub fn from_records(customer_id: &str, records: &[MetricRecord]) -> Self {
        let campaigns = records
            .iter()
            .filter(|r| r.entity_kind == EntityKind::Campaign)
            .map(|r| CampaignSummary {
                name: r.entity_name.clone(),
                budget: r.budget_amount,
                spent: r.cost,
                impressions: r.impressions,
                clicks: r.clicks,
                conversions: r.conversions,
                ctr: r.ctr(),
                cpc: r.cpc(),
                conversion_rate: r.conversion_rate(),
            })
            .collect();

        Self {
            customer_id: customer_id.to_string(),
            campaigns,
        }
    }
}

/// External natural-language advisor. Implementations own their transport,
/// prompting, and any retry policy; the bridge performs exactly one call
/// per analysis pass.
#[async_trait]
pub trait AdvisorClient: Send + Sync {
    async fn suggest(&self, context: &AdvisorContext) -> EngineResult<Vec<RawCandidateInsight>>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

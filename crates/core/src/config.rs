use serde::Deserialize;

/// Metric thresholds for the rule-based analyzers. Loaded once at startup
/// and passed to analyzers by reference; never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    /// CTR below this fires a low-CTR insight (2% default).
    #[serde(default = "default_low_ctr")]
    pub low_ctr: f64,
    /// CPC above this fires a high-CPC insight ($2 default).
    #[serde(default = "default_high_cpc")]
    pub high_cpc: f64,
    /// Conversion rate below this fires a low-conversion insight (1% default).
    #[serde(default = "default_low_conversion_rate")]
    pub low_conversion_rate: f64,
    /// Budget utilization above this fires a budget alert (85% default).
    #[serde(default = "default_budget_utilization_high")]
    pub budget_utilization_high: f64,
    /// Budget utilization below this fires an underspend insight (30% default).
    #[serde(default = "default_budget_utilization_low")]
    pub budget_utilization_low: f64,
}

/// Settings for the optional external advisor.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default = "default_advisor_enabled")]
    pub enabled: bool,
    /// Deadline for the advisor call; on expiry the pass proceeds with
    /// rule-based results only.
    #[serde(default = "default_advisor_timeout_ms")]
    pub timeout_ms: u64,
}

/// Root engine configuration. Loaded from environment variables with the
/// prefix `ADPULSE__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
    /// Cap on the number of insights returned per pass (unlimited when unset).
    #[serde(default)]
    pub max_results: Option<usize>,
}

fn default_low_ctr() -> f64 {
    0.02
}
fn default_high_cpc() -> f64 {
    2.0
}
fn default_low_conversion_rate() -> f64 {
    0.01
}
fn default_budget_utilization_high() -> f64 {
    0.85
}
fn default_budget_utilization_low() -> f64 {
    0.30
}
fn default_advisor_enabled() -> bool {
    true
}
fn default_advisor_timeout_ms() -> u64 {
    4000
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            low_ctr: default_low_ctr(),
            high_cpc: default_high_cpc(),
            low_conversion_rate: default_low_conversion_rate(),
            budget_utilization_high: default_budget_utilization_high(),
            budget_utilization_low: default_budget_utilization_low(),
        }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: default_advisor_enabled(),
            timeout_ms: default_advisor_timeout_ms(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    /// (e.g. `ADPULSE__THRESHOLDS__LOW_CTR=0.03`).
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("ADPULSE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_defaults() {
        let thresholds = ThresholdConfig::default();
        assert!((thresholds.low_ctr - 0.02).abs() < f64::EPSILON);
        assert!((thresholds.high_cpc - 2.0).abs() < f64::EPSILON);
        assert!((thresholds.low_conversion_rate - 0.01).abs() < f64::EPSILON);
        assert!((thresholds.budget_utilization_high - 0.85).abs() < f64::EPSILON);
        assert!((thresholds.budget_utilization_low - 0.30).abs() < f64::EPSILON);
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert!(config.advisor.enabled);
        assert_eq!(config.advisor.timeout_ms, 4000);
        assert_eq!(config.max_results, None);
    }
}

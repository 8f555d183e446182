//! Insight generation and prioritization engine: fans metric records out to
//! the rule-based analyzers and the optional advisor, merges and ranks the
//! results, and coordinates bounded automatic remediation.

pub mod aggregator;
pub mod engine;
pub mod provider;
pub mod remediation;

pub use engine::{AnalysisReport, AnalysisScope, InsightEngine};
pub use provider::{MetricsProvider, RecordFilter, RemediationExecutor};
pub use remediation::{RemediationCoordinator, RemediationResult, RemediationState};

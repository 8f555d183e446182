pub mod config;
pub mod error;
pub mod types;

pub use config::{AdvisorConfig, EngineConfig, ThresholdConfig};
pub use error::{EngineError, EngineResult};
pub use types::{EntityKind, EntityRef, Impact, Insight, InsightKind, MetricRecord};

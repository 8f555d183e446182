//! Optional natural-language enrichment. Wraps an external advisor behind a
//! failure-tolerant bridge: enrichment is strictly additive and can never
//! fail an analysis pass.

pub mod bridge;
pub mod client;

pub use bridge::AdvisorBridge;
pub use client::{AdvisorClient, AdvisorContext, CampaignSummary, RawCandidateInsight};

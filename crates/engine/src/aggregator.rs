//! Merge, dedupe, rank, and cap insight batches.

use adpulse_core::types::CauseKey;
use adpulse_core::Insight;
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Concatenate analyzer batches, collapse insights sharing a cause key, sort
/// ascending by `(priority, -confidence)`, and truncate to `max_results`.
///
/// Dedup keeps the instance with the lowest priority number; ties go to the
/// higher confidence, further ties to the first seen. The sort is stable, so
/// the final ordering is deterministic for a given batch order.
pub fn aggregate(batches: Vec<Vec<Insight>>, max_results: Option<usize>) -> Vec<Insight> {
    let mut merged: Vec<Insight> = Vec::new();
    let mut index: HashMap<CauseKey, usize> = HashMap::new();

    for insight in batches.into_iter().flatten() {
        match index.entry(insight.cause_key()) {
            Entry::Occupied(slot) => {
                let existing = &mut merged[*slot.get()];
                let wins = insight.priority < existing.priority
                    || (insight.priority == existing.priority
                        && insight.confidence > existing.confidence);
                if wins {
                    *existing = insight;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(insight);
            }
        }
    }

    merged.sort_by(|a, b| {
        a.priority.cmp(&b.priority).then(
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal),
        )
    });

    if let Some(max) = max_results {
        merged.truncate(max);
    }

    merged
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

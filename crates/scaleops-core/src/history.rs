//! Score history: a bounded, newest-first list of past analyses per item,
//! rendered as cards with an ordinal and a score band.

use crate::analysis::AnalysisResult;
use crate::answers::Answers;
use crate::config::BandThresholds;
use crate::error::Result;
use crate::store::WorkspaceStore;
use crate::types::Band;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub result: AnalysisResult,
}

impl HistoryEntry {
    pub fn new(result: AnalysisResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryCard {
    /// 1 for the oldest surviving entry, `total` for the newest.
    pub ordinal: usize,
    pub score: u32,
    pub band: Band,
    pub summary: String,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryCard {
    pub fn title(&self) -> String {
        format!(
            "Analysis #{} · {}",
            self.ordinal,
            self.recorded_at.format("%Y-%m-%d %H:%M UTC")
        )
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Prepend `entry` and drop anything past `limit`, oldest first.
pub fn push_bounded(history: &mut Vec<HistoryEntry>, entry: HistoryEntry, limit: usize) {
    history.insert(0, entry);
    history.truncate(limit);
}

/// A history entry and the revision of the record it was written to.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub entry: HistoryEntry,
    pub revision: u64,
}

/// Record `result` for `item_id` with the current timestamp. It becomes the
/// latest analysis, and `answers`, when given, are committed in the same
/// write.
pub fn record(
    store: &WorkspaceStore,
    item_id: &str,
    answers: Option<&Answers>,
    result: &AnalysisResult,
    limit: usize,
) -> Result<Recorded> {
    let entry = HistoryEntry::new(result.clone());
    let revision = store.record_analysis(item_id, answers, entry.clone(), limit)?;
    Ok(Recorded { entry, revision })
}

/// Map newest-first entries to display cards.
pub fn cards(entries: &[HistoryEntry], bands: &BandThresholds) -> Vec<HistoryCard> {
    let total = entries.len();
    entries
        .iter()
        .enumerate()
        .map(|(index, e)| HistoryCard {
            ordinal: total - index,
            score: e.result.score,
            band: bands.band(e.result.score),
            summary: e.result.summary.clone(),
            recorded_at: e.recorded_at,
        })
        .collect()
}

pub fn render(
    store: &WorkspaceStore,
    item_id: &str,
    bands: &BandThresholds,
) -> Result<Vec<HistoryCard>> {
    let entries = store.load_history(item_id)?;
    Ok(cards(&entries, bands))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Local persistence store backed by redb.
//!
//! # Table design
//!
//! A single `ITEMS` table maps an item id to one JSON-encoded [`ItemRecord`]
//! holding everything known about that item: answers, latest analysis,
//! bounded history and the last active tab.
//!
//! ```text
//! "1-1" -> { revision, answers, analysis, history[..20], activeTab, updatedAt }
//! ```
//!
//! Every mutation is a read-modify-write inside one redb write transaction.
//! redb admits one writer at a time, and `revision` increases on every
//! commit, so concurrent writers resolve as last-writer-wins with a visible
//! version. A failed write (quota, encoding) aborts the transaction and the
//! previously committed record stays readable.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition, WriteTransaction};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::answers::Answers;
use crate::config::Config;
use crate::error::{Result, ScaleOpsError};
use crate::history::{self, HistoryEntry};
use crate::paths;
use crate::types::Tab;

// ---------------------------------------------------------------------------
// Table definition
// ---------------------------------------------------------------------------

/// Key: item id. Value: JSON-encoded ItemRecord.
const ITEMS: TableDefinition<&str, &[u8]> = TableDefinition::new("items");

fn storage_err<E: std::fmt::Display>(e: E) -> ScaleOpsError {
    ScaleOpsError::Storage(e.to_string())
}

// ---------------------------------------------------------------------------
// ItemRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub item_id: String,
    pub revision: u64,
    #[serde(default)]
    pub answers: Answers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    /// Newest first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_tab: Option<Tab>,
    pub updated_at: DateTime<Utc>,
}

impl ItemRecord {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            revision: 0,
            answers: Answers::new(),
            analysis: None,
            history: Vec::new(),
            active_tab: None,
            updated_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// WorkspaceStore
// ---------------------------------------------------------------------------

pub struct WorkspaceStore {
    db: Database,
    quota_bytes: Option<u64>,
}

impl WorkspaceStore {
    /// Open or create the database at `path`, creating the `ITEMS` table.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(storage_err)?;
        let wt = db.begin_write().map_err(storage_err)?;
        wt.open_table(ITEMS).map_err(storage_err)?;
        wt.commit().map_err(storage_err)?;
        Ok(Self {
            db,
            quota_bytes: None,
        })
    }

    /// Open the project store with the configured quota.
    pub fn open_project(root: &Path, config: &Config) -> Result<Self> {
        let store = Self::open(&paths::workspace_db_path(root))?;
        Ok(store.with_quota(config.storage.quota_bytes))
    }

    /// Cap the total encoded size of all records. Writes that would exceed
    /// it fail with [`ScaleOpsError::Storage`].
    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    pub fn save_answers(&self, item_id: &str, answers: &Answers) -> Result<u64> {
        let record = self.update(item_id, |r| r.answers = answers.clone())?;
        Ok(record.revision)
    }

    pub fn save_analysis(&self, item_id: &str, result: &AnalysisResult) -> Result<u64> {
        let record = self.update(item_id, |r| r.analysis = Some(result.clone()))?;
        Ok(record.revision)
    }

    /// Prepend `entry`, keeping at most `limit` entries.
    pub fn append_history(&self, item_id: &str, entry: HistoryEntry, limit: usize) -> Result<u64> {
        let record = self.update(item_id, |r| {
            history::push_bounded(&mut r.history, entry, limit)
        })?;
        Ok(record.revision)
    }

    /// Store the entry's result as the latest analysis and prepend it to
    /// history, together with `answers` when given, in one transaction.
    /// Either all of it commits or none of it does.
    pub fn record_analysis(
        &self,
        item_id: &str,
        answers: Option<&Answers>,
        entry: HistoryEntry,
        limit: usize,
    ) -> Result<u64> {
        let record = self.update(item_id, |r| {
            if let Some(answers) = answers {
                r.answers = answers.clone();
            }
            r.analysis = Some(entry.result.clone());
            history::push_bounded(&mut r.history, entry, limit);
        })?;
        Ok(record.revision)
    }

    pub fn save_active_tab(&self, item_id: &str, tab: Tab) -> Result<u64> {
        let record = self.update(item_id, |r| r.active_tab = Some(tab))?;
        Ok(record.revision)
    }

    fn update<F>(&self, item_id: &str, f: F) -> Result<ItemRecord>
    where
        F: FnOnce(&mut ItemRecord),
    {
        paths::validate_item_id(item_id)?;
        let wt = self.db.begin_write().map_err(storage_err)?;
        match self.write_record(&wt, item_id, f) {
            Ok(record) => {
                wt.commit().map_err(storage_err)?;
                tracing::debug!(item = item_id, revision = record.revision, "record saved");
                Ok(record)
            }
            Err(e) => {
                if let Err(abort) = wt.abort() {
                    tracing::warn!(item = item_id, error = %abort, "abort failed");
                }
                tracing::warn!(item = item_id, error = %e, "write dropped");
                Err(e)
            }
        }
    }

    fn write_record<F>(&self, wt: &WriteTransaction, item_id: &str, f: F) -> Result<ItemRecord>
    where
        F: FnOnce(&mut ItemRecord),
    {
        let mut table = wt.open_table(ITEMS).map_err(storage_err)?;

        let existing = table
            .get(item_id)
            .map_err(storage_err)?
            .map(|v| serde_json::from_slice::<ItemRecord>(v.value()))
            .transpose()
            .map_err(storage_err)?;
        let mut record = existing.unwrap_or_else(|| ItemRecord::new(item_id));

        f(&mut record);
        record.revision += 1;
        record.updated_at = Utc::now();

        let value = serde_json::to_vec(&record).map_err(storage_err)?;

        if let Some(quota) = self.quota_bytes {
            let mut used = (item_id.len() + value.len()) as u64;
            for entry in table.iter().map_err(storage_err)? {
                let (k, v) = entry.map_err(storage_err)?;
                if k.value() != item_id {
                    used += (k.value().len() + v.value().len()) as u64;
                }
            }
            if used > quota {
                return Err(ScaleOpsError::Storage(format!(
                    "quota exceeded: {used} of {quota} bytes"
                )));
            }
        }

        table
            .insert(item_id, value.as_slice())
            .map_err(storage_err)?;
        Ok(record)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn load_record(&self, item_id: &str) -> Result<Option<ItemRecord>> {
        paths::validate_item_id(item_id)?;
        let rt = self.db.begin_read().map_err(storage_err)?;
        let table = rt.open_table(ITEMS).map_err(storage_err)?;
        let record = table
            .get(item_id)
            .map_err(storage_err)?
            .map(|v| serde_json::from_slice::<ItemRecord>(v.value()))
            .transpose()
            .map_err(storage_err)?;
        Ok(record)
    }

    pub fn load_answers(&self, item_id: &str) -> Result<Answers> {
        Ok(self
            .load_record(item_id)?
            .map(|r| r.answers)
            .unwrap_or_default())
    }

    pub fn load_analysis(&self, item_id: &str) -> Result<Option<AnalysisResult>> {
        Ok(self.load_record(item_id)?.and_then(|r| r.analysis))
    }

    /// Newest first.
    pub fn load_history(&self, item_id: &str) -> Result<Vec<HistoryEntry>> {
        Ok(self
            .load_record(item_id)?
            .map(|r| r.history)
            .unwrap_or_default())
    }

    pub fn load_active_tab(&self, item_id: &str) -> Result<Option<Tab>> {
        Ok(self.load_record(item_id)?.and_then(|r| r.active_tab))
    }

    /// All item ids in key order.
    pub fn list_items(&self) -> Result<Vec<String>> {
        let rt = self.db.begin_read().map_err(storage_err)?;
        let table = rt.open_table(ITEMS).map_err(storage_err)?;
        let mut ids = Vec::new();
        for entry in table.iter().map_err(storage_err)? {
            let (k, _) = entry.map_err(storage_err)?;
            ids.push(k.value().to_string());
        }
        Ok(ids)
    }

    /// Total encoded size of all records, as counted against the quota.
    pub fn used_bytes(&self) -> Result<u64> {
        let rt = self.db.begin_read().map_err(storage_err)?;
        let table = rt.open_table(ITEMS).map_err(storage_err)?;
        let mut used = 0u64;
        for entry in table.iter().map_err(storage_err)? {
            let (k, v) = entry.map_err(storage_err)?;
            used += (k.value().len() + v.value().len()) as u64;
        }
        Ok(used)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

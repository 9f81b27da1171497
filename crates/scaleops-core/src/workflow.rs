//! One assessment session: the context object every workflow action runs
//! against.
//!
//! A local write always completes before the action returns. Storage and
//! network failures degrade to a visible status instead of an error; only
//! input problems (bad ids, missing required answers) fail an action.

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, CannedEvaluator, Evaluator};
use crate::answers::{self, Answers, FormModel};
use crate::config::Config;
use crate::error::{Result, ScaleOpsError};
use crate::export::{ExportDocument, ExportedFile, Exporter};
use crate::history::{self, HistoryCard, HistoryEntry};
use crate::paths;
use crate::store::WorkspaceStore;
use crate::sync::{SyncClient, SyncOutcome, SyncPayload, WorkspaceSnapshot};
use crate::types::{ExportFormat, Tab};
use crate::view::{TabMachine, ViewContent, ViewContext};

// ---------------------------------------------------------------------------
// Status types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveStatus {
    Saved { revision: u64 },
    /// The local write was dropped; the previous value is still stored.
    Unsaved { reason: String },
}

impl SaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            SaveStatus::Saved { .. } => "saved",
            SaveStatus::Unsaved { .. } => "unsaved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    pub item_id: String,
    pub answers: Answers,
    pub save: SaveStatus,
    /// `None` when no remote is configured or nothing was saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeReport {
    pub item_id: String,
    pub result: AnalysisResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<HistoryEntry>,
    pub save: SaveStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncOutcome>,
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

pub struct Workflow {
    config: Config,
    store: WorkspaceStore,
    evaluator: Box<dyn Evaluator>,
    sync: Option<SyncClient>,
    exporter: Exporter,
}

impl Workflow {
    /// Local-only session with no PDF renderer.
    pub fn new(config: Config, store: WorkspaceStore, evaluator: Box<dyn Evaluator>) -> Self {
        let exporter = Exporter::new(None, config.bands);
        Self {
            config,
            store,
            evaluator,
            sync: None,
            exporter,
        }
    }

    /// Session for the project at `root`, wired from its config.
    pub fn open(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        let store = WorkspaceStore::open_project(root, &config)?;
        let evaluator = Box::new(CannedEvaluator::from_config(&config));
        let sync = SyncClient::from_config(&config.sync)?;
        let exporter = Exporter::from_config(&config)?;
        let mut workflow = Self::new(config, store, evaluator).with_exporter(exporter);
        workflow.sync = sync;
        Ok(workflow)
    }

    pub fn with_sync(mut self, client: SyncClient) -> Self {
        self.sync = Some(client);
        self
    }

    pub fn with_exporter(mut self, exporter: Exporter) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &WorkspaceStore {
        &self.store
    }

    fn mirror(&self, item_id: &str, payload: SyncPayload) -> Option<SyncOutcome> {
        self.sync.as_ref().map(|c| c.try_sync(item_id, payload))
    }

    fn degrade(item_id: &str, result: Result<u64>) -> Result<SaveStatus> {
        match result {
            Ok(revision) => Ok(SaveStatus::Saved { revision }),
            Err(ScaleOpsError::Storage(reason)) => {
                tracing::warn!(item = item_id, %reason, "save failed, answers kept in memory only");
                Ok(SaveStatus::Unsaved { reason })
            }
            Err(e) => Err(e),
        }
    }

    // -----------------------------------------------------------------------
    // Answers
    // -----------------------------------------------------------------------

    /// Collect `form` and persist it as the item's answers.
    pub fn autosave(&self, item_id: &str, form: &FormModel) -> Result<SaveReport> {
        paths::validate_item_id(item_id)?;
        let answers = answers::collect(&self.config.worksheet, form);
        let save = Self::degrade(item_id, self.store.save_answers(item_id, &answers))?;
        let sync = if save.is_saved() {
            self.mirror(
                item_id,
                SyncPayload {
                    answers: Some(answers.clone()),
                    analysis: None,
                },
            )
        } else {
            None
        };
        Ok(SaveReport {
            item_id: item_id.to_string(),
            answers,
            save,
            sync,
        })
    }

    pub fn answers(&self, item_id: &str) -> Result<Answers> {
        self.store.load_answers(item_id)
    }

    // -----------------------------------------------------------------------
    // Analysis
    // -----------------------------------------------------------------------

    /// Score `form`, then persist answers, latest analysis and history in a
    /// single write.
    ///
    /// Missing required answers fail with [`ScaleOpsError::Validation`] before
    /// anything is written.
    pub fn analyze(&self, item_id: &str, form: &FormModel) -> Result<AnalyzeReport> {
        paths::validate_item_id(item_id)?;
        let answers = answers::collect(&self.config.worksheet, form);
        answers::validate_required(&self.config.worksheet, &answers)?;

        let result = self.evaluator.evaluate(item_id, &answers)?;
        result.check()?;
        tracing::info!(item = item_id, score = result.score, "analysis generated");

        let recorded = history::record(
            &self.store,
            item_id,
            Some(&answers),
            &result,
            self.config.history_limit,
        );
        let (entry, persisted) = match recorded {
            Ok(r) => (Some(r.entry), Ok(r.revision)),
            Err(e) => (None, Err(e)),
        };
        let save = Self::degrade(item_id, persisted)?;

        let sync = if save.is_saved() {
            self.mirror(
                item_id,
                SyncPayload {
                    answers: Some(answers),
                    analysis: Some(result.clone()),
                },
            )
        } else {
            None
        };
        Ok(AnalyzeReport {
            item_id: item_id.to_string(),
            result,
            entry,
            save,
            sync,
        })
    }

    /// Analyze whatever answers are currently saved for the item.
    pub fn analyze_saved(&self, item_id: &str) -> Result<AnalyzeReport> {
        let saved = self.store.load_answers(item_id)?;
        self.analyze(item_id, &answers::to_form(&saved))
    }

    pub fn latest_analysis(&self, item_id: &str) -> Result<Option<AnalysisResult>> {
        self.store.load_analysis(item_id)
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    pub fn history(&self, item_id: &str) -> Result<Vec<HistoryEntry>> {
        self.store.load_history(item_id)
    }

    pub fn history_cards(&self, item_id: &str) -> Result<Vec<HistoryCard>> {
        history::render(&self.store, item_id, &self.config.bands)
    }

    // -----------------------------------------------------------------------
    // Tabs
    // -----------------------------------------------------------------------

    /// Machine resumed at the item's last tab, else the configured default.
    pub fn tab_machine(&self, item_id: &str) -> Result<TabMachine> {
        let initial = self
            .store
            .load_active_tab(item_id)?
            .unwrap_or(self.config.default_tab);
        Ok(TabMachine::new(initial))
    }

    pub fn view_context<'a>(&'a self, item_id: &'a str) -> ViewContext<'a> {
        ViewContext {
            item_id,
            config: &self.config,
            store: &self.store,
        }
    }

    /// Switch tabs and remember the choice. `None` when `tab` was already
    /// active.
    pub fn switch_tab(
        &self,
        machine: &mut TabMachine,
        item_id: &str,
        tab: Tab,
    ) -> Option<ViewContent> {
        let content = machine.switch_to(tab, &self.view_context(item_id))?;
        if let Err(e) = self.store.save_active_tab(item_id, tab) {
            tracing::warn!(item = item_id, error = %e, "active tab not persisted");
        }
        Some(content)
    }

    // -----------------------------------------------------------------------
    // Export / snapshot
    // -----------------------------------------------------------------------

    pub fn document(&self, item_id: &str) -> Result<ExportDocument> {
        let record = self
            .store
            .load_record(item_id)?
            .ok_or_else(|| ScaleOpsError::ItemNotFound(item_id.to_string()))?;
        Ok(ExportDocument {
            item_id: record.item_id,
            project: self.config.project.name.clone(),
            answers: record.answers,
            analysis: record.analysis,
            generated_at: Utc::now(),
        })
    }

    pub fn export(&self, item_id: &str, format: ExportFormat) -> Result<ExportedFile> {
        self.exporter.export(&self.document(item_id)?, format)
    }

    /// Export and write the file under `.scaleops/exports/`.
    pub fn export_to_disk(
        &self,
        root: &Path,
        item_id: &str,
        format: ExportFormat,
    ) -> Result<(ExportedFile, std::path::PathBuf)> {
        let file = self.export(item_id, format)?;
        crate::io::ensure_dir(&paths::exports_dir(root))?;
        let path = paths::export_path(root, &file.filename);
        crate::io::atomic_write(&path, &file.bytes)?;
        Ok((file, path))
    }

    pub fn snapshot(&self, item_id: &str) -> Result<WorkspaceSnapshot> {
        let record = self.store.load_record(item_id)?;
        Ok(match record {
            Some(r) => WorkspaceSnapshot {
                item_id: r.item_id,
                revision: r.revision,
                answers: r.answers,
                analysis: r.analysis,
                active_tab: r.active_tab,
            },
            None => WorkspaceSnapshot {
                item_id: item_id.to_string(),
                revision: 0,
                answers: Answers::new(),
                analysis: None,
                active_tab: None,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

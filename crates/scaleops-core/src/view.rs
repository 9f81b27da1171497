//! Tab state machine and the per-tab view handlers.
//!
//! Exactly one tab is active. Entering a tab updates the active tab first and
//! then runs that tab's handler once; re-entering the active tab does nothing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::config::{Config, ResourceLink};
use crate::error::Result;
use crate::history::{self, HistoryCard};
use crate::store::WorkspaceStore;
use crate::types::{ExportFormat, Tab};

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Everything a handler can read while producing its content.
pub struct ViewContext<'a> {
    pub item_id: &'a str,
    pub config: &'a Config,
    pub store: &'a WorkspaceStore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub id: String,
    pub label: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewContent {
    Lessons { lessons: Vec<String> },
    Worksheet { fields: Vec<FieldView> },
    Analysis { result: AnalysisResult },
    Formats { formats: Vec<ExportFormat> },
    Resources { links: Vec<ResourceLink> },
    History { cards: Vec<HistoryCard> },
    /// Empty states and handler failures.
    Notice { message: String },
}

impl ViewContent {
    pub fn notice(message: impl Into<String>) -> Self {
        ViewContent::Notice {
            message: message.into(),
        }
    }
}

pub trait ViewHandler: Send + Sync {
    fn on_enter(&self, ctx: &ViewContext<'_>) -> Result<ViewContent>;
}

// ---------------------------------------------------------------------------
// Default handlers
// ---------------------------------------------------------------------------

struct EducationView;

impl ViewHandler for EducationView {
    fn on_enter(&self, ctx: &ViewContext<'_>) -> Result<ViewContent> {
        Ok(ViewContent::Lessons {
            lessons: ctx.config.education.clone(),
        })
    }
}

struct WorkspaceView;

impl ViewHandler for WorkspaceView {
    fn on_enter(&self, ctx: &ViewContext<'_>) -> Result<ViewContent> {
        let answers = ctx.store.load_answers(ctx.item_id)?;
        let mut fields: Vec<FieldView> = ctx
            .config
            .worksheet
            .fields
            .iter()
            .map(|f| FieldView {
                id: f.id.clone(),
                label: f.display_label().to_string(),
                required: f.required,
                value: answers.get(&f.id).map(|a| a.value.clone()),
            })
            .collect();
        // Answers saved under fields no longer in the schema stay visible.
        for (id, answer) in &answers {
            if ctx.config.field(id).is_none() {
                fields.push(FieldView {
                    id: id.clone(),
                    label: answer.label.clone(),
                    required: false,
                    value: Some(answer.value.clone()),
                });
            }
        }
        Ok(ViewContent::Worksheet { fields })
    }
}

struct AnalysisView;

impl ViewHandler for AnalysisView {
    fn on_enter(&self, ctx: &ViewContext<'_>) -> Result<ViewContent> {
        Ok(match ctx.store.load_analysis(ctx.item_id)? {
            Some(result) => ViewContent::Analysis { result },
            None => ViewContent::notice("No analysis yet. Complete the worksheet and run analyze."),
        })
    }
}

struct OutputView;

impl ViewHandler for OutputView {
    fn on_enter(&self, _ctx: &ViewContext<'_>) -> Result<ViewContent> {
        Ok(ViewContent::Formats {
            formats: ExportFormat::all().to_vec(),
        })
    }
}

struct ResourcesView;

impl ViewHandler for ResourcesView {
    fn on_enter(&self, ctx: &ViewContext<'_>) -> Result<ViewContent> {
        Ok(ViewContent::Resources {
            links: ctx.config.resources.clone(),
        })
    }
}

struct HistoryView;

impl ViewHandler for HistoryView {
    fn on_enter(&self, ctx: &ViewContext<'_>) -> Result<ViewContent> {
        let cards = history::render(ctx.store, ctx.item_id, &ctx.config.bands)?;
        if cards.is_empty() {
            return Ok(ViewContent::notice("No analyses recorded yet."));
        }
        Ok(ViewContent::History { cards })
    }
}

pub fn default_handlers() -> HashMap<Tab, Box<dyn ViewHandler>> {
    let mut handlers: HashMap<Tab, Box<dyn ViewHandler>> = HashMap::new();
    handlers.insert(Tab::Education, Box::new(EducationView));
    handlers.insert(Tab::Workspace, Box::new(WorkspaceView));
    handlers.insert(Tab::Analysis, Box::new(AnalysisView));
    handlers.insert(Tab::Output, Box::new(OutputView));
    handlers.insert(Tab::Resources, Box::new(ResourcesView));
    handlers.insert(Tab::History, Box::new(HistoryView));
    handlers
}

// ---------------------------------------------------------------------------
// TabMachine
// ---------------------------------------------------------------------------

pub struct TabMachine {
    active: Tab,
    handlers: HashMap<Tab, Box<dyn ViewHandler>>,
}

impl TabMachine {
    /// Machine with the stock handler for every tab.
    pub fn new(initial: Tab) -> Self {
        Self::with_handlers(initial, default_handlers())
    }

    pub fn with_handlers(initial: Tab, handlers: HashMap<Tab, Box<dyn ViewHandler>>) -> Self {
        Self {
            active: initial,
            handlers,
        }
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    /// Content of the active tab without a transition.
    pub fn render_active(&self, ctx: &ViewContext<'_>) -> ViewContent {
        self.enter(self.active, ctx)
    }

    /// Activate `tab`. Returns `None` when it was already active.
    pub fn switch_to(&mut self, tab: Tab, ctx: &ViewContext<'_>) -> Option<ViewContent> {
        if tab == self.active {
            tracing::debug!(tab = %tab, "already active");
            return None;
        }
        self.active = tab;
        Some(self.enter(tab, ctx))
    }

    fn enter(&self, tab: Tab, ctx: &ViewContext<'_>) -> ViewContent {
        let Some(handler) = self.handlers.get(&tab) else {
            return ViewContent::notice(format!("{} has no content.", tab.title()));
        };
        match handler.on_enter(ctx) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(tab = %tab, item = ctx.item_id, error = %e, "view handler failed");
                ViewContent::notice(format!("{} is unavailable: {e}", tab.title()))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

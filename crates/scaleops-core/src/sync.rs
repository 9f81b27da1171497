//! Best-effort mirror of local writes to the backend.
//!
//! Local storage stays the source of truth. A sync is attempted once, after
//! the local write has committed; there is no retry queue and no ordering
//! guarantee between mirrored writes. The remote may lag or diverge.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::answers::{Answers, FormModel};
use crate::config::SyncConfig;
use crate::error::{Result, ScaleOpsError};
use crate::history::HistoryEntry;
use crate::types::Tab;

const AGENT: &str = concat!("scaleops/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// What a local write changed; absent parts are left alone remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<Answers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
}

/// Body of `POST /api/workspace/save`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub item_id: String,
    #[serde(flatten)]
    pub payload: SyncPayload,
}

/// Body of `POST /api/analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub item_id: String,
    pub responses: FormModel,
}

/// Response of `GET /api/workspace/load/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    pub item_id: String,
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub answers: Answers,
    #[serde(default)]
    pub analysis: Option<AnalysisResult>,
    #[serde(default)]
    pub active_tab: Option<Tab>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    Ok,
    /// Remote unreachable or erroring; carry on local-only.
    Degraded { reason: String },
    /// Remote refused the write; also local-only.
    Failed { reason: String },
}

impl SyncOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, SyncOutcome::Ok)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SyncOutcome::Ok => "synced",
            SyncOutcome::Degraded { .. } => "local only",
            SyncOutcome::Failed { .. } => "sync rejected",
        }
    }
}

// ---------------------------------------------------------------------------
// SyncClient
// ---------------------------------------------------------------------------

pub struct SyncClient {
    base_url: String,
    client: Client,
}

impl SyncClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScaleOpsError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// `None` when no remote is configured.
    pub fn from_config(config: &SyncConfig) -> Result<Option<Self>> {
        match &config.base_url {
            Some(url) => Ok(Some(Self::new(
                url,
                Duration::from_secs(config.timeout_secs),
            )?)),
            None => Ok(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Mirror a local write. Never returns an error.
    pub fn try_sync(&self, item_id: &str, payload: SyncPayload) -> SyncOutcome {
        let body = SaveRequest {
            item_id: item_id.to_string(),
            payload,
        };
        let res = self
            .client
            .post(self.url("/api/workspace/save"))
            .header(USER_AGENT, AGENT)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send();

        let outcome = match res {
            Err(e) => SyncOutcome::Degraded {
                reason: e.to_string(),
            },
            Ok(res) if res.status().is_success() => SyncOutcome::Ok,
            Ok(res) if res.status().is_client_error() => {
                let status = res.status();
                let text = res.text().unwrap_or_default();
                SyncOutcome::Failed {
                    reason: format!("HTTP {status}: {text}"),
                }
            }
            Ok(res) => SyncOutcome::Degraded {
                reason: format!("HTTP {}", res.status()),
            },
        };

        match &outcome {
            SyncOutcome::Ok => tracing::debug!(item = item_id, "synced"),
            SyncOutcome::Degraded { reason } | SyncOutcome::Failed { reason } => {
                tracing::warn!(item = item_id, %reason, "sync skipped, continuing local-only")
            }
        }
        outcome
    }

    /// Ask the backend to analyze `responses`.
    pub fn remote_analyze(&self, item_id: &str, responses: &FormModel) -> Result<AnalysisResult> {
        let body = AnalysisRequest {
            item_id: item_id.to_string(),
            responses: responses.clone(),
        };
        let res = self
            .client
            .post(self.url("/api/analysis"))
            .header(USER_AGENT, AGENT)
            .json(&body)
            .send()
            .map_err(network)?;
        decode(res)
    }

    pub fn fetch_history(&self, item_id: &str) -> Result<Vec<HistoryEntry>> {
        let res = self
            .client
            .get(self.url(&format!("/api/items/{item_id}/history")))
            .header(USER_AGENT, AGENT)
            .send()
            .map_err(network)?;
        decode(res)
    }

    pub fn load_workspace(&self, item_id: &str) -> Result<WorkspaceSnapshot> {
        let res = self
            .client
            .get(self.url(&format!("/api/workspace/load/{item_id}")))
            .header(USER_AGENT, AGENT)
            .send()
            .map_err(network)?;
        decode(res)
    }
}

fn network(e: reqwest::Error) -> ScaleOpsError {
    ScaleOpsError::Network(e.to_string())
}

fn decode<T: for<'de> Deserialize<'de>>(res: reqwest::blocking::Response) -> Result<T> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().unwrap_or_default();
        return Err(ScaleOpsError::Network(format!("HTTP {status}: {body}")));
    }
    res.json::<T>().map_err(network)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

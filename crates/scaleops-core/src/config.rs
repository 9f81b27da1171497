use crate::answers::{FieldSpec, WorksheetSchema};
use crate::error::{Result, ScaleOpsError};
use crate::paths;
use crate::types::{Band, Tab};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// BandThresholds
// ---------------------------------------------------------------------------

/// Lower bounds (inclusive, percent) for each band. `good` must exceed `fair`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    #[serde(default = "default_good")]
    pub good: u32,
    #[serde(default = "default_fair")]
    pub fair: u32,
}

fn default_good() -> u32 {
    80
}

fn default_fair() -> u32 {
    60
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            good: default_good(),
            fair: default_fair(),
        }
    }
}

impl BandThresholds {
    pub fn band(&self, percent: u32) -> Band {
        if percent >= self.good {
            Band::Good
        } else if percent >= self.fair {
            Band::Fair
        } else {
            Band::NeedsWork
        }
    }
}

// ---------------------------------------------------------------------------
// Remote services
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Backend base URL, e.g. `http://localhost:3141`. Unset means local-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_sync_timeout")]
    pub timeout_secs: u64,
}

fn default_sync_timeout() -> u64 {
    5
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_sync_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// HTML-to-PDF render service. Unset means PDF exports fall back to HTML.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default = "default_render_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_ms: u64,
}

fn default_render_timeout() -> u64 {
    30
}

fn default_ready_timeout() -> u64 {
    2000
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_render_timeout(),
            ready_timeout_ms: default_ready_timeout(),
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring / storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Fixed seed makes analysis a pure function of item and answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_bytes: Option<u64>,
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub title: String,
    pub url: String,
}

fn default_education() -> Vec<String> {
    vec![
        "Name the customer you serve before you describe what you sell.".to_string(),
        "State the problem in the customer's words, not yours.".to_string(),
        "Tie the timing to a trigger the customer can point to.".to_string(),
    ]
}

fn default_resources() -> Vec<ResourceLink> {
    vec![ResourceLink {
        title: "Customer interview guide".to_string(),
        url: "https://scaleops6.com/resources/interview-guide".to_string(),
    }]
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default)]
    pub default_tab: Tab,
    #[serde(default)]
    pub bands: BandThresholds,
    #[serde(default)]
    pub worksheet: WorksheetSchema,
    #[serde(default = "default_education")]
    pub education: Vec<String>,
    #[serde(default = "default_resources")]
    pub resources: Vec<ResourceLink>,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_version() -> u32 {
    1
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            history_limit: DEFAULT_HISTORY_LIMIT,
            default_tab: Tab::Education,
            bands: BandThresholds::default(),
            worksheet: WorksheetSchema::default(),
            education: default_education(),
            resources: default_resources(),
            sync: SyncConfig::default(),
            render: RenderConfig::default(),
            scoring: ScoringConfig::default(),
            storage: StorageConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(ScaleOpsError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        if cfg.history_limit == 0 {
            return Err(ScaleOpsError::Validation(
                "history_limit must be at least 1".to_string(),
            ));
        }
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.bands.good <= self.bands.fair {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "bands.good ({}) must be greater than bands.fair ({})",
                    self.bands.good, self.bands.fair
                ),
            });
        }
        if self.bands.good > 100 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("bands.good ({}) is above 100", self.bands.good),
            });
        }

        if self.history_limit == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "history_limit must be at least 1".to_string(),
            });
        } else if self.history_limit > 50 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "history_limit={} (>50 is unusual)",
                    self.history_limit
                ),
            });
        }

        let mut seen = HashSet::new();
        for field in &self.worksheet.fields {
            if !seen.insert(field.id.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("duplicate worksheet field id '{}'", field.id),
                });
            }
            if field.label.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "worksheet field '{}' has an empty label; the field id will be shown",
                        field.id
                    ),
                });
            }
        }
        if self.worksheet.fields.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "worksheet has no fields".to_string(),
            });
        }

        if let Some(url) = &self.sync.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("sync.base_url '{url}' is not an http(s) URL"),
                });
            }
        }
        if let Some(url) = &self.render.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("render.url '{url}' is not an http(s) URL"),
                });
            }
        }

        warnings
    }

    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.worksheet.field(id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

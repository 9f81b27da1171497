use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Tab
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Education,
    Workspace,
    Analysis,
    Output,
    Resources,
    History,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[
            Tab::Education,
            Tab::Workspace,
            Tab::Analysis,
            Tab::Output,
            Tab::Resources,
            Tab::History,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Education => "education",
            Tab::Workspace => "workspace",
            Tab::Analysis => "analysis",
            Tab::Output => "output",
            Tab::Resources => "resources",
            Tab::History => "history",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Education => "Education",
            Tab::Workspace => "Workspace",
            Tab::Analysis => "Analysis",
            Tab::Output => "Output",
            Tab::Resources => "Resources",
            Tab::History => "History",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tab {
    type Err = crate::error::ScaleOpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "education" => Ok(Tab::Education),
            "workspace" => Ok(Tab::Workspace),
            "analysis" => Ok(Tab::Analysis),
            "output" => Ok(Tab::Output),
            "resources" => Ok(Tab::Resources),
            "history" => Ok(Tab::History),
            _ => Err(crate::error::ScaleOpsError::InvalidTab(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ExportFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Pdf,
    /// Plain text carried under a .docx name.
    Docx,
    Html,
    Text,
    /// Zip of per-document PDFs (or their fallbacks) plus a README.
    Bundle,
}

impl ExportFormat {
    pub fn all() -> &'static [ExportFormat] {
        &[
            ExportFormat::Pdf,
            ExportFormat::Docx,
            ExportFormat::Html,
            ExportFormat::Text,
            ExportFormat::Bundle,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Html => "html",
            ExportFormat::Text => "txt",
            ExportFormat::Bundle => "zip",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => "text/plain; charset=utf-8",
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::Text => "text/plain; charset=utf-8",
            ExportFormat::Bundle => "application/zip",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = crate::error::ScaleOpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            "html" => Ok(ExportFormat::Html),
            "txt" | "text" => Ok(ExportFormat::Text),
            "zip" | "bundle" => Ok(ExportFormat::Bundle),
            _ => Err(crate::error::ScaleOpsError::InvalidFormat(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Band
// ---------------------------------------------------------------------------

/// Score banding shared by every surface that colors a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    NeedsWork,
    Fair,
    Good,
}

impl Band {
    pub fn as_str(self) -> &'static str {
        match self {
            Band::Good => "good",
            Band::Fair => "fair",
            Band::NeedsWork => "needs_work",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::Good => "Good",
            Band::Fair => "Fair",
            Band::NeedsWork => "Needs work",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

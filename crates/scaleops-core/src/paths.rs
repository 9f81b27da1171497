use crate::error::{Result, ScaleOpsError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const SCALEOPS_DIR: &str = ".scaleops";
pub const EXPORTS_DIR: &str = ".scaleops/exports";

pub const CONFIG_FILE: &str = ".scaleops/config.yaml";
pub const WORKSPACE_DB: &str = ".scaleops/workspace.redb";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn scaleops_dir(root: &Path) -> PathBuf {
    root.join(SCALEOPS_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn workspace_db_path(root: &Path) -> PathBuf {
    root.join(WORKSPACE_DB)
}

pub fn exports_dir(root: &Path) -> PathBuf {
    root.join(EXPORTS_DIR)
}

pub fn export_path(root: &Path, filename: &str) -> PathBuf {
    exports_dir(root).join(filename)
}

// ---------------------------------------------------------------------------
// Item id validation
// ---------------------------------------------------------------------------

static ITEM_ID_RE: OnceLock<Regex> = OnceLock::new();

fn item_id_re() -> &'static Regex {
    ITEM_ID_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_\-]*$").unwrap())
}

/// Item ids double as redb keys and export filename prefixes.
pub fn validate_item_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !item_id_re().is_match(id) {
        return Err(ScaleOpsError::InvalidItemId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

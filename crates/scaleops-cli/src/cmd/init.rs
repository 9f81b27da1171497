use crate::output::print_json;
use anyhow::Context;
use scaleops_core::{config::Config, io, paths, store::WorkspaceStore};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let project_name = match name {
        Some(n) => n.to_string(),
        None => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string()),
    };

    if !json {
        println!("Initializing ScaleOps workspace in: {}", root.display());
    }

    for dir in [paths::SCALEOPS_DIR, paths::EXPORTS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_path = paths::config_path(root);
    let created_config = !config_path.exists();
    if created_config {
        Config::new(&project_name)
            .save(root)
            .context("failed to write config.yaml")?;
    }
    let config = Config::load(root).context("failed to load config")?;

    let created_db = !paths::workspace_db_path(root).exists();
    WorkspaceStore::open_project(root, &config).context("failed to open workspace store")?;

    if json {
        print_json(&serde_json::json!({
            "root": root,
            "project": config.project.name,
            "created": {
                "config": created_config,
                "workspace": created_db,
            },
        }))?;
    } else {
        let status = |created: bool| if created { "created:" } else { "exists: " };
        println!("  {} {}", status(created_config), paths::CONFIG_FILE);
        println!("  {} {}", status(created_db), paths::WORKSPACE_DB);
    }
    Ok(())
}

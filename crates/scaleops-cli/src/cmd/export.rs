use crate::output::print_json;
use anyhow::Context;
use scaleops_core::types::ExportFormat;
use scaleops_core::workflow::Workflow;
use std::path::Path;

pub fn run(root: &Path, item: &str, format: &str, json: bool) -> anyhow::Result<()> {
    let format: ExportFormat = format.parse()?;
    let workflow = Workflow::open(root).context("failed to open workspace")?;
    let (file, path) = workflow
        .export_to_disk(root, item, format)
        .with_context(|| format!("failed to export '{item}'"))?;

    if json {
        return print_json(&serde_json::json!({
            "item": item,
            "requested": format,
            "format": file.format,
            "fallback": file.fallback_from.is_some(),
            "path": path,
            "bytes": file.bytes.len(),
        }));
    }

    if let Some(requested) = file.fallback_from {
        println!(
            "{} renderer unavailable; exported {} instead.",
            requested.as_str().to_uppercase(),
            file.format.as_str().to_uppercase()
        );
    }
    println!("Wrote {}", path.display());
    Ok(())
}

use crate::output::{print_json, print_table};
use anyhow::Context;
use scaleops_core::workflow::Workflow;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let workflow = Workflow::open(root).context("failed to open workspace")?;
    let store = workflow.store();

    let mut records = Vec::new();
    for id in store.list_items()? {
        if let Some(record) = store.load_record(&id)? {
            records.push(record);
        }
    }

    if json {
        let list: Vec<serde_json::Value> = records
            .iter()
            .map(|r| {
                serde_json::json!({
                    "itemId": r.item_id,
                    "revision": r.revision,
                    "answers": r.answers.len(),
                    "score": r.analysis.as_ref().map(|a| a.score),
                    "analyses": r.history.len(),
                    "activeTab": r.active_tab,
                    "updatedAt": r.updated_at,
                })
            })
            .collect();
        return print_json(&list);
    }

    if records.is_empty() {
        println!("No items yet. Save answers with 'scaleops answers save <item> --set FIELD=VALUE'.");
        return Ok(());
    }

    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.item_id.clone(),
                r.answers.len().to_string(),
                r.analysis
                    .as_ref()
                    .map(|a| a.score.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                r.history.len().to_string(),
                r.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    print_table(&["ITEM", "ANSWERS", "SCORE", "ANALYSES", "UPDATED"], rows);
    Ok(())
}

use crate::cmd::remote;
use crate::output::{print_json, print_table, truncate};
use anyhow::Context;
use scaleops_core::config::Config;
use scaleops_core::history;
use scaleops_core::workflow::Workflow;
use std::path::Path;

pub fn run(root: &Path, item: &str, from_remote: bool, json: bool) -> anyhow::Result<()> {
    let cards = if from_remote {
        let config = Config::load(root).context("failed to load config")?;
        let entries = remote::client(&config)?
            .fetch_history(item)
            .with_context(|| format!("cannot fetch remote history for '{item}'"))?;
        history::cards(&entries, &config.bands)
    } else {
        let workflow = Workflow::open(root).context("failed to open workspace")?;
        workflow.history_cards(item)?
    };

    if json {
        return print_json(&cards);
    }
    if cards.is_empty() {
        println!("No analyses recorded for '{item}'.");
        return Ok(());
    }

    let rows = cards
        .iter()
        .map(|c| {
            vec![
                format!("#{}", c.ordinal),
                c.recorded_at.format("%Y-%m-%d %H:%M").to_string(),
                c.score.to_string(),
                c.band.label().to_string(),
                truncate(&c.summary, 60),
            ]
        })
        .collect();
    print_table(&["#", "RECORDED", "SCORE", "BAND", "SUMMARY"], rows);
    Ok(())
}

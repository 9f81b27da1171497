use crate::cmd::remote;
use crate::output::{print_json, print_table, truncate};
use anyhow::Context;
use clap::Subcommand;
use scaleops_core::answers::{self, FormModel};
use scaleops_core::workflow::{SaveReport, SaveStatus, Workflow};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum AnswersSubcommand {
    /// Update answers for an item; unset fields keep their saved value
    Save {
        item: String,
        /// FIELD=VALUE (repeatable). An empty VALUE clears the field.
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment, required = true)]
        set: Vec<(String, String)>,
    },

    /// Show saved answers for an item
    Show {
        item: String,
        /// Read the backend's copy instead of the local store
        #[arg(long)]
        remote: bool,
    },
}

/// Parse `FIELD=VALUE`.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{s}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{s}'"));
    }
    Ok((field.to_string(), value.to_string()))
}

/// Saved answers for `item` with `set` applied on top.
pub fn merged_form(
    workflow: &Workflow,
    item: &str,
    set: Vec<(String, String)>,
) -> anyhow::Result<FormModel> {
    let saved = workflow
        .answers(item)
        .with_context(|| format!("failed to load answers for '{item}'"))?;
    let mut form = answers::to_form(&saved);
    form.extend(set);
    Ok(form)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: AnswersSubcommand, json: bool) -> anyhow::Result<()> {
    let workflow = Workflow::open(root).context("failed to open workspace")?;
    match subcmd {
        AnswersSubcommand::Save { item, set } => save(&workflow, &item, set, json),
        AnswersSubcommand::Show { item, remote } => show(&workflow, &item, remote, json),
    }
}

fn save(
    workflow: &Workflow,
    item: &str,
    set: Vec<(String, String)>,
    json: bool,
) -> anyhow::Result<()> {
    let form = merged_form(workflow, item, set)?;
    let report = workflow.autosave(item, &form)?;
    if json {
        return print_json(&report);
    }
    print_save_status(&report);
    Ok(())
}

fn print_save_status(report: &SaveReport) {
    match &report.save {
        SaveStatus::Saved { revision } => {
            let sync = report
                .sync
                .as_ref()
                .map(|s| format!(", {}", s.label()))
                .unwrap_or_default();
            println!(
                "Saved {} answer(s) for '{}' (revision {revision}{sync}).",
                report.answers.len(),
                report.item_id
            );
        }
        SaveStatus::Unsaved { reason } => {
            println!("Unsaved: {reason}. The last saved answers are unchanged.");
        }
    }
}

fn show(workflow: &Workflow, item: &str, from_remote: bool, json: bool) -> anyhow::Result<()> {
    let answers = if from_remote {
        remote::client(workflow.config())?
            .load_workspace(item)
            .with_context(|| format!("cannot load remote workspace for '{item}'"))?
            .answers
    } else {
        workflow.answers(item)?
    };
    if json {
        return print_json(&answers);
    }
    if answers.is_empty() {
        println!("No answers saved for '{item}'.");
        return Ok(());
    }
    let rows = answers
        .values()
        .map(|a| {
            vec![
                a.field_id.clone(),
                truncate(&a.label, 40),
                truncate(&a.value, 60),
            ]
        })
        .collect();
    print_table(&["FIELD", "LABEL", "VALUE"], rows);

    let missing = answers::missing_required(&workflow.config().worksheet, &answers);
    if !missing.is_empty() {
        println!("\nRequired before analyze: {}", missing.join(", "));
    }
    Ok(())
}

use crate::cmd::answers::merged_form;
use crate::cmd::remote;
use crate::output::{print_json, print_table};
use anyhow::Context;
use scaleops_core::analysis::AnalysisResult;
use scaleops_core::config::BandThresholds;
use scaleops_core::workflow::{SaveStatus, Workflow};
use std::path::Path;

pub fn run(
    root: &Path,
    item: &str,
    set: Vec<(String, String)>,
    on_remote: bool,
    json: bool,
) -> anyhow::Result<()> {
    let workflow = Workflow::open(root).context("failed to open workspace")?;
    let form = merged_form(&workflow, item, set)?;

    // Scored and recorded by the backend; nothing is written locally.
    if on_remote {
        let result = remote::client(workflow.config())?
            .remote_analyze(item, &form)
            .with_context(|| format!("remote analysis of '{item}' failed"))?;
        if json {
            return print_json(&result);
        }
        print_result(item, &result, &workflow.config().bands);
        println!("\nRecorded in remote history.");
        return Ok(());
    }

    let report = workflow
        .analyze(item, &form)
        .with_context(|| format!("cannot analyze '{item}'"))?;

    if json {
        return print_json(&report);
    }
    print_result(item, &report.result, &workflow.config().bands);

    match &report.save {
        SaveStatus::Saved { .. } => {
            if let Some(sync) = &report.sync {
                println!("\nRecorded in history ({}).", sync.label());
            } else {
                println!("\nRecorded in history.");
            }
        }
        SaveStatus::Unsaved { reason } => {
            println!("\nUnsaved: {reason}. This result was not recorded.");
        }
    }
    Ok(())
}

fn print_result(item: &str, result: &AnalysisResult, bands: &BandThresholds) {
    println!(
        "{item}: {}/100 ({})",
        result.score,
        bands.band(result.score).label()
    );
    println!("{}\n", result.summary);

    let rows = result
        .dimensions
        .iter()
        .map(|d| {
            vec![
                d.name.clone(),
                format!("{}/{}", d.score, d.max),
                format!("{}%", d.percent()),
            ]
        })
        .collect();
    print_table(&["DIMENSION", "POINTS", "SCORE"], rows);

    println!("\nStrengths:");
    for s in &result.strengths {
        println!("  + {s}");
    }
    println!("Areas to improve:");
    for w in &result.weaknesses {
        println!("  - {w}");
    }
}

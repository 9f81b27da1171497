use crate::output::{print_json, print_table, truncate};
use anyhow::Context;
use scaleops_core::types::Tab;
use scaleops_core::view::ViewContent;
use scaleops_core::workflow::Workflow;
use std::path::Path;

pub fn run(root: &Path, item: &str, tab: Option<&str>, json: bool) -> anyhow::Result<()> {
    let workflow = Workflow::open(root).context("failed to open workspace")?;
    let mut machine = workflow.tab_machine(item)?;

    let (switched, content) = match tab {
        Some(t) => {
            let target: Tab = t.parse()?;
            match workflow.switch_tab(&mut machine, item, target) {
                Some(content) => (true, content),
                None => (false, machine.render_active(&workflow.view_context(item))),
            }
        }
        None => (false, machine.render_active(&workflow.view_context(item))),
    };
    let active = machine.active();

    if json {
        return print_json(&serde_json::json!({
            "item": item,
            "activeTab": active,
            "switched": switched,
            "content": content,
        }));
    }

    let tabs: Vec<String> = Tab::all()
        .iter()
        .map(|t| {
            if *t == active {
                format!("[{}]", t.title())
            } else {
                t.title().to_string()
            }
        })
        .collect();
    println!("{}\n", tabs.join("  "));
    print_content(&content);
    Ok(())
}

fn print_content(content: &ViewContent) {
    match content {
        ViewContent::Lessons { lessons } => {
            for (i, lesson) in lessons.iter().enumerate() {
                println!("{}. {lesson}", i + 1);
            }
        }
        ViewContent::Worksheet { fields } => {
            let rows = fields
                .iter()
                .map(|f| {
                    let label = if f.required {
                        format!("{} *", f.label)
                    } else {
                        f.label.clone()
                    };
                    vec![
                        f.id.clone(),
                        truncate(&label, 40),
                        truncate(f.value.as_deref().unwrap_or("-"), 50),
                    ]
                })
                .collect();
            print_table(&["FIELD", "LABEL", "ANSWER"], rows);
        }
        ViewContent::Analysis { result } => {
            println!("Score: {}/100", result.score);
            println!("{}", result.summary);
            for d in &result.dimensions {
                println!("  {}: {}%", d.name, d.percent());
            }
        }
        ViewContent::Formats { formats } => {
            let names: Vec<&str> = formats.iter().map(|f| f.as_str()).collect();
            println!("Export formats: {}", names.join(", "));
        }
        ViewContent::Resources { links } => {
            for link in links {
                println!("- {}: {}", link.title, link.url);
            }
        }
        ViewContent::History { cards } => {
            for card in cards {
                println!("{}  {} ({})", card.title(), card.score, card.band.label());
            }
        }
        ViewContent::Notice { message } => println!("{message}"),
    }
}

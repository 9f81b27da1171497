mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{answers::AnswersSubcommand, config::ConfigSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "scaleops",
    about = "Assessment workspace: fill worksheets, score them, track history and export reports",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .scaleops/)
    #[arg(long, global = true, env = "SCALEOPS_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a workspace in the current project
    Init {
        /// Project name (default: directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Save or show worksheet answers
    Answers {
        #[command(subcommand)]
        subcommand: AnswersSubcommand,
    },

    /// Score an item's answers and record the result in history
    Analyze {
        item: String,
        /// Answer to set before scoring, as FIELD=VALUE (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = cmd::answers::parse_assignment)]
        set: Vec<(String, String)>,
        /// Score on the backend instead of locally
        #[arg(long)]
        remote: bool,
    },

    /// Show past analyses for an item, newest first
    History {
        item: String,
        /// Read the backend's history instead of the local store
        #[arg(long)]
        remote: bool,
    },

    /// Export an item as a document
    Export {
        item: String,
        /// pdf, docx, html, txt or zip
        #[arg(long, short = 'f', default_value = "pdf")]
        format: String,
    },

    /// Show the active tab for an item, or switch to another tab
    Tab {
        item: String,
        /// education, workspace, analysis, output, resources or history
        tab: Option<String>,
    },

    /// List items with saved state
    Items,

    /// Show or validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Run the workspace backend
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "3141")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref(), cli.json),
        Commands::Answers { subcommand } => cmd::answers::run(&root, subcommand, cli.json),
        Commands::Analyze { item, set, remote } => {
            cmd::analyze::run(&root, &item, set, remote, cli.json)
        }
        Commands::History { item, remote } => cmd::history::run(&root, &item, remote, cli.json),
        Commands::Export { item, format } => cmd::export::run(&root, &item, &format, cli.json),
        Commands::Tab { item, tab } => cmd::tab::run(&root, &item, tab.as_deref(), cli.json),
        Commands::Items => cmd::items::run(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

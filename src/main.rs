use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

use orchestra_bridge::client::PanelClient;
use orchestra_bridge::config::loader;
use orchestra_bridge::config::types::BridgeConfig;
use orchestra_bridge::detector::{Detector, PageEvent};
use orchestra_bridge::router::{BackendRouter, ImportRequest, Router, RouterHandle};
use orchestra_bridge::terminal::TerminalDocument;
use orchestra_bridge::types::{ImportMode, Placement, Record};
use orchestra_bridge::url::detect_issue;

#[derive(Parser)]
#[command(
    name = "orchestra-bridge",
    version,
    about = "Issue detection and backend routing for the Orchestra browser extension"
)]
struct Cli {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging to debug.log.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the issue detected at each URL.
    Detect {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// List backend projects.
    Projects,
    /// List the epics of a project.
    Epics { project: String },
    /// List the stories of an epic.
    Stories { project: String, epic: String },
    /// Import the issue at URL into the backend.
    Import {
        url: String,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        epic: Option<String>,
        #[arg(long)]
        story: Option<String>,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Run a detector over locations read from stdin, one per line.
    ///
    /// A line `!click` presses the import button for the shown issue.
    Watch,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Create,
    Link,
}

impl From<ModeArg> for ImportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Create => ImportMode::Create,
            ModeArg::Link => ImportMode::Link,
        }
    }
}

const CLICK: &str = "!click";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    let config = loader::load_config(cli.config.as_deref())?;
    tracing::info!(
        "{} bridge {} starting, backend {}",
        config.extension.name,
        config.extension.version,
        config.backend.base_url()
    );

    match cli.command {
        Commands::Detect { urls } => {
            for url in urls {
                match detect_issue(&url) {
                    Some(issue) => println!("{}\t{}\t{url}", issue.service, issue.issue_id),
                    None => println!("-\t-\t{url}"),
                }
            }
            Ok(())
        }
        Commands::Projects => {
            let client = PanelClient::connect(start_router(&config)?);
            print_records(&client.list_projects().await)
        }
        Commands::Epics { project } => {
            let client = PanelClient::connect(start_router(&config)?);
            print_records(&client.list_epics(&project).await)
        }
        Commands::Stories { project, epic } => {
            let client = PanelClient::connect(start_router(&config)?);
            print_records(&client.list_stories(&project, &epic).await)
        }
        Commands::Import {
            url,
            project,
            epic,
            story,
            mode,
        } => {
            let issue = detect_issue(&url)
                .ok_or_else(|| anyhow::anyhow!("no supported issue detected at {url}"))?;
            let defaults = config.detector.placement();
            let placement = Placement {
                project: project.or(defaults.project),
                epic: epic.or(defaults.epic),
                story: story.or(defaults.story),
            };
            let mode = mode.map_or(config.detector.import_mode, ImportMode::from);

            let client = PanelClient::connect(start_router(&config)?);
            let outcome = client
                .import_issue(ImportRequest::new(issue, placement, mode))
                .await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.success {
                bail!(
                    "import failed: {}",
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
            }
            Ok(())
        }
        Commands::Watch => {
            let router = start_router(&config)?;
            watch_stdin(&config, router).await
        }
    }
}

fn init_tracing(debug: bool) -> Result<()> {
    if debug {
        let file = std::fs::File::create("debug.log").context("creating debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }
    Ok(())
}

fn start_router(config: &BridgeConfig) -> Result<RouterHandle> {
    let router = BackendRouter::new(&config.backend).context("initialising backend client")?;
    Ok(router.spawn())
}

fn print_records(records: &[Record]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}

/// Feed stdin lines to a detector as page locations.
async fn watch_stdin(config: &BridgeConfig, router: RouterHandle) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let Some(first) = lines.next_line().await? else {
        return Ok(());
    };

    let (location_tx, location_rx) = watch::channel(first.trim().to_owned());
    let document = TerminalDocument::new(location_rx, std::io::stdout());
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (ack_tx, mut ack_rx) = mpsc::unbounded_channel();

    let detector = Detector::new(document, router, config).with_acknowledgments(ack_tx);
    let detector_task = tokio::spawn(detector.run(events_rx));
    let ack_task = tokio::spawn(async move {
        while let Some(ack) = ack_rx.recv().await {
            match (ack.outcome.success, ack.outcome.task_id, ack.outcome.error) {
                (true, task_id, _) => println!(
                    "[ok] {} imported as {}",
                    ack.issue_id,
                    task_id.as_deref().unwrap_or("?")
                ),
                (false, _, error) => println!(
                    "[!!] {} not imported: {}",
                    ack.issue_id,
                    error.as_deref().unwrap_or("unknown error")
                ),
            }
        }
    });

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event = if line == CLICK {
            PageEvent::Activated
        } else {
            location_tx.send_replace(line.to_owned());
            PageEvent::Mutated
        };
        if events_tx.send(event).is_err() {
            break;
        }
    }

    let _ = events_tx.send(PageEvent::Unloaded);
    detector_task.await.context("detector task")?;
    // Wait for in-flight imports to report before exiting.
    ack_task.await.context("acknowledgment task")?;
    Ok(())
}

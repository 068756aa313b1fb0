use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ardoq_sync::ardoq::NodeSource;
use ardoq_sync::config::Config;
use ardoq_sync::models::Node;
use ardoq_sync::progress::TracingSink;
use ardoq_sync::sync::SyncOrchestrator;
use ardoq_sync::{api, hierarchy, tree_render};

#[derive(Parser)]
#[command(name = "ardoq-sync")]
#[command(about = "Replicate Ardoq initiatives into Azure DevOps work items")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port for HTTP API (defaults to ARDOQ_SYNC_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the hierarchy as a tree
    Tree {
        /// JSON file with a flat node list (fetched from Ardoq when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Parent id marking top-level domains
        #[arg(short, long)]
        root: Option<String>,
    },
    /// Replicate one initiative into an Azure DevOps project
    Sync {
        /// Target Azure DevOps project
        #[arg(long)]
        project: String,

        /// Initiative whose epics are replicated
        #[arg(long)]
        initiative: String,

        /// JSON file with a flat node list (fetched from Ardoq when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Parent id marking top-level domains
        #[arg(short, long)]
        root: Option<String>,

        /// Delete existing epics, features and user stories first
        #[arg(long)]
        overwrite: bool,
    },
}

/// Initialize tracing with output to stderr, keeping stdout for command output
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "ardoq_sync=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn load_nodes(config: &Config, input: Option<&Path>) -> anyhow::Result<Vec<Node>> {
    match input {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Invalid node list in {}", path.display()))
        }
        None => Ok(config.ardoq_client()?.fetch_nodes().await?),
    }
}

async fn serve(config: &Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting ardoq-sync server on port {}", port);

    let state = api::AppState::from_config(config)?;
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("ardoq-sync server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env();

    match cli.command {
        Some(Commands::Serve { port }) => {
            serve(&config, port.unwrap_or(config.port)).await?;
        }
        Some(Commands::Tree { input, root }) => {
            let nodes = load_nodes(&config, input.as_deref()).await?;
            let root = root.unwrap_or_else(|| config.root_id.clone());
            let forest = hierarchy::build(&nodes, &root)?;
            print!("{}", tree_render::render_tree(&forest));
        }
        Some(Commands::Sync {
            project,
            initiative,
            input,
            root,
            overwrite,
        }) => {
            let nodes = load_nodes(&config, input.as_deref()).await?;
            let root = root.unwrap_or_else(|| config.root_id.clone());
            let forest = hierarchy::build(&nodes, &root)?;
            let epics = hierarchy::epics_for_initiative(&forest, &initiative)
                .with_context(|| format!("Initiative not found: {}", initiative))?;

            let client = config.devops_client()?;
            let mapper = config.field_mapper()?;
            let report = SyncOrchestrator::new(&client, &mapper, &TracingSink)
                .with_delete_chunk_size(config.delete_chunk_size)
                .sync(epics, &project, overwrite)
                .await?;

            println!("{}", serde_json::to_string_pretty(&report.summary)?);
        }
        None => {
            serve(&config, config.port).await?;
        }
    }

    Ok(())
}

//! # Idleq - Media Task Queue Synchronizer
//!
//! A CLI companion that queues media items found while browsing for later
//! idle-time processing by a separate desktop application.
//!
//! ## Features
//!
//! - **Best-Effort Delivery**: Tasks are handed to the companion app over HTTP
//!   with a bounded timeout, and kept locally whenever it is unreachable
//! - **Durable Local Queue**: The user's request is never lost because the
//!   companion app happens to be offline
//! - **Deduplication**: The same source URL is never queued twice
//! - **Maintenance**: Stale tasks are evicted after 24 hours, one-shot or from
//!   a long-running watcher
//! - **Signal Handling**: The watcher shuts down gracefully on SIGINT
//!
//! ## Usage
//!
//! ```bash
//! # Queue a video for idle-time processing
//! idleq add "https://youtube.com/watch?v=abc" --title "Some talk"
//!
//! # Show the local queue
//! idleq list
//!
//! # Probe the companion app
//! idleq check
//!
//! # Export the queue to a portable JSON file
//! idleq export
//!
//! # Run periodic maintenance until interrupted
//! idleq watch
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use idleq::commands::{
    add::AddCommand, check::CheckCommand, clear::ClearCommand, config::ConfigCommand,
    export::ExportCommand, list::ListCommand, sweep::SweepCommand, watch::WatchCommand,
};
use idleq::config::default_state_dir;
use idleq::task::Platform;

/// Idleq - A media task queue synchronizer
#[derive(Parser)]
#[command(
    name = "idleq",
    about = "A CLI companion that queues media tasks for idle-time processing",
    long_about = "Queues media items for later offline processing by a companion desktop application, notifying it over HTTP when it is reachable and falling back to a durable local queue when it is not.",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Queue a media item and notify the companion app
    Add {
        /// Source URL of the media item
        url: String,
        /// Display title for the item
        #[arg(long, short = 't')]
        title: String,
        /// Platform the item belongs to (inferred from the URL when omitted)
        #[arg(long, short = 'p', value_enum)]
        platform: Option<Platform>,
        /// Post author (twitter items)
        #[arg(long)]
        author: Option<String>,
        /// Post text (twitter items)
        #[arg(long)]
        text: Option<String>,
        /// Uploader name (bilibili items)
        #[arg(long)]
        uploader: Option<String>,
        /// Video id (bilibili items)
        #[arg(long)]
        video_id: Option<String>,
        /// Directory holding the queue and settings files
        #[arg(long, short = 's', env = "IDLEQ_STATE_DIR")]
        state_dir: Option<PathBuf>,
    },
    /// Print the queued tasks as JSON
    List {
        /// Directory holding the queue and settings files
        #[arg(long, short = 's', env = "IDLEQ_STATE_DIR")]
        state_dir: Option<PathBuf>,
    },
    /// Drop every queued task
    Clear {
        /// Directory holding the queue and settings files
        #[arg(long, short = 's', env = "IDLEQ_STATE_DIR")]
        state_dir: Option<PathBuf>,
    },
    /// Write the queue to a portable JSON file
    Export {
        /// Directory to write the export file into (defaults to the current directory)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Directory holding the queue and settings files
        #[arg(long, short = 's', env = "IDLEQ_STATE_DIR")]
        state_dir: Option<PathBuf>,
    },
    /// Probe the companion app's health endpoint
    Check {
        /// Directory holding the queue and settings files
        #[arg(long, short = 's', env = "IDLEQ_STATE_DIR")]
        state_dir: Option<PathBuf>,
    },
    /// View or update the persisted settings
    Config {
        /// Base address of the companion app's HTTP API
        #[arg(long)]
        api_url: Option<String>,
        /// Start of the idle processing window (HH:MM)
        #[arg(long)]
        idle_start: Option<String>,
        /// End of the idle processing window (HH:MM)
        #[arg(long)]
        idle_end: Option<String>,
        /// Directory holding the queue and settings files
        #[arg(long, short = 's', env = "IDLEQ_STATE_DIR")]
        state_dir: Option<PathBuf>,
    },
    /// Evict tasks older than the retention window
    Sweep {
        /// Directory holding the queue and settings files
        #[arg(long, short = 's', env = "IDLEQ_STATE_DIR")]
        state_dir: Option<PathBuf>,
    },
    /// Run periodic maintenance until interrupted
    Watch {
        /// Directory holding the queue and settings files
        #[arg(long, short = 's', env = "IDLEQ_STATE_DIR")]
        state_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "idleq=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Add {
            url,
            title,
            platform,
            author,
            text,
            uploader,
            video_id,
            state_dir,
        } => {
            let state_root = state_dir.unwrap_or_else(default_state_dir);
            info!("Starting add command for url: {}, state: {:?}", url, state_root);
            AddCommand::new(
                url, title, platform, author, text, uploader, video_id, state_root,
            )
            .execute()
            .await
        }
        Commands::List { state_dir } => {
            let state_root = state_dir.unwrap_or_else(default_state_dir);
            ListCommand::new(state_root).execute().await
        }
        Commands::Clear { state_dir } => {
            let state_root = state_dir.unwrap_or_else(default_state_dir);
            info!("Starting clear command for state: {:?}", state_root);
            ClearCommand::new(state_root).execute().await
        }
        Commands::Export { output, state_dir } => {
            let state_root = state_dir.unwrap_or_else(default_state_dir);
            let output_dir = output.unwrap_or_else(|| std::env::current_dir().unwrap());
            info!(
                "Starting export command for state: {:?}, output: {:?}",
                state_root, output_dir
            );
            ExportCommand::new(state_root, output_dir)
                .execute()
                .await
                .map(|_| ())
        }
        Commands::Check { state_dir } => {
            let state_root = state_dir.unwrap_or_else(default_state_dir);
            CheckCommand::new(state_root).execute().await
        }
        Commands::Config {
            api_url,
            idle_start,
            idle_end,
            state_dir,
        } => {
            let state_root = state_dir.unwrap_or_else(default_state_dir);
            ConfigCommand::new(api_url, idle_start, idle_end, state_root)
                .execute()
                .await
        }
        Commands::Sweep { state_dir } => {
            let state_root = state_dir.unwrap_or_else(default_state_dir);
            info!("Starting sweep command for state: {:?}", state_root);
            SweepCommand::new(state_root).execute().await
        }
        Commands::Watch { state_dir } => {
            let state_root = state_dir.unwrap_or_else(default_state_dir);
            info!("Starting watch command for state: {:?}", state_root);
            WatchCommand::new(state_root).execute().await
        }
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dps_meter_cli::{commands, logging};

#[derive(Parser)]
#[command(version, about = "Per-target damage-per-second meter")]
struct Cli {
    /// Config file to use instead of the platform config directory
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded JSON-lines event file
    Replay {
        #[arg(short, long)]
        path: PathBuf,
        /// Also print the live overlay snapshots
        #[arg(long)]
        overlay: bool,
    },
    /// Read JSON-lines events from stdin in real time
    Live {
        #[arg(long)]
        overlay: bool,
    },
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Replay { path, overlay } => commands::replay(path, &config, *overlay),
        Commands::Live { overlay } => commands::live(&config, *overlay).await,
        Commands::Config => commands::show_config(&config),
    }
}

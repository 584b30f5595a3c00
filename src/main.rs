use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{
    ConfigCommand, ExportCommand, MergeCommand, SessionCommand, WeightCommand, WorkoutCommand,
};
use gain::Config;

#[derive(Parser)]
#[command(name = "gain")]
#[command(version)]
#[command(about = "A local-first fitness tracking CLI", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage logged workouts
    Workout(WorkoutCommand),

    /// Manage body-weight entries
    Weight(WeightCommand),

    /// Drive a live workout session
    Session(SessionCommand),

    /// Merge a peer device's exported collection
    Merge(MergeCommand),

    /// Export workouts as CSV
    Export(ExportCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gain=warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Workout(cmd)) => cmd.run(&config).await?,
        Some(Commands::Weight(cmd)) => cmd.run(&config).await?,
        Some(Commands::Session(cmd)) => cmd.run(&config).await?,
        Some(Commands::Merge(cmd)) => cmd.run(&config).await?,
        Some(Commands::Export(cmd)) => cmd.run(&config).await?,
        Some(Commands::Config(cmd)) => cmd.run(&config)?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

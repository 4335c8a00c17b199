use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::error;

mod cli;

use cli::*;
use songbook::config::Config;
use songbook::services::SimpleServices;
use songbook::{Result, SongbookError};

#[derive(Parser)]
#[command(name = "songbook")]
#[command(about = "Song catalog with filtered search and verse-by-verse lyrics")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the catalog database if it does not exist
    Init(init::InitArgs),

    /// Add a song to the catalog
    Add(add::AddArgs),

    /// List songs matching optional filters
    List(list::ListArgs),

    /// Update lyrics, link or release date of a song
    Update(update::UpdateArgs),

    /// Delete a song
    Delete(delete::DeleteArgs),

    /// Print a window of a song's verses
    Text(text::TextArgs),

    /// Show configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = songbook::utils::logging::init_logging(cli.verbose) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            exit_code(&e)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = Config::resolve_path(cli.config.as_deref())?;
    let config = Config::load_from(&config_path)?;
    let services = SimpleServices::new(config, config_path);

    match cli.command {
        Commands::Init(args) => init::execute(args, &services).await,
        Commands::Add(args) => add::execute(args, &services).await,
        Commands::List(args) => list::execute(args, &services).await,
        Commands::Update(args) => update::execute(args, &services).await,
        Commands::Delete(args) => delete::execute(args, &services).await,
        Commands::Text(args) => text::execute(args, &services).await,
        Commands::Config(args) => config::execute(args, &services).await,
    }
}

fn exit_code(err: &SongbookError) -> ExitCode {
    if err.is_not_found() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

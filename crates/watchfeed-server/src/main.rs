use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::eyre;
use commands::{analytics, config, feed, serve};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;
mod server;

#[derive(Parser)]
#[command(name = "watchfeed")]
#[command(about = "watchfeed - Letterboxd watch history, posters and viewing stats over HTTP")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Config file (defaults to $WATCHFEED_CONFIG, then the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    #[command(long_about = "Serve GET /api/letterboxd, POST /api/letterboxd-analytics and GET /api/letterboxd-stats. Every request fetches the feed fresh; nothing is cached.")]
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fetch and print a member's most recent film watches
    Feed {
        /// Letterboxd username (defaults to letterboxd.username)
        username: Option<String>,

        /// Skip the TMDB poster lookups
        #[arg(long, action = ArgAction::SetTrue)]
        no_posters: bool,
    },
    /// Print viewing statistics for a member
    Analytics {
        /// Letterboxd username (defaults to letterboxd.username)
        username: Option<String>,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration (masks the TMDB api key)
    Show {
        /// Show the api key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let config_path = commands::config_path(cli.config.as_deref());
    let app_config = commands::load_config(&config_path)?;

    logging::init_logging(cli.verbose, cli.quiet, &app_config.logging).map_err(|e| eyre!("{}", e))?;
    app_config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", config_path.display(), e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Serve { host, port } => serve::run_serve(app_config, host, port, &output).await,
        Commands::Feed { username, no_posters } => feed::run_feed(&app_config, username, no_posters, &output).await,
        Commands::Analytics { username } => analytics::run_analytics(&app_config, username, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &app_config, &config_path, &output),
    }
}

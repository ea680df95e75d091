use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;

use context::{Context, GlobalArgs};

#[derive(Parser)]
#[command(
    name = "plugwatch",
    version,
    about = "Tuya smart plug history. Run `record` from cron to log the plug state periodically."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show detailed plug info
    Info,
    /// Show On/Off status
    Status {
        /// Power threshold (W) to detect active usage
        #[arg(long, env = "THRESHOLD")]
        threshold: Option<f64>,
    },
    /// Record the device state to the history database (intended for cron)
    Record {
        /// Power threshold (W) to detect active usage
        #[arg(long, env = "THRESHOLD")]
        threshold: Option<f64>,
    },
    /// Print status ranges, newest first
    History {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print raw recorded events, oldest first
    Log {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// API credentials in the OS keyring
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "plugwatch=debug,plugwatch_core=debug"
    } else {
        "plugwatch=info,plugwatch_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(cli.global)?;
    match cli.command {
        Commands::Info => commands::info::run(&ctx),
        Commands::Status { threshold } => commands::status::run(&ctx, threshold),
        Commands::Record { threshold } => commands::record::run(&ctx, threshold),
        Commands::History { json } => commands::history::run(&ctx, json),
        Commands::Log { json } => commands::log::run(&ctx, json),
        Commands::Config { action } => commands::config::run(&ctx, action),
        Commands::Auth { action } => commands::auth::run(&ctx, action),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

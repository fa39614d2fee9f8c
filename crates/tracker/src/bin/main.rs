use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracker::args::ServeArgs;
use tracker::commands::Commands;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum LoggingMode {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl From<LoggingMode> for logutil::LoggingMode {
    fn from(mode: LoggingMode) -> Self {
        match mode {
            LoggingMode::Pretty => logutil::LoggingMode::Pretty,
            LoggingMode::Json => logutil::LoggingMode::Json,
            LoggingMode::Compact => logutil::LoggingMode::Compact,
        }
    }
}

#[derive(Parser)]
#[clap(name = "tracker")]
#[clap(version)]
#[clap(about = "Vehicle shipment tracker", long_about = None)]
struct Cli {
    /// Log verbosity.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format.
    #[clap(long, value_enum, global = true)]
    log_mode: Option<LoggingMode>,

    #[clap(subcommand)]
    command: Option<Commands>,

    // Running without a subcommand serves, so accept serve args at the top
    // level too.
    #[clap(flatten)]
    serve_args: ServeArgs,
}

fn main() -> Result<()> {
    // Missing .env is fine.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    let command = match cli.command {
        Some(command) => command,
        None => Commands::Serve(cli.serve_args),
    };

    // Keep fetch output clean unless logging was asked for.
    match (&command, cli.log_mode, cli.verbose) {
        (Commands::Fetch(_), None, 0) => (),
        _ => logutil::init(cli.verbose, cli.log_mode.unwrap_or_default().into()),
    }

    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "loaded environment file");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "starting...");

    command.run()
}

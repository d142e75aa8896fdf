use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ratewatch::cli::setup::setup;
use ratewatch::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for ratewatch::AppCommand {
    fn from(cmd: Commands) -> ratewatch::AppCommand {
        match cmd {
            Commands::Rate { from, to } => ratewatch::AppCommand::Rate { from, to },
            Commands::Show => ratewatch::AppCommand::Show,
            Commands::Overview => ratewatch::AppCommand::Overview,
            Commands::Watch => ratewatch::AppCommand::Watch,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the exchange rate for one currency pair
    Rate {
        /// Currency to convert from, e.g. USD
        from: String,
        /// Currency to convert to, e.g. THB
        to: String,
    },
    /// Display rates for all configured pairs
    Show,
    /// Display all cached rates, newest first
    Overview,
    /// Display configured pairs and keep refreshing them until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => ratewatch::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

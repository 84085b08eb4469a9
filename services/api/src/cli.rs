use clap::{Args, Parser, Subcommand};
use evidence_engine::error::AppError;

use crate::commands::{run_analyze, run_conditions, run_summary, AnalyzeArgs, SummaryArgs};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Evidence Engine",
    about = "Analyze logged health observations against condition rating schedules",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Analyze one condition from an observation file
    Analyze(AnalyzeArgs),
    /// Analyze every registered condition from an observation file
    Summary(SummaryArgs),
    /// List the registered conditions and their rating tiers
    Conditions,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Analyze(args) => run_analyze(args),
        Command::Summary(args) => run_summary(args),
        Command::Conditions => run_conditions(),
    }
}

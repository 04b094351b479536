use crate::report::{run_positions_report, run_stats_report, PositionsArgs, StatsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use ghr_impact::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "GHR Impact",
    about = "Serve or query the reconciled B4/VNDLY staffing positions",
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
    /// Run one reconciliation and print the result
    Positions(PositionsArgs),
    /// Print current assignments and upcoming starts
    Stats(StatsArgs),
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
        Command::Positions(args) => run_positions_report(args),
        Command::Stats(args) => run_stats_report(args),
    }
}

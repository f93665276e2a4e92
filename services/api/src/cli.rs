use crate::demo::{
    run_demo, run_financing_schedule, run_ledger_import, DemoArgs, ImportArgs, ScheduleArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mietwerk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Mietwerk",
    about = "Run the rent ledger and financing service from the command line",
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
    /// Loan amortization tooling
    Financing {
        #[command(subcommand)]
        command: FinancingCommand,
    },
    /// Rent ledger tooling
    Ledger {
        #[command(subcommand)]
        command: LedgerCommand,
    },
    /// Walk through the rent ledger and index adjustment end to end
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum FinancingCommand {
    /// Compute and print the monthly schedule with its aggregates
    Schedule(ScheduleArgs),
}

#[derive(Subcommand, Debug)]
enum LedgerCommand {
    /// Import a rent period CSV export and print the resulting history
    Import(ImportArgs),
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
        Command::Financing {
            command: FinancingCommand::Schedule(args),
        } => run_financing_schedule(args),
        Command::Ledger {
            command: LedgerCommand::Import(args),
        } => run_ledger_import(args),
        Command::Demo(args) => run_demo(args),
    }
}

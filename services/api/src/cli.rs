use crate::demo::{run_aggregate, run_demo, AggregateArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use recruit_portal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Recruiting Portal",
    about = "Serve the recruiting portal scorecard API or aggregate scorecards offline",
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
    /// Work with scorecard exports
    Scorecard {
        #[command(subcommand)]
        command: ScorecardCommand,
    },
    /// Seed an in-memory portal and print aggregates and ranking
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ScorecardCommand {
    /// Aggregate a JSON export of a configuration and its submissions
    Aggregate(AggregateArgs),
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
        Command::Scorecard {
            command: ScorecardCommand::Aggregate(args),
        } => run_aggregate(args),
        Command::Demo(args) => run_demo(args),
    }
}

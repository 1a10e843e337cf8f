use crate::commands::{run_list, run_submit, SubmitArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use crew_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Crew Intake",
    about = "Collect recruitment applications and relay them to a chat webhook",
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
    /// Submit one application from the command line using the configured store and webhook
    Submit(SubmitArgs),
    /// Print the applications held by the configured CSV store
    List,
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
        Command::Submit(args) => run_submit(args).await,
        Command::List => run_list(),
    }
}

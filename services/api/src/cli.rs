use crate::demo::{run_demo, run_evaluate, run_rules, DemoArgs, EvaluateArgs, RulesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use firesafe_review::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "firesafe-review",
    about = "Review building project submissions against the Egyptian Fire Code",
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
    /// Evaluate a project submission read from a JSON file
    Evaluate(EvaluateArgs),
    /// List fire code rules, optionally filtered
    Rules(RulesArgs),
    /// Walk three sample submissions through evaluation and reporting
    Demo(DemoArgs),
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
        Command::Evaluate(args) => run_evaluate(args).await,
        Command::Rules(args) => run_rules(args),
        Command::Demo(args) => run_demo(args).await,
    }
}

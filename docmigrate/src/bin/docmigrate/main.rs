mod commands;
mod context;
mod examples;
mod output;
mod theme;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use commands::{
    init::{InitArgs, handle_init},
    ledger::{ForceArgs, handle_force, handle_history, handle_status},
};
use output::{GlobalOptions, OutputFormat, OutputManager};

const ENVIRONMENT_HELP: &str = "Environment:
  REDIS_URL  Redis connection URL of the migration ledger
  RUST_LOG   Log filter, e.g. docmigrate=debug";

#[derive(Parser)]
#[command(name = "docmigrate")]
#[command(version)]
#[command(
    about = "Inspect and repair the docmigrate version ledger",
    long_about = r#"Operator CLI for the docmigrate version ledger.

Migrations are compiled into your application and run through the
docmigrate library. This tool reads and repairs the ledger they write.

Commands:
  init      Write .docmigrate/config.toml
  status    Show the current database version
  history   List every ledger entry
  force     Record a version without running migrations
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Ledger collection, overriding the config file
    #[arg(long, global = true)]
    collection: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn command_with_examples() -> clap::Command {
        examples::with_examples(Cli::command().after_long_help(ENVIRONMENT_HELP))
    }

    fn parse_with_examples() -> Self {
        let matches = Self::command_with_examples().get_matches();
        Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize docmigrate in the current project
    Init(InitArgs),

    /// Show the current database version
    Status,

    /// List every ledger entry, oldest first
    History,

    /// Record a version as current without running any migration
    Force(ForceArgs),
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse_with_examples();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output.clone(),
        quiet: cli.quiet,
        no_color: cli.no_color,
    });

    if let Err(err) = execute(cli, &output).await {
        output.error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

async fn execute(cli: Cli, output: &OutputManager) -> Result<()> {
    let collection = cli.collection.as_deref();

    match cli.command {
        Commands::Init(args) => handle_init(args, output).await,
        Commands::Status => handle_status(collection, output).await,
        Commands::History => handle_history(collection, output).await,
        Commands::Force(args) => handle_force(args, collection, output).await,
    }
}

pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "lexbook",
    about = "Lexbook operator CLI",
    long_about = "Initialize the booking database, inspect its contents, check readiness, and show effective configuration.",
    after_help = "Examples:\n  lexbook init\n  lexbook status\n  lexbook doctor --json\n  lexbook config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply migrations and seed the lawyer roster (idempotent)")]
    Init,
    #[command(about = "Report tables, record counts, and the lawyer roster")]
    Status,
    #[command(about = "Validate config, LLM and availability settings, and database readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Init => commands::init::run(),
        Command::Status => commands::status::run(),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

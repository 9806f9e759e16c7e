// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mqsubmit: submit MaxQuant jobs to transient cloud workers

mod backend;
mod commands;
mod env;
mod exit_error;
mod logging;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use exit_error::ExitError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mqsubmit",
    version,
    about = "Submit MaxQuant jobs to transient cloud workers"
)]
struct Cli {
    /// Deployment profile (default: $MQSUBMIT_PROFILE, then the user config dir)
    #[arg(long, global = true, value_name = "TOML")]
    profile: Option<PathBuf>,

    /// Log pipeline progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a job and start a worker for it
    Submit(commands::submit::SubmitArgs),
    /// Show the stage of a submitted job
    Status(commands::status::StatusArgs),
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<ExitError>() {
            Some(exit) => {
                eprintln!("Error: {}", exit.message);
                std::process::exit(exit.code);
            }
            None => {
                eprintln!("Error: {e:#}");
                std::process::exit(1);
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    logging::init(cli.verbose);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let profile = backend::load_profile(cli.profile.as_deref())?;
    match command {
        Commands::Submit(args) => commands::submit::handle(args, profile).await,
        Commands::Status(args) => commands::status::handle(args, profile).await,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod paths;
mod platform;
mod provider;
mod report;

use cli::{Args, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    commands::utils::init_logging(args.verbose);

    match args.command.unwrap_or(Commands::Apply) {
        Commands::Apply => commands::run_apply(&args),
        Commands::Path => commands::run_path(&args),
        Commands::List => commands::run_list(&args),
    }
}

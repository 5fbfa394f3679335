mod app;
mod cli;
mod config;
mod effects;
mod intake;
mod render;

use std::process::ExitCode;

use clap::Parser;
use engine_logging::{engine_error, engine_warn};

use crate::cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, config_error) = match config::load_config(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(err) => (config::AppConfig::default(), Some(err)),
    };
    let destination = cli.log.unwrap_or_else(|| config.log_destination());
    engine_logging::initialize(destination, config.log_level(), None);
    if let Some(err) = config_error {
        engine_warn!("{err}; using defaults");
    }

    match cli.command {
        Command::List => {
            print!("{}", render::tool_catalog());
            ExitCode::SUCCESS
        }
        Command::Run(args) => match app::run_tool(args, config) {
            Ok(code) => code,
            Err(err) => {
                engine_error!("{err:#}");
                eprintln!("error: {err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

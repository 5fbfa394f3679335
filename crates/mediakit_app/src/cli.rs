use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use engine_logging::LogDestination;
use mediakit_core::ToolKind;

#[derive(Debug, Parser)]
#[command(name = "mediakit", version, about = "Local media utilities on ffmpeg and pdftoppm")]
pub struct Cli {
    /// Settings file; defaults to ./mediakit.ron when present.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where log output goes: terminal, file or both.
    #[arg(long, global = true, value_name = "DEST")]
    pub log: Option<LogDestination>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show every tool with its accepted inputs and options.
    List,
    /// Run one tool over the given files and save the result.
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Tool slug, e.g. video-to-mp3 or merge-pdf.
    pub tool: ToolKind,

    /// Input files, in processing order.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Option value, repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,

    /// Directory the results are written to.
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Per-step time limit in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Also write manifest.json next to the results.
    #[arg(long)]
    pub manifest: bool,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing option name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

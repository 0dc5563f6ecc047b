//! CLI definitions for webhands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// webhands CLI.
#[derive(Parser)]
#[command(name = "webhands")]
#[command(about = "Autonomous browser agent driven by a language model")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.webhands/config.toml)
    #[arg(long, env = "WEBHANDS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run a task in the browser (default)
    Run(RunArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct RunArgs {
    /// Task to run
    #[arg(short = 'c', long)]
    pub command: Option<String>,

    /// Read the task from a file
    #[arg(short, long, conflicts_with = "command")]
    pub file: Option<PathBuf>,

    /// JSON file with an array of MCP server configurations
    #[arg(short, long)]
    pub mcp: Option<PathBuf>,

    /// Write debug artifacts and show planned actions
    #[arg(short, long)]
    pub debug: bool,

    /// Stop a task after this many steps
    #[arg(long)]
    pub max_steps: Option<usize>,
}

impl Cli {
    /// The subcommand to run; `run` when none is given.
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }
}

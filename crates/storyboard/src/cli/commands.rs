//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Storyboard - turn a story into ten illustrated scenes
#[derive(Parser, Debug)]
#[command(name = "storyboard")]
#[command(about = "Turn a story into ten illustrated scenes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file layered over the bundled defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decompose a story and render its scenes
    Run {
        /// Story text file, or `-` for stdin
        #[arg(long)]
        story: PathBuf,

        /// Export images and a manifest into this directory
        #[arg(long)]
        out: Option<PathBuf>,

        /// Override the text model
        #[arg(long)]
        text_model: Option<String>,

        /// Override the image model
        #[arg(long)]
        image_model: Option<String>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

//! Storyboard CLI binary.
//!
//! - `storyboard run --story FILE` decomposes a story, renders its ten scenes
//!   and optionally exports them
//! - `storyboard config` prints the effective configuration

use clap::Parser;
use storyboard::telemetry::{LogFormat, init_tracing};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, RunOptions, load_config, run_story, show_config};

    // Credentials may live in a .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(cli.verbose, format)?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            story,
            out,
            text_model,
            image_model,
            json,
        } => {
            let options = RunOptions {
                story,
                out,
                text_model,
                image_model,
                json,
            };
            run_story(config, options).await?;
        }

        Commands::Config => {
            show_config(&config)?;
        }
    }

    Ok(())
}

//! figforge CLI — design-export to mobile UI code pipeline.
//!
//! Generates screen code from Figma design images, then iteratively
//! enriches it with chunked design-export JSON fed back through the
//! model.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}

//! counterclaim CLI — fact-check inversion pipeline.
//!
//! Scrapes fact-check articles, generates counter-articles with the
//! opposite conclusion, and publishes them as rendered pages.

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

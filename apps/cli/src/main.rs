//! glossimport CLI: import a CSV glossary export into a Glossarist dataset.
//!
//! Each CSV row becomes one abstract concept record and one localized
//! concept record under a freshly scaffolded Paneron repository.

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

mod cli;
mod commands;
mod config;
mod interactive;
mod output;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Crawl { url, .. } => {
            let start_url = match url {
                Some(u) => u.clone(),
                None => interactive::prompt_for_start_url()?,
            };
            let crawl_config = config::build_crawl_config(&start_url, cli.config.as_deref(), &cli.command)?;
            commands::crawl::run(crawl_config, &cli.command).await?;
        }
        Commands::Export { input, format, output } => {
            commands::export::run(input, *format, output)?;
        }
    }

    Ok(())
}

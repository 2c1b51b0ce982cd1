use std::fs::File;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use linkwatch_core::{CrawlConfig, CrawlResult};
use linkwatch_engine::CrawlEngine;
use linkwatch_net::HttpFetcher;

use crate::cli::{Commands, ExportFormat};
use crate::output::{csv, human, sarif, write_json};

pub async fn run(config: CrawlConfig, command: &Commands) -> Result<CrawlResult> {
    let Commands::Crawl { output, format, json, .. } = command else {
        anyhow::bail!("crawl::run called with a non-crawl command");
    };

    info!(url = %config.start_url, "starting crawl");

    let fetcher = HttpFetcher::new(
        &config.user_agent,
        config.timeout,
        config.rate_limit,
        config.max_retries,
        config.backoff_factor,
        config.retry_statuses.clone(),
    )?;
    let engine = Arc::new(CrawlEngine::new(config, fetcher));
    let stop = engine.stop_handle();

    let mut handle = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.run().await }
    });

    let result = tokio::select! {
        joined = &mut handle => joined?,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, finishing in-flight requests and returning a partial result");
            stop.store(true, Ordering::Relaxed);
            handle.await?
        }
    };

    write_result(&result, output.as_deref(), *format, *json)?;

    Ok(result)
}

fn write_result(
    result: &CrawlResult,
    output: Option<&str>,
    format: Option<ExportFormat>,
    json: bool,
) -> Result<()> {
    if let Some(path) = output {
        let file = File::create(path)?;
        match format {
            Some(ExportFormat::Csv) => csv::write_csv(result, file)?,
            Some(ExportFormat::Sarif) => sarif::write_sarif(result, file)?,
            None => write_json(result, file)?,
        }
        return Ok(());
    }

    match format {
        Some(ExportFormat::Csv) => csv::write_csv(result, std::io::stdout())?,
        Some(ExportFormat::Sarif) => sarif::write_sarif(result, std::io::stdout())?,
        None if json => write_json(result, std::io::stdout())?,
        None => {
            println!("{}", human::summary_line(result));
            for line in human::detail_lines(result) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use linkwatch_core::CrawlConfig;

use crate::cli::Commands;

/// Optional-everything mirror of [`CrawlConfig`], deserialized from a TOML
/// file. Any field left unset falls through to the CLI flag, then to
/// `CrawlConfig`'s own default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
struct FileConfig {
    include_external: Option<bool>,
    check_orphans: Option<bool>,
    max_pages: Option<usize>,
    max_requests: Option<usize>,
    max_depth: Option<u32>,
    max_workers: Option<usize>,
    timeout: Option<u64>,
    outdated_days: Option<i64>,
    rate_limit: Option<f64>,
    max_retries: Option<u32>,
    backoff_factor: Option<f64>,
    retry_statuses: Option<Vec<u16>>,
    user_agent: Option<String>,
}

fn load_file_config(path: Option<&str>) -> Result<FileConfig> {
    match path {
        None => Ok(FileConfig::default()),
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file at {path}"))?;
            toml::from_str(&raw).with_context(|| format!("parsing config file at {path}"))
        }
    }
}

/// Build the final, validated [`CrawlConfig`] for a `crawl` invocation:
/// defaults, layered under the config file, layered under explicit CLI
/// flags.
pub fn build_crawl_config(start_url: &str, config_path: Option<&str>, command: &Commands) -> Result<CrawlConfig> {
    let Commands::Crawl {
        include_external,
        no_orphans,
        max_requests,
        max_pages,
        max_depth,
        max_workers,
        timeout,
        outdated_days,
        rate_limit,
        max_retries,
        backoff_factor,
        user_agent,
        ..
    } = command
    else {
        anyhow::bail!("build_crawl_config called with a non-crawl command");
    };

    let file = load_file_config(config_path)?;
    let mut config = CrawlConfig::new(start_url)?;

    config.include_external = *include_external || file.include_external.unwrap_or(false);
    config.check_orphans = if *no_orphans {
        false
    } else {
        file.check_orphans.unwrap_or(true)
    };
    config.max_pages = max_pages.or(file.max_pages).unwrap_or(config.max_pages);
    config.max_requests = max_requests.or(file.max_requests).unwrap_or(config.max_requests);
    config.max_depth = max_depth.or(file.max_depth).unwrap_or(config.max_depth);
    config.max_workers = max_workers.or(file.max_workers).unwrap_or(config.max_workers);
    config.timeout = timeout
        .or(file.timeout)
        .map(Duration::from_secs)
        .unwrap_or(config.timeout);
    config.outdated_days = outdated_days.or(file.outdated_days).unwrap_or(config.outdated_days);
    config.rate_limit = rate_limit.or(file.rate_limit).or(config.rate_limit);
    config.max_retries = max_retries.or(file.max_retries).unwrap_or(config.max_retries);
    config.backoff_factor = backoff_factor
        .or(file.backoff_factor)
        .unwrap_or(config.backoff_factor);
    if let Some(statuses) = file.retry_statuses {
        config.retry_statuses = statuses.into_iter().collect::<HashSet<_>>();
    }
    config.user_agent = user_agent
        .clone()
        .or(file.user_agent)
        .unwrap_or(config.user_agent);

    config.validate()?;
    Ok(config)
}

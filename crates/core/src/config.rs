use std::collections::HashSet;
use std::time::Duration;

use url::Url;

use crate::error::CrawlError;

/// HTTP status codes that are worth a retry rather than an immediate `broken`/
/// `server-error` verdict — request timeouts, rate limiting, and the 5xx
/// family that often clears up on its own.
pub const DEFAULT_RETRY_STATUSES: &[u16] = &[408, 425, 429, 500, 502, 503, 504];

pub const DEFAULT_USER_AGENT: &str = "LinkHealthScanner/1.0";

/// Fully resolved, validated settings for one crawl run.
///
/// Built from layered CLI flags / config file / defaults upstream; by the
/// time a `CrawlConfig` exists its invariants (`max_workers >= 1`, a
/// non-negative `backoff_factor`, an http(s) `start_url`, ...) have already
/// been checked by [`CrawlConfig::validate`].
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub start_url: Url,
    pub include_external: bool,
    pub check_orphans: bool,
    pub max_pages: usize,
    pub max_requests: usize,
    pub max_depth: u32,
    pub max_workers: usize,
    pub timeout: Duration,
    pub outdated_days: i64,
    pub rate_limit: Option<f64>,
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub retry_statuses: HashSet<u16>,
    pub user_agent: String,
}

impl CrawlConfig {
    /// Build a config with every field at its documented default, anchored to
    /// `start_url`. Still runs [`CrawlConfig::validate`] before returning.
    pub fn new(start_url: &str) -> Result<Self, CrawlError> {
        let config = Self {
            start_url: parse_start_url(start_url)?,
            include_external: false,
            check_orphans: true,
            max_pages: 150,
            max_requests: 500,
            max_depth: 3,
            max_workers: 5,
            timeout: Duration::from_secs(10),
            outdated_days: 365,
            rate_limit: None,
            max_retries: 2,
            backoff_factor: 0.5,
            retry_statuses: DEFAULT_RETRY_STATUSES.iter().copied().collect(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Re-check invariants after callers have mutated fields directly (layered
    /// config / CLI overrides do this before handing the config to the
    /// engine).
    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.max_workers < 1 {
            return Err(CrawlError::Config("max_workers must be at least 1".into()));
        }
        if self.max_pages == 0 {
            return Err(CrawlError::Config("max_pages must be at least 1".into()));
        }
        if self.max_requests == 0 {
            return Err(CrawlError::Config("max_requests must be at least 1".into()));
        }
        if self.backoff_factor < 0.0 {
            return Err(CrawlError::Config("backoff_factor must be >= 0".into()));
        }
        if self.outdated_days < 0 {
            return Err(CrawlError::Config("outdated_days must be >= 0".into()));
        }
        if let Some(rate) = self.rate_limit {
            if rate <= 0.0 {
                return Err(CrawlError::Config("rate_limit must be > 0 when set".into()));
            }
        }
        if self.start_url.scheme() != "http" && self.start_url.scheme() != "https" {
            return Err(CrawlError::InvalidUrl(format!(
                "unsupported scheme: {}",
                self.start_url.scheme()
            )));
        }
        Ok(())
    }
}

/// Parse and lightly canonicalize the seed URL: reject anything that isn't
/// http(s), and drop a single trailing slash so the starting point matches
/// whatever the normalizer would later produce for the same address. This
/// mirrors `linkwatch_net::normalize`'s trailing-slash collapse; duplicated
/// locally rather than imported since `net` depends on `core`, not the other
/// way around.
pub fn parse_start_url(raw: &str) -> Result<Url, CrawlError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| CrawlError::InvalidUrl(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CrawlError::InvalidUrl(format!(
            "unsupported scheme: {}",
            url.scheme()
        )));
    }
    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(&path[..path.len() - 1]);
    }
    Ok(url)
}

use serde::{Deserialize, Serialize};

/// Health classification for a single fetched URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkStatus {
    Ok,
    Redirect,
    Broken,
    ServerError,
    Error,
    /// Defensive bucket — should be unreachable in normal flow. A non-zero
    /// count here is a bug, not a legitimate outcome.
    Unknown,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Ok => "ok",
            LinkStatus::Redirect => "redirect",
            LinkStatus::Broken => "broken",
            LinkStatus::ServerError => "server-error",
            LinkStatus::Error => "error",
            LinkStatus::Unknown => "unknown",
        }
    }

    /// Classify a final HTTP status code (after redirects were followed).
    pub fn from_status_code(code: u16) -> Self {
        match code {
            500..=599 => LinkStatus::ServerError,
            400..=499 => LinkStatus::Broken,
            300..=399 => LinkStatus::Redirect,
            200..=299 => LinkStatus::Ok,
            _ => LinkStatus::Unknown,
        }
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audited URL. Produced exactly once per URL per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkReport {
    pub url: String,
    pub referrers: Vec<String>,
    pub status: LinkStatus,
    pub status_code: Option<u16>,
    pub redirected_to: Option<String>,
    pub issues: Vec<String>,
    pub outdated_signals: Vec<String>,
    pub content_type: Option<String>,
    pub links_found: Vec<String>,
}

/// Per-status counts over `reports`, plus the derived `outdated`/`unused` tallies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub ok: usize,
    pub broken: usize,
    #[serde(rename = "server-error")]
    pub server_error: usize,
    pub redirect: usize,
    pub error: usize,
    pub outdated: usize,
    pub unused: usize,
}

/// The full, stable output of a crawl. This shape is the contract external
/// collaborators (writers, the CLI) consume — nothing downstream should need
/// more than this to render a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub summary: Summary,
    pub reports: Vec<LinkReport>,
    pub unused_links: Vec<String>,
    pub sitemap_only_links: Vec<String>,
}

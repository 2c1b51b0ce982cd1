use chrono::{DateTime, Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Substrings that read as "this page was never finished" or "this page
/// hasn't been touched since launch". Checked case-insensitively.
const STALE_PHRASES: &[&str] = &[
    "under construction",
    "coming soon",
    "lorem ipsum",
    "outdated",
    "last updated 20",
];

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(19|20)\d{2}").unwrap());

/// Look for staleness signals in a fetched page: an old `Last-Modified`
/// header, a copyright/date year trailing far behind today, and boilerplate
/// phrases that suggest the page was abandoned mid-build. Returns one string
/// per signal found, in the order above; an empty vec means nothing stale was
/// detected.
pub fn detect(last_modified: Option<&str>, body: &str, now: DateTime<Utc>, outdated_days: i64) -> Vec<String> {
    let mut signals = Vec::new();

    if let Some(header) = last_modified {
        if let Ok(parsed) = DateTime::parse_from_rfc2822(header) {
            let age_days = (now - parsed.with_timezone(&Utc)).num_days();
            if age_days > outdated_days {
                signals.push(format!("Last-Modified is {age_days} days ago ({header})"));
            }
        }
    }

    if let Some(max_year) = YEAR_RE
        .find_iter(body)
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .max()
    {
        if max_year < now.year() - 1 {
            signals.push(format!("Latest year mentioned is {max_year}"));
        }
    }

    let lower = body.to_ascii_lowercase();
    for phrase in STALE_PHRASES {
        if lower.contains(phrase) {
            signals.push(format!("Contains '{phrase}'"));
        }
    }

    signals
}

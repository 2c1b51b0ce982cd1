use std::collections::{BTreeSet, HashSet};

use url::Url;

use linkwatch_core::{CrawlResult, LinkReport, LinkStatus, Summary};
use linkwatch_net::{canonical_string, same_origin};

/// Fold completed reports plus the engine's final frontier/sitemap state into
/// the stable [`CrawlResult`] shape: per-status counts and, when orphan
/// checking is enabled, the `unused_links` / `sitemap_only_links` sets.
pub fn assemble(
    reports: Vec<LinkReport>,
    visited: &HashSet<Url>,
    sitemap_urls: &BTreeSet<Url>,
    start_url: &Url,
    origin: &str,
    check_orphans: bool,
) -> CrawlResult {
    let mut summary = Summary {
        total: reports.len(),
        ..Summary::default()
    };

    for report in &reports {
        match report.status {
            LinkStatus::Ok => summary.ok += 1,
            LinkStatus::Broken => summary.broken += 1,
            LinkStatus::ServerError => summary.server_error += 1,
            LinkStatus::Redirect => summary.redirect += 1,
            LinkStatus::Error => summary.error += 1,
            LinkStatus::Unknown => {}
        }
        if !report.outdated_signals.is_empty() {
            summary.outdated += 1;
        }
    }

    let (unused_links, sitemap_only_links) = if check_orphans {
        compute_orphans(&reports, visited, sitemap_urls, start_url, origin)
    } else {
        (Vec::new(), Vec::new())
    };
    summary.unused = unused_links.len() + sitemap_only_links.len();

    CrawlResult {
        summary,
        reports,
        unused_links,
        sitemap_only_links,
    }
}

/// `unused_links`: same-origin, non-start URLs that were fetched but never
/// recorded as a link target of any crawled page. `sitemap_only_links`:
/// same-origin sitemap entries that the crawl never visited. The two sets are
/// disjoint by construction — a URL only lands in the first if it was
/// visited, only in the second if it wasn't.
fn compute_orphans(
    reports: &[LinkReport],
    visited: &HashSet<Url>,
    sitemap_urls: &BTreeSet<Url>,
    start_url: &Url,
    origin: &str,
) -> (Vec<String>, Vec<String>) {
    let start_str = canonical_string(start_url);

    let mut unused_links: Vec<String> = reports
        .iter()
        .filter(|r| r.url != start_str && r.referrers.is_empty())
        .filter_map(|r| {
            Url::parse(&r.url)
                .ok()
                .filter(|u| same_origin(u, origin))
                .map(|_| r.url.clone())
        })
        .collect();
    unused_links.sort();

    let mut sitemap_only_links: Vec<String> = sitemap_urls
        .iter()
        .filter(|u| same_origin(u, origin) && !visited.contains(u))
        .map(canonical_string)
        .collect();
    sitemap_only_links.sort();

    (unused_links, sitemap_only_links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkwatch_core::LinkStatus;

    fn report(url: &str, status: LinkStatus, referrers: Vec<&str>) -> LinkReport {
        LinkReport {
            url: url.to_string(),
            referrers: referrers.into_iter().map(String::from).collect(),
            status,
            status_code: Some(200),
            redirected_to: None,
            issues: vec![],
            outdated_signals: vec![],
            content_type: Some("text/html".to_string()),
            links_found: vec![],
        }
    }

    #[test]
    fn summary_counts_each_status_once() {
        let reports = vec![
            report("https://example.test", LinkStatus::Ok, vec![]),
            report("https://example.test/a", LinkStatus::Broken, vec!["https://example.test"]),
        ];
        let start = Url::parse("https://example.test").unwrap();
        let result = assemble(reports, &HashSet::new(), &BTreeSet::new(), &start, "example.test", false);
        assert_eq!(result.summary.total, 2);
        assert_eq!(result.summary.ok, 1);
        assert_eq!(result.summary.broken, 1);
        assert_eq!(result.summary.unused, 0);
    }

    #[test]
    fn sitemap_only_excludes_visited_urls() {
        let start = Url::parse("https://example.test/").unwrap();
        let seen = Url::parse("https://example.test/seen").unwrap();
        let orphan = Url::parse("https://example.test/orphan").unwrap();
        let mut sitemap = BTreeSet::new();
        sitemap.insert(seen.clone());
        sitemap.insert(orphan.clone());

        let mut visited = HashSet::new();
        visited.insert(start.clone());
        visited.insert(seen.clone());

        let reports = vec![
            report("https://example.test", LinkStatus::Ok, vec![]),
            report("https://example.test/seen", LinkStatus::Ok, vec!["https://example.test"]),
        ];

        let result = assemble(reports, &visited, &sitemap, &start, "example.test", true);
        assert_eq!(result.sitemap_only_links, vec!["https://example.test/orphan".to_string()]);
        assert!(result.unused_links.is_empty());
        assert_eq!(result.summary.unused, 1);
    }

    #[test]
    fn orphan_checking_disabled_yields_empty_sets() {
        let start = Url::parse("https://example.test/").unwrap();
        let mut sitemap = BTreeSet::new();
        sitemap.insert(Url::parse("https://example.test/orphan").unwrap());
        let reports = vec![report("https://example.test", LinkStatus::Ok, vec![])];

        let result = assemble(reports, &HashSet::new(), &sitemap, &start, "example.test", false);
        assert!(result.sitemap_only_links.is_empty());
        assert!(result.unused_links.is_empty());
        assert_eq!(result.summary.unused, 0);
    }
}

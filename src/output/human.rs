use linkwatch_core::CrawlResult;

/// Render a short summary line suitable for a terminal: counts per status,
/// plus orphan counts when orphan-checking was enabled.
pub fn summary_line(result: &CrawlResult) -> String {
    let s = &result.summary;
    format!(
        "{} pages: {} ok, {} redirect, {} broken, {} server-error, {} error, {} outdated, {} unused",
        s.total, s.ok, s.redirect, s.broken, s.server_error, s.error, s.outdated, s.unused
    )
}

/// Render one line per report that has something worth a human's attention:
/// anything not `ok`, plus anything with a staleness signal.
pub fn detail_lines(result: &CrawlResult) -> Vec<String> {
    let mut lines = Vec::new();
    for report in &result.reports {
        let noteworthy = !matches!(report.status, linkwatch_core::LinkStatus::Ok)
            || !report.outdated_signals.is_empty();
        if !noteworthy {
            continue;
        }
        let mut line = format!("[{}] {}", report.status, report.url);
        if let Some(code) = report.status_code {
            line.push_str(&format!(" ({code})"));
        }
        if !report.referrers.is_empty() {
            line.push_str(&format!(" <- {}", truncated_list(&report.referrers, 3)));
        }
        for issue in &report.issues {
            line.push_str(&format!("\n    {issue}"));
        }
        for signal in &report.outdated_signals {
            line.push_str(&format!("\n    stale: {signal}"));
        }
        lines.push(line);
    }
    for url in &result.unused_links {
        lines.push(format!("[unused] {url}"));
    }
    for url in &result.sitemap_only_links {
        lines.push(format!("[sitemap-only] {url}"));
    }
    lines
}

/// Join the first `limit` entries with `, `, appending `...` if more were
/// dropped, so a page with dozens of referrers doesn't blow up one line.
fn truncated_list(items: &[String], limit: usize) -> String {
    let shown = items.iter().take(limit).cloned().collect::<Vec<_>>().join(", ");
    if items.len() > limit {
        format!("{shown}, ...")
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkwatch_core::{LinkStatus, Summary};

    #[test]
    fn summary_line_reports_all_buckets() {
        let result = CrawlResult {
            summary: Summary {
                total: 1,
                ok: 1,
                ..Summary::default()
            },
            reports: vec![],
            unused_links: vec![],
            sitemap_only_links: vec![],
        };
        assert!(summary_line(&result).contains("1 pages"));
    }

    #[test]
    fn detail_lines_skip_clean_ok_reports() {
        let result = CrawlResult {
            summary: Summary::default(),
            reports: vec![linkwatch_core::LinkReport {
                url: "https://example.test".into(),
                referrers: vec![],
                status: LinkStatus::Ok,
                status_code: Some(200),
                redirected_to: None,
                issues: vec![],
                outdated_signals: vec![],
                content_type: Some("text/html".into()),
                links_found: vec![],
            }],
            unused_links: vec![],
            sitemap_only_links: vec![],
        };
        assert!(detail_lines(&result).is_empty());
    }

    #[test]
    fn referrers_are_truncated_to_three_with_an_ellipsis() {
        let result = CrawlResult {
            summary: Summary::default(),
            reports: vec![linkwatch_core::LinkReport {
                url: "https://example.test/missing".into(),
                referrers: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                status: LinkStatus::Broken,
                status_code: Some(404),
                redirected_to: None,
                issues: vec!["Client error".into()],
                outdated_signals: vec![],
                content_type: None,
                links_found: vec![],
            }],
            unused_links: vec![],
            sitemap_only_links: vec![],
        };
        let lines = detail_lines(&result);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("a, b, c, ..."));
        assert!(!lines[0].contains('d'));
    }
}

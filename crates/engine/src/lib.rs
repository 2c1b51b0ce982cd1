pub mod assembler;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{debug, info};
use url::Url;

use linkwatch_core::{CrawlConfig, CrawlResult, LinkReport, LinkStatus};
use linkwatch_frontier::Frontier;
use linkwatch_net::{canonical_string, load_sitemap, origin_key, same_origin, FetchResponse, Fetcher};
use linkwatch_parser::{detect_staleness, extract_links};

/// Runs one crawl to completion against a shared [`Fetcher`]. Owns the
/// frontier, referrer map, and every counter exclusively for the duration of
/// [`CrawlEngine::run`] — workers only fetch and report back.
pub struct CrawlEngine<F: Fetcher> {
    config: CrawlConfig,
    fetcher: Arc<F>,
    stop: Arc<AtomicBool>,
}

impl<F: Fetcher + 'static> CrawlEngine<F> {
    pub fn new(config: CrawlConfig, fetcher: F) -> Self {
        Self {
            config,
            fetcher: Arc::new(fetcher),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle the caller can flip to ask a running crawl to stop admitting
    /// new work. Already in-flight fetches are still drained and reported;
    /// `run` then returns the partial result assembled from whatever
    /// completed before the flag was set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub async fn run(&self) -> CrawlResult {
        let origin = origin_key(&self.config.start_url);

        let sitemap_urls = if self.config.check_orphans {
            load_sitemap(self.fetcher.as_ref(), &self.config.start_url).await
        } else {
            BTreeSet::new()
        };

        let mut frontier = Frontier::new();
        frontier.seed(self.config.start_url.clone());

        let mut reports: Vec<LinkReport> = Vec::new();
        let mut pages_crawled = 0usize;
        let mut completed_requests = 0usize;
        let mut in_flight: JoinSet<(Url, u32, Result<FetchResponse, String>)> = JoinSet::new();

        loop {
            while !frontier.is_empty()
                && in_flight.len() < self.config.max_workers
                && completed_requests + in_flight.len() < self.config.max_requests
                && !self.stop.load(Ordering::Relaxed)
            {
                let entry = frontier
                    .dispatch()
                    .expect("frontier reported non-empty but dispatch returned none");
                let fetcher = Arc::clone(&self.fetcher);
                let url = entry.url.clone();
                let depth = entry.depth;
                in_flight.spawn(async move {
                    let result = fetcher.fetch(&url).await;
                    (url, depth, result)
                });
            }

            if in_flight.is_empty() {
                break;
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            let (url, depth, result) = match joined {
                Ok(v) => v,
                Err(e) => {
                    // A worker task panicked or was cancelled. Not a crawl
                    // failure: we simply have no report for whatever URL it
                    // held, and the run continues.
                    debug!(error = %e, "worker task did not complete");
                    continue;
                }
            };

            frontier.complete(&url);
            completed_requests += 1;

            let report = self.build_report(&url, depth, result, &mut frontier, &origin, &mut pages_crawled);
            reports.push(report);
        }

        info!(
            reports = reports.len(),
            pages_crawled, completed_requests, "crawl finished"
        );

        assembler::assemble(
            reports,
            frontier.visited(),
            &sitemap_urls,
            &self.config.start_url,
            &origin,
            self.config.check_orphans,
        )
    }

    /// Turn one fetch outcome into a [`LinkReport`], and — for an in-scope,
    /// in-budget HTML page — expand its outbound links into the frontier.
    fn build_report(
        &self,
        url: &Url,
        depth: u32,
        result: Result<FetchResponse, String>,
        frontier: &mut Frontier,
        origin: &str,
        pages_crawled: &mut usize,
    ) -> LinkReport {
        let mut referrers: Vec<String> = frontier
            .referrers_of(url)
            .iter()
            .map(canonical_string)
            .collect();
        referrers.sort();

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                return LinkReport {
                    url: canonical_string(url),
                    referrers,
                    status: LinkStatus::Error,
                    status_code: None,
                    redirected_to: None,
                    issues: vec![e],
                    outdated_signals: vec![],
                    content_type: None,
                    links_found: vec![],
                };
            }
        };

        let status = LinkStatus::from_status_code(resp.status);
        let mut issues = Vec::new();
        if resp.was_redirected() {
            let chain: Vec<String> = resp
                .redirect_chain
                .iter()
                .map(|c| c.to_string())
                .chain(std::iter::once(resp.status.to_string()))
                .collect();
            issues.push(format!("Redirect chain {}", chain.join(" -> ")));
        }
        match status {
            LinkStatus::ServerError => issues.push("Server error".to_string()),
            LinkStatus::Broken => issues.push("Client error".to_string()),
            _ => {}
        }

        let redirected_to = resp
            .was_redirected()
            .then(|| canonical_string(&resp.final_url));

        let is_html = resp
            .content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false);

        let mut links_found = Vec::new();
        let mut outdated_signals = Vec::new();

        if is_html {
            outdated_signals = detect_staleness(
                resp.header("last-modified"),
                &resp.body,
                Utc::now(),
                self.config.outdated_days,
            );

            let discovered = extract_links(&resp.final_url, &resp.body);
            links_found = discovered.iter().map(canonical_string).collect();
            links_found.sort();

            let can_expand =
                resp.status < 400 && *pages_crawled < self.config.max_pages && depth < self.config.max_depth;
            if can_expand {
                *pages_crawled += 1;
                for outbound in discovered {
                    if !self.config.include_external && !same_origin(&outbound, origin) {
                        continue;
                    }
                    frontier.add_referrer(&outbound, url.clone());
                    frontier.admit(outbound, depth + 1);
                }
            }
        }

        LinkReport {
            url: canonical_string(url),
            referrers,
            status,
            status_code: Some(resp.status),
            redirected_to,
            issues,
            outdated_signals,
            content_type: resp.content_type,
            links_found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    struct ScriptedFetcher {
        pages: StdMutex<HashMap<String, (u16, &'static str, &'static str)>>,
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, url: &Url) -> Result<FetchResponse, String> {
            let pages = self.pages.lock().unwrap();
            let key = url.as_str().trim_end_matches('/').to_string();
            let Some((status, content_type, body)) = pages.get(&key).copied() else {
                return Ok(FetchResponse {
                    final_url: url.clone(),
                    status: 404,
                    redirect_chain: vec![],
                    headers: HashMap::new(),
                    body: String::new(),
                    content_type: None,
                });
            };
            let mut headers = HashMap::new();
            headers.insert("content-type".to_string(), content_type.to_string());
            Ok(FetchResponse {
                final_url: url.clone(),
                status,
                redirect_chain: vec![],
                headers,
                body: body.to_string(),
                content_type: Some(content_type.to_string()),
            })
        }
    }

    fn engine(pages: Vec<(&str, u16, &'static str, &'static str)>) -> CrawlEngine<ScriptedFetcher> {
        let mut map = HashMap::new();
        for (url, status, ct, body) in pages {
            map.insert(url.trim_end_matches('/').to_string(), (status, ct, body));
        }
        let config = CrawlConfig::new("https://example.test").unwrap();
        CrawlEngine::new(
            config,
            ScriptedFetcher {
                pages: StdMutex::new(map),
            },
        )
    }

    #[tokio::test]
    async fn single_page_no_links() {
        let eng = engine(vec![("https://example.test", 200, "text/html", "<html></html>")]);
        let result = eng.run().await;
        assert_eq!(result.reports.len(), 1);
        assert_eq!(result.summary.total, 1);
        assert_eq!(result.summary.ok, 1);
        assert!(result.reports[0].links_found.is_empty());
        assert!(result.reports[0].referrers.is_empty());
    }

    #[tokio::test]
    async fn broken_child_link() {
        let eng = engine(vec![(
            "https://example.test",
            200,
            "text/html",
            r#"<html><a href="/missing">x</a></html>"#,
        )]);
        let result = eng.run().await;
        assert_eq!(result.reports.len(), 2);
        let missing = result
            .reports
            .iter()
            .find(|r| r.url == "https://example.test/missing")
            .unwrap();
        assert_eq!(missing.status_code, Some(404));
        assert_eq!(missing.referrers, vec!["https://example.test".to_string()]);
        assert_eq!(result.summary.broken, 1);
    }

    #[tokio::test]
    async fn external_links_excluded_by_default() {
        let eng = engine(vec![(
            "https://example.test",
            200,
            "text/html",
            r#"<html><a href="https://example.test/a">a</a><a href="https://other.test/b">b</a></html>"#,
        )]);
        let result = eng.run().await;
        assert_eq!(result.reports.len(), 2);
        assert!(result.reports.iter().all(|r| !r.url.contains("other.test")));
    }

    #[tokio::test]
    async fn stop_handle_halts_admission_and_returns_a_partial_result() {
        let eng = engine(vec![(
            "https://example.test",
            200,
            "text/html",
            r#"<html><a href="/a">a</a></html>"#,
        )]);
        let stop = eng.stop_handle();
        stop.store(true, std::sync::atomic::Ordering::Relaxed);
        let result = eng.run().await;
        assert!(result.reports.is_empty());
    }
}

use std::collections::BTreeSet;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use url::Url;

use crate::fetcher::Fetcher;
use crate::normalize::{normalize, origin_key, same_origin};

/// Fetch `/sitemap.xml` at the start URL's origin and return every `<loc>`
/// entry that resolves to the same origin, normalized the same way page
/// links are. Returns an empty set on any failure (missing file, non-200,
/// unparseable XML) — a sitemap is an optional cross-reference, never a hard
/// requirement for the crawl to proceed.
pub async fn load_sitemap(fetcher: &dyn Fetcher, start_url: &Url) -> BTreeSet<Url> {
    let mut found = BTreeSet::new();

    let Some(sitemap_url) = sitemap_url_for(start_url) else {
        return found;
    };

    let resp = match fetcher.fetch_once(&sitemap_url).await {
        Ok(resp) => resp,
        Err(e) => {
            debug!(url = %sitemap_url, error = %e, "sitemap fetch failed");
            return found;
        }
    };
    if resp.status != 200 {
        debug!(url = %sitemap_url, status = resp.status, "sitemap not found");
        return found;
    }

    let origin = origin_key(start_url);
    for loc in extract_locs(&resp.body) {
        if let Some(candidate) = normalize(start_url, &loc) {
            if same_origin(&candidate, &origin) {
                found.insert(candidate);
            }
        }
    }
    found
}

fn sitemap_url_for(start_url: &Url) -> Option<Url> {
    let mut url = start_url.clone();
    url.set_path("/sitemap.xml");
    url.set_query(None);
    url.set_fragment(None);
    Some(url)
}

/// Pull the text content of every `<loc>` element out of a sitemap XML
/// document, tolerating namespace prefixes (`<ns:loc>`) and ignoring anything
/// that doesn't parse as well-formed XML by simply stopping early.
fn extract_locs(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = Vec::new();
    let mut in_loc = false;

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                if is_local_name(e.name().as_ref(), b"loc") {
                    in_loc = true;
                }
            }
            Ok(Event::Text(t)) => {
                if in_loc {
                    if let Ok(text) = t.unescape() {
                        let trimmed = text.trim();
                        if !trimmed.is_empty() {
                            out.push(trimmed.to_string());
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                if is_local_name(e.name().as_ref(), b"loc") {
                    in_loc = false;
                }
            }
            Err(_) => break,
            _ => {}
        }
    }
    out
}

fn is_local_name(qname: &[u8], local: &[u8]) -> bool {
    match qname.iter().position(|&b| b == b':') {
        Some(idx) => &qname[idx + 1..] == local,
        None => qname == local,
    }
}

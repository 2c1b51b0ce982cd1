use std::collections::BTreeSet;

use scraper::{Html, Selector};
use url::Url;

use linkwatch_net::normalize;

/// (tag, attribute) pairs scanned for outbound links. Covers the surfaces the
/// audit cares about: navigable links, stylesheet/alternate `<link>` rels,
/// and the embedded-resource tags that commonly 404 quietly.
const LINK_SOURCES: &[(&str, &str)] = &[
    ("a", "href"),
    ("link", "href"),
    ("img", "src"),
    ("script", "src"),
    ("iframe", "src"),
    ("source", "src"),
];

/// Pull every crawlable link out of an HTML document. Malformed markup never
/// aborts extraction — `scraper`'s html5ever backend always produces a best-
/// effort tree, so a broken tag just yields fewer matches rather than an
/// error.
pub fn extract_links(base: &Url, html: &str) -> BTreeSet<Url> {
    let document = Html::parse_document(html);
    let mut found = BTreeSet::new();

    for (tag, attr) in LINK_SOURCES {
        let selector_str = format!("{tag}[{attr}]");
        let Ok(selector) = Selector::parse(&selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attr) {
                if let Some(url) = normalize::normalize(base, value) {
                    found.insert(url);
                }
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.test/page").unwrap()
    }

    #[test]
    fn extracts_anchor_and_asset_links() {
        let html = r#"
            <html><body>
              <a href="/a">a</a>
              <img src="/img.png">
              <script src="/app.js"></script>
              <iframe src="/frame.html"></iframe>
              <link rel="stylesheet" href="/style.css">
              <source src="/video.mp4">
            </body></html>
        "#;
        let links = extract_links(&base(), html);
        let paths: BTreeSet<_> = links.iter().map(|u| u.path().to_string()).collect();
        assert!(paths.contains("/a"));
        assert!(paths.contains("/img.png"));
        assert!(paths.contains("/app.js"));
        assert!(paths.contains("/frame.html"));
        assert!(paths.contains("/style.css"));
        assert!(paths.contains("/video.mp4"));
    }

    #[test]
    fn ignores_mailto_and_javascript_hrefs() {
        let html = r#"<a href="mailto:a@example.test">mail</a><a href="javascript:void(0)">js</a>"#;
        assert!(extract_links(&base(), html).is_empty());
    }

    #[test]
    fn dedupes_repeated_links() {
        let html = r#"<a href="/a">1</a><a href="/a">2</a><a href="/a/">3</a>"#;
        assert_eq!(extract_links(&base(), html).len(), 1);
    }

    #[test]
    fn tolerates_malformed_markup() {
        let html = r#"<html><body><a href="/a">unclosed<div><img src="/b.png"></body>"#;
        let links = extract_links(&base(), html);
        assert_eq!(links.len(), 2);
    }
}

use url::Url;

const REJECTED_PREFIXES: [&str; 3] = ["mailto:", "tel:", "javascript:"];

/// Resolve `raw` against `base` into a crawlable, canonical URL, or `None` if
/// it isn't one (empty, a bare fragment, a non-http(s) scheme, `mailto:` /
/// `tel:` / `javascript:`, or simply unparseable).
///
/// Canonicalization strips the fragment and collapses one trailing slash, so
/// `https://example.test/a` and `https://example.test/a/` resolve to the same
/// value.
pub fn normalize(base: &Url, raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if REJECTED_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return None;
    }

    let mut resolved = base.join(trimmed).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    resolved.set_fragment(None);
    let path = resolved.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        resolved.set_path(&path[..path.len() - 1]);
    }
    Some(resolved)
}

/// The host[:port] pair that defines a URL's origin for the purposes of
/// "internal" vs "external" link classification. No implicit default-port
/// inference: `http://example.test` and `http://example.test:80` are treated
/// as distinct origins, matching what the server actually saw on the wire.
pub fn origin_key(url: &Url) -> String {
    match url.port() {
        Some(port) => format!("{}:{}", url.host_str().unwrap_or(""), port),
        None => url.host_str().unwrap_or("").to_string(),
    }
}

pub fn same_origin(url: &Url, base_origin: &str) -> bool {
    origin_key(url) == base_origin
}

/// Render a normalized URL the way it should appear in reports: identical to
/// `Url::as_str`, except a bare host (`scheme://host`, no path) is rendered
/// without the trailing slash the `url` crate otherwise always attaches.
pub fn canonical_string(url: &Url) -> String {
    let s = url.as_str();
    if url.path() == "/" && url.query().is_none() {
        s.trim_end_matches('/').to_string()
    } else {
        s.to_string()
    }
}

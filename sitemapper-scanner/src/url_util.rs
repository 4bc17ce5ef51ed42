use crate::error::{Result, ScanError};
use url::Url;

/// Resolve `href` against `base`.
///
/// An `href` that already parses as an absolute URL is handed back verbatim,
/// even when it points at another host. Anything else is joined onto `base`
/// using standard reference resolution. Leading and trailing ASCII
/// whitespace is stripped from `href` first, as HTML does for URL attributes.
pub fn resolve_absolute(href: &str, base: &str) -> Result<String> {
    let base_url = Url::parse(base).map_err(|e| ScanError::invalid_url(base, e))?;
    let href = href.trim_matches(|c: char| c.is_ascii_whitespace());

    if Url::parse(href).is_ok() {
        return Ok(href.to_string());
    }

    base_url
        .join(href)
        .map(|resolved| resolved.to_string())
        .map_err(|e| ScanError::invalid_url(href, e))
}

/// Host component of `url` without any port. URLs that carry no host at all
/// (`mailto:`, `data:`) yield an empty string.
pub fn domain_of(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| ScanError::invalid_url(url, e))?;
    Ok(parsed.host_str().unwrap_or_default().to_string())
}

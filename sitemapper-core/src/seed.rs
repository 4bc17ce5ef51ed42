use url::Url;

/// Turn user input into an absolute seed URL.
///
/// Input without a scheme is treated as `http`, and the result always ends
/// in `/` so that relative links on the seed page resolve beneath it.
pub fn normalize_seed(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Please give a URL to crawl.".to_string());
    }

    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let url = Url::parse(&candidate).map_err(|e| format!("Invalid URL '{}': {}", raw, e))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(format!("Invalid URL '{}': no host", raw));
    }

    let mut seed = url.to_string();
    if !seed.ends_with('/') {
        seed.push('/');
    }

    Ok(seed)
}

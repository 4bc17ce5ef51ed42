use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ScanError {
    pub(crate) fn invalid_url(url: &str, source: url::ParseError) -> Self {
        ScanError::InvalidUrl {
            url: url.to_string(),
            source,
        }
    }

    pub fn is_invalid_url(&self) -> bool {
        matches!(self, ScanError::InvalidUrl { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

use indicatif::{ProgressBar, ProgressStyle};
use sitemapper_scanner::{Crawler, ScanError, ScriptAttr, Sitemap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub url: String,
    pub threads: usize,
    pub timeout_secs: u64,
    pub max_duration: Option<Duration>,
    /// Accepted and passed along, but not enforced by the crawl.
    pub max_depth: usize,
    pub script_attr: ScriptAttr,
    pub show_progress: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            threads: 10,
            timeout_secs: 10,
            max_duration: None,
            max_depth: 3,
            script_attr: ScriptAttr::default(),
            show_progress: false,
        }
    }
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

pub fn build_crawler(options: &CrawlOptions) -> Crawler {
    let mut crawler = Crawler::with_timeout(options.timeout_secs)
        .with_concurrency(options.threads)
        .with_max_depth(options.max_depth)
        .with_script_attr(options.script_attr);

    if let Some(duration) = options.max_duration {
        crawler = crawler.with_max_duration(duration);
    }

    crawler
}

/// Execute a crawl with the given options
/// Returns the finished sitemap
pub async fn execute_crawl(options: CrawlOptions) -> Result<Sitemap, ScanError> {
    let progress_bar = if options.show_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(pb)
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));
    let mut crawler = build_crawler(&options);

    if let Some(ref pb) = progress_bar {
        let pb = pb.clone();
        let count = processed_count.clone();
        crawler = crawler.with_progress_callback(Arc::new(move |url: String| {
            let count = count.fetch_add(1, Ordering::Relaxed) + 1;
            pb.set_message(format!("Crawling... {} URLs processed ({})", count, extract_url_path(&url)));
        }));
    }

    let result = crawler.crawl(&options.url).await;

    if let Some(pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        match result {
            Ok(_) => pb.finish_with_message(format!("Crawl complete! {} URLs processed", total)),
            Err(_) => pb.finish_and_clear(),
        }
    }

    result
}

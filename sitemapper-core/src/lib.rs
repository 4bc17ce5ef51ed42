pub mod crawl;
pub mod report;
pub mod seed;

pub use crawl::{CrawlOptions, execute_crawl};
pub use report::{ReportFormat, render, render_json, render_text};
pub use seed::normalize_seed;

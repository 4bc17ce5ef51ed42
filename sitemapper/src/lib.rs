pub mod commands;
pub mod handlers;

pub use commands::command_argument_builder;
pub use handlers::{CrawlRequest, crawl_request_from_matches, handle_crawl, write_report};

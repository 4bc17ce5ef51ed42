pub mod crawler;
pub mod error;
pub mod extract;
pub mod sitemap;
pub mod url_util;

pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use extract::{Link, ScriptAttr, extract_links};
pub use sitemap::Sitemap;
pub use url_util::{domain_of, resolve_absolute};

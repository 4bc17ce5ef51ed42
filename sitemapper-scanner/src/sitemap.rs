use crate::extract::Link;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub type Children = HashMap<String, bool>;

/// Parent page -> (child URL -> is asset).
///
/// The seed page is recorded under the empty parent, since nothing
/// discovered it.
#[derive(Debug, Default)]
pub struct Sitemap {
    entries: Mutex<HashMap<String, Children>>,
}

impl Sitemap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url` as a child of `parent_url`. Re-adding the same pair
    /// overwrites the asset flag.
    pub fn add_entry(&self, url: &str, parent_url: &str, is_asset: bool) {
        self.lock()
            .entry(parent_url.to_string())
            .or_default()
            .insert(url.to_string(), is_asset);
    }

    pub fn add_link(&self, link: &Link) {
        self.add_entry(link.url(), link.parent_url(), link.is_asset());
    }

    pub fn entries(&self) -> HashMap<String, Children> {
        self.lock().clone()
    }

    pub fn children(&self, parent_url: &str) -> Option<Children> {
        self.lock().get(parent_url).cloned()
    }

    pub fn contains(&self, parent_url: &str, url: &str) -> bool {
        self.lock()
            .get(parent_url)
            .is_some_and(|children| children.contains_key(url))
    }

    pub fn is_asset(&self, parent_url: &str, url: &str) -> Option<bool> {
        self.lock()
            .get(parent_url)
            .and_then(|children| children.get(url).copied())
    }

    /// Number of parents with at least one recorded child.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Every write is a single insert, so a poisoned map is still whole.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Children>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_add_entry() {
        let sitemap = Sitemap::new();
        sitemap.add_entry("http://foo.bar/1", "http://foo.bar", false);
        sitemap.add_entry("http://foo.bar/2", "http://foo.bar", false);
        sitemap.add_entry("http://foo.bar/3", "http://foo.bar/1", true);

        let entries = sitemap.entries();
        assert!(entries.contains_key("http://foo.bar"));
        assert!(entries.contains_key("http://foo.bar/1"));
        assert!(!entries.contains_key("http://foo.bar/2"));
        assert!(!entries.contains_key("http://foo.bar/3"));

        assert!(sitemap.contains("http://foo.bar", "http://foo.bar/1"));
        assert!(sitemap.contains("http://foo.bar", "http://foo.bar/2"));
        assert!(sitemap.contains("http://foo.bar/1", "http://foo.bar/3"));
        assert_eq!(sitemap.len(), 2);
    }

    #[test]
    fn test_add_entry_overwrites_flag() {
        let sitemap = Sitemap::new();
        sitemap.add_entry("http://foo.bar/x", "http://foo.bar", false);
        sitemap.add_entry("http://foo.bar/x", "http://foo.bar", true);

        let children = sitemap.children("http://foo.bar").unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(sitemap.is_asset("http://foo.bar", "http://foo.bar/x"), Some(true));
    }

    #[test]
    fn test_add_link() {
        let sitemap = Sitemap::new();
        let link = Link::new("http://foo.bar/s.css".into(), "http://foo.bar".into(), true);
        sitemap.add_link(&link);
        assert_eq!(sitemap.is_asset("http://foo.bar", "http://foo.bar/s.css"), Some(true));
    }

    #[test]
    fn test_new_sitemap_is_empty() {
        let sitemap = Sitemap::new();
        assert!(sitemap.is_empty());
        assert!(sitemap.children("").is_none());
        assert!(sitemap.entries().is_empty());
    }

    #[test]
    fn test_concurrent_writers() {
        let sitemap = Arc::new(Sitemap::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sitemap = sitemap.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        sitemap.add_entry(&format!("http://foo.bar/{}", i), &format!("p{}", t % 2), false);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(sitemap.len(), 2);
        assert_eq!(sitemap.children("p0").unwrap().len(), 50);
        assert_eq!(sitemap.children("p1").unwrap().len(), 50);
    }
}

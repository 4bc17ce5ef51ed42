// Tests for sitemap report rendering

use sitemapper_core::report::{
    CrawlSummary, LinkKind, ReportFormat, render, render_json, render_text, save_report,
    sorted_entries,
};
use sitemapper_scanner::Sitemap;
use std::str::FromStr;
use tempfile::NamedTempFile;

fn sample_sitemap() -> Sitemap {
    let sitemap = Sitemap::new();
    sitemap.add_entry("http://example.com/", "", false);
    sitemap.add_entry("http://example.com/b", "http://example.com/", false);
    sitemap.add_entry("http://example.com/a", "http://example.com/", false);
    sitemap.add_entry("http://cdn.example.net/s.css", "http://example.com/", true);
    sitemap.add_entry("http://example.com/", "http://example.com/a", false);
    sitemap
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Ok(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("JSON"), Ok(ReportFormat::Json));
    assert!(ReportFormat::from_str("csv").is_err());
}

// ============================================================================
// Text Rendering Tests
// ============================================================================

#[test]
fn test_render_text() {
    let expected = "\
=> http://example.com/
  -> [ASSET] http://cdn.example.net/s.css
  -> [PAGE] http://example.com/a
  -> [PAGE] http://example.com/b
=> http://example.com/a
  -> [PAGE] http://example.com/
";
    assert_eq!(render_text(&sample_sitemap()), expected);
}

#[test]
fn test_render_text_skips_empty_parent() {
    let sitemap = Sitemap::new();
    sitemap.add_entry("http://example.com/", "", false);
    assert_eq!(render_text(&sitemap), "");
}

#[test]
fn test_render_text_empty_sitemap() {
    assert_eq!(render_text(&Sitemap::new()), "");
}

// ============================================================================
// JSON Rendering Tests
// ============================================================================

#[test]
fn test_render_json() -> Result<(), Box<dyn std::error::Error>> {
    let json = render_json(&sample_sitemap())?;
    let value: serde_json::Value = serde_json::from_str(&json)?;

    assert_eq!(value["metadata"]["generator"], "Sitemapper");
    assert_eq!(value["summary"]["parents"], 2);
    assert_eq!(value["summary"]["pages"], 3);
    assert_eq!(value["summary"]["assets"], 1);

    let root = value["pages"]["http://example.com/"]
        .as_array()
        .expect("root should be an array");
    assert_eq!(root.len(), 3);
    assert_eq!(root[0]["url"], "http://cdn.example.net/s.css");
    assert_eq!(root[0]["kind"], "asset");
    assert_eq!(root[1]["kind"], "page");
    assert!(value["pages"].get("").is_none());

    Ok(())
}

#[test]
fn test_render_dispatches_on_format() {
    let sitemap = sample_sitemap();
    assert_eq!(
        render(&sitemap, ReportFormat::Text).unwrap(),
        render_text(&sitemap)
    );
    assert!(
        render(&sitemap, ReportFormat::Json)
            .unwrap()
            .starts_with('{')
    );
}

// ============================================================================
// Summary Tests
// ============================================================================

#[test]
fn test_crawl_summary() {
    let summary = CrawlSummary::from_sitemap(&sample_sitemap());
    assert_eq!(
        summary,
        CrawlSummary {
            parents: 2,
            pages: 3,
            assets: 1
        }
    );
}

#[test]
fn test_sorted_entries_kinds() {
    let entries = sorted_entries(&sample_sitemap());
    let root = &entries["http://example.com/"];
    assert_eq!(root[0].kind, LinkKind::Asset);
    assert_eq!(LinkKind::Asset.label(), "ASSET");
    assert_eq!(LinkKind::Page.label(), "PAGE");
}

// ============================================================================
// Save Tests
// ============================================================================

#[test]
fn test_save_report() -> Result<(), Box<dyn std::error::Error>> {
    let file = NamedTempFile::new()?;
    save_report("=> http://example.com/\n", file.path())?;
    assert_eq!(std::fs::read_to_string(file.path())?, "=> http://example.com/\n");
    Ok(())
}

// Sitemap rendering

use serde::{Deserialize, Serialize};
use sitemapper_scanner::Sitemap;
use sitemapper_scanner::sitemap::Children;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("Unknown report format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Page,
    Asset,
}

impl LinkKind {
    fn from_flag(is_asset: bool) -> Self {
        if is_asset { LinkKind::Asset } else { LinkKind::Page }
    }

    pub fn label(self) -> &'static str {
        match self {
            LinkKind::Page => "PAGE",
            LinkKind::Asset => "ASSET",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEntry {
    pub url: String,
    pub kind: LinkKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub parents: usize,
    pub pages: usize,
    pub assets: usize,
}

impl CrawlSummary {
    pub fn from_sitemap(sitemap: &Sitemap) -> Self {
        let mut summary = CrawlSummary::default();
        for children in sorted_entries(sitemap).values() {
            summary.parents += 1;
            for entry in children {
                match entry.kind {
                    LinkKind::Page => summary.pages += 1,
                    LinkKind::Asset => summary.assets += 1,
                }
            }
        }
        summary
    }
}

/// Parents and their children in lexicographic order. The seed's empty
/// parent is left out since nothing discovered it.
pub fn sorted_entries(sitemap: &Sitemap) -> BTreeMap<String, Vec<ChildEntry>> {
    sort_entries(sitemap.entries())
}

fn sort_entries(entries: HashMap<String, Children>) -> BTreeMap<String, Vec<ChildEntry>> {
    entries
        .into_iter()
        .filter(|(parent, _)| !parent.is_empty())
        .map(|(parent, children)| {
            let mut children: Vec<ChildEntry> = children
                .into_iter()
                .map(|(url, is_asset)| ChildEntry {
                    url,
                    kind: LinkKind::from_flag(is_asset),
                })
                .collect();
            children.sort_by(|a, b| a.url.cmp(&b.url));
            (parent, children)
        })
        .collect()
}

pub fn render_text(sitemap: &Sitemap) -> String {
    let mut report = String::new();

    for (parent, children) in sorted_entries(sitemap) {
        report.push_str(&format!("=> {}\n", parent));
        for child in children {
            report.push_str(&format!("  -> [{}] {}\n", child.kind.label(), child.url));
        }
    }

    report
}

pub fn render_json(sitemap: &Sitemap) -> Result<String, serde_json::Error> {
    let summary = CrawlSummary::from_sitemap(sitemap);

    let json_report = serde_json::json!({
        "metadata": {
            "generator": "Sitemapper",
            "version": env!("CARGO_PKG_VERSION"),
            "generated_at": chrono::Utc::now().to_rfc3339(),
        },
        "summary": summary,
        "pages": sorted_entries(sitemap),
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn render(sitemap: &Sitemap, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(render_text(sitemap)),
        ReportFormat::Json => render_json(sitemap),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

use crate::url_util::resolve_absolute;
use scraper::{ElementRef, Html};

/// A reference found on a crawled page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    url: String,
    parent_url: String,
    is_asset: bool,
}

impl Link {
    pub fn new(url: String, parent_url: String, is_asset: bool) -> Self {
        Self {
            url,
            parent_url,
            is_asset,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn parent_url(&self) -> &str {
        &self.parent_url
    }

    pub fn is_asset(&self) -> bool {
        self.is_asset
    }
}

/// Attribute a `<script>` tag's reference is read from.
///
/// `Href` matches the historical extractor, which never saw real
/// `<script src>` tags. `Src` is what browsers load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScriptAttr {
    #[default]
    Src,
    Href,
}

impl ScriptAttr {
    pub fn name(self) -> &'static str {
        match self {
            ScriptAttr::Src => "src",
            ScriptAttr::Href => "href",
        }
    }
}

/// Extract page links and asset references from an HTML document, in
/// document order.
///
/// Never fails. Markup that doesn't fit the anchor/script/stylesheet shapes
/// contributes nothing, and neither does a reference that can't be resolved
/// against `base_url`.
pub fn extract_links(base_url: &str, html: &[u8], script_attr: ScriptAttr) -> Vec<Link> {
    let document = Html::parse_document(&String::from_utf8_lossy(html));

    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter_map(|element| link_from_element(base_url, element, script_attr))
        .collect()
}

fn link_from_element(base_url: &str, element: ElementRef<'_>, script_attr: ScriptAttr) -> Option<Link> {
    let tag = element.value();

    let (href, is_asset) = match tag.name() {
        "a" => (tag.attr("href"), false),
        "script" => (tag.attr(script_attr.name()), true),
        // Only stylesheets count; icons, feeds and preloads are skipped.
        "link" if tag.attr("rel") == Some("stylesheet") => (tag.attr("href"), true),
        _ => return None,
    };

    // Missing or empty references are placeholders or inline scripts.
    let href = href
        .map(|h| h.trim_matches(|c: char| c.is_ascii_whitespace()))
        .filter(|h| !h.is_empty())?;
    // Control characters inside the reference make it unusable as a URL.
    if href.chars().any(|c| c.is_ascii_control()) {
        return None;
    }
    let url = resolve_absolute(href, base_url).ok()?;

    Some(Link::new(url, base_url.to_string(), is_asset))
}

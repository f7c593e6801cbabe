//! HTML extraction for the tree walker
//!
//! This module handles:
//! - The document handle returned by a navigation
//! - Selector-based extraction of link text and href, in document order
//! - Resolving relative hrefs to absolute URLs
//! - Compiling the per-level selectors from configuration

use crate::config::SelectorConfig;
use crate::tree::Level;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A loaded page: where the navigation ended up and what it returned
///
/// The body is parsed on demand, so a handle is cheap to keep and can be
/// moved between tasks.
#[derive(Debug, Clone)]
pub struct Document {
    url: Url,
    body: String,
}

impl Document {
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }

    /// Final URL of the navigation; relative links resolve against it
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn parse(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// One matched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Element text with whitespace runs collapsed
    pub text: String,

    /// Absolute URL, or empty when the element has no usable href
    pub href: String,
}

/// Extracts every element matching `selector`, in document order
///
/// No match yields an empty Vec. Elements without an href are kept with an
/// empty link, since their text may still be useful.
///
/// # Example
///
/// ```
/// use catalog_crawler::crawler::{extract, Document};
/// use scraper::Selector;
/// use url::Url;
///
/// let doc = Document::new(
///     Url::parse("https://shop.example.com/").unwrap(),
///     r#"<ul><li><a href="/brakes">Brakes</a></li></ul>"#,
/// );
/// let items = extract(&doc, &Selector::parse("li a").unwrap());
/// assert_eq!(items[0].text, "Brakes");
/// assert_eq!(items[0].href, "https://shop.example.com/brakes");
/// ```
pub fn extract(document: &Document, selector: &Selector) -> Vec<Extracted> {
    let html = document.parse();
    html.select(selector)
        .map(|element| Extracted {
            text: element_text(&element),
            href: element
                .value()
                .attr("href")
                .map(|href| resolve_link(href, document.url()))
                .unwrap_or_default(),
        })
        .collect()
}

/// Returns true if at least one element matches `selector`
pub fn has_match(document: &Document, selector: &Selector) -> bool {
    document.parse().select(selector).next().is_some()
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves an href to an absolute URL
///
/// Already-absolute http(s) hrefs are returned unchanged, so resolving twice
/// gives the same result as resolving once. Relative hrefs are joined against
/// `base`, the page's final URL rather than the site root, so path-relative
/// links and links on redirected pages follow the browser's resolution. Returns an empty string for:
/// - empty hrefs and fragment-only anchors
/// - `javascript:`, `mailto:`, `tel:`, `data:` and other non-HTTP schemes
/// - hrefs that cannot be joined to `base`
pub fn resolve_link(href: &str, base: &Url) -> String {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return String::new();
    }

    if let Ok(absolute) = Url::parse(href) {
        return if is_http(&absolute) {
            href.to_string()
        } else {
            String::new()
        };
    }

    match base.join(href) {
        Ok(joined) if is_http(&joined) => joined.to_string(),
        _ => String::new(),
    }
}

fn is_http(url: &Url) -> bool {
    url.scheme() == "http" || url.scheme() == "https"
}

/// The three selectors of the tree, compiled once
#[derive(Debug, Clone)]
pub struct LevelSelectors {
    category: Selector,
    subcategory: Selector,
    product: Selector,
}

impl LevelSelectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            category: compile_selector(&config.category)?,
            subcategory: compile_selector(&config.subcategory)?,
            product: compile_selector(&config.product)?,
        })
    }

    /// The selector that finds the children on a page of `level`
    ///
    /// Product leaves have no page, hence no selector.
    pub fn for_children_of(&self, level: Level) -> Option<&Selector> {
        match level {
            Level::Home => Some(&self.category),
            Level::Category => Some(&self.subcategory),
            Level::SubCategory => Some(&self.product),
            Level::Product => None,
        }
    }
}

fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

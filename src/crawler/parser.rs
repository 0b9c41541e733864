//! Directory-listing parser
//!
//! This module extracts from a listing page:
//! - Candidate links as `(href, visible text)` in document order
//! - The page title, for logging

use scraper::{Html, Selector};

/// Hrefs that point at the current or parent directory
const SELF_OR_PARENT: &[&str] = &["../", "./", "/", "..", "."];

/// Schemes that never lead to a listing or a file
const IGNORED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Anchor text used by listing generators for the parent link
const PARENT_LABEL: &str = "parent directory";

/// One anchor that survived filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLink {
    /// The raw href attribute, trimmed
    pub href: String,

    /// The anchor's visible text, trimmed
    pub text: String,
}

/// Extracted information from a listing page
#[derive(Debug, Clone, Default)]
pub struct ParsedListing {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Candidate links in document order
    pub links: Vec<ListingLink>,
}

/// Parses a listing page and extracts its candidate links
///
/// # Link Extraction Rules
///
/// **Exclude:**
/// - Missing or empty `href`
/// - Self/parent markers (`../`, `./`, bare `/`)
/// - Query-only (`?C=M;O=A` sort links) and fragment-only hrefs
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - Anchors whose text contains "Parent Directory" (any case)
///
/// # Example
///
/// ```
/// use dirlist_catalog::crawler::parse_listing;
///
/// let html = r#"<html><body><a href="../">Parent Directory</a><a href="Drama/">Drama/</a></body></html>"#;
/// let parsed = parse_listing(html).unwrap();
/// assert_eq!(parsed.links.len(), 1);
/// assert_eq!(parsed.links[0].href, "Drama/");
/// ```
pub fn parse_listing(html: &str) -> Result<ParsedListing, String> {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let links = extract_links(&document)?;

    Ok(ParsedListing { title, links })
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts every anchor that passes the listing filters
fn extract_links(document: &Html) -> Result<Vec<ListingLink>, String> {
    let selector =
        Selector::parse("a[href]").map_err(|e| format!("invalid anchor selector: {:?}", e))?;

    let links = document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?.trim();
            let text = element.text().collect::<String>().trim().to_string();
            keep_link(href, &text).then(|| ListingLink {
                href: href.to_string(),
                text,
            })
        })
        .collect();

    Ok(links)
}

/// Decides whether an anchor is a candidate child of the listing
fn keep_link(href: &str, text: &str) -> bool {
    if href.is_empty() || SELF_OR_PARENT.contains(&href) {
        return false;
    }

    if href.starts_with('?') || href.starts_with('#') {
        return false;
    }

    let lower_href = href.to_ascii_lowercase();
    if IGNORED_SCHEMES
        .iter()
        .any(|scheme| lower_href.starts_with(scheme))
    {
        return false;
    }

    !text.to_lowercase().contains(PARENT_LABEL)
}

//! HTML-to-text and link extraction
//!
//! Parses a fetched page once and produces an owned extract: plain text,
//! footer-region text, and the anchor list. Parsing happens up front so the
//! rest of the pipeline works on plain strings (the parsed document is not
//! Send and must not be held across await points).

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

static FOOTER_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("footer").unwrap());

static FOOTER_CLASS_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[class*="footer" i], section[class*="footer" i]"#).unwrap());

static FOOTER_ID_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[id*="footer" i], section[id*="footer" i]"#).unwrap());

/// An anchor element: resolved later against the page URL
#[derive(Debug, Clone)]
pub struct PageLink {
    pub href: String,
    pub text: String,
}

/// Owned extract of one parsed page
#[derive(Debug, Clone)]
pub struct PageExtract {
    /// Visible text of the whole page, one text node per line
    pub text: String,
    /// Text of the footer region (see [`PageExtract::footer_text`] fallbacks)
    pub footer_text: String,
    /// All anchors with an href attribute
    pub links: Vec<PageLink>,
}

/// Parse an HTML document and extract text, footer text, and links.
///
/// Footer detection prefers a semantic `<footer>` element, then containers
/// whose class mentions "footer", then containers whose id does; if none
/// exist the last ~20% of the page's text lines stand in for the footer,
/// since organizational addresses conventionally sit near the bottom.
pub fn extract_page(html: &str) -> PageExtract {
    let document = Html::parse_document(html);

    let text = element_text(document.root_element());

    let footer_text = select_first_text(&document, &FOOTER_SELECTOR)
        .or_else(|| select_first_text(&document, &FOOTER_CLASS_SELECTOR))
        .or_else(|| select_first_text(&document, &FOOTER_ID_SELECTOR))
        .unwrap_or_else(|| tail_lines(&text, 0.8));

    let links = document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            Some(PageLink {
                href: href.to_string(),
                text: element.text().collect::<Vec<_>>().join(" ").trim().to_string(),
            })
        })
        .collect();

    PageExtract {
        text,
        footer_text,
        links,
    }
}

/// Clip a string to at most `max_chars` characters on a char boundary
pub fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn select_first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().map(element_text)
}

/// Lines of `text` from the given fraction onward
fn tail_lines(text: &str, from_fraction: f64) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = (lines.len() as f64 * from_fraction) as usize;
    lines[start.min(lines.len())..].join("\n")
}

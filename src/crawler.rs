//! Info-page crawling
//!
//! Discovers About/Contact/Terms-like links on the main page and fetches a
//! bounded number of them to enlarge the evidence pool. Enrichment is
//! best-effort: every attempt is recorded in the outcome, and a failed
//! fetch never fails the analysis.

use crate::fetch::{FetchError, PageFetcher};
use crate::html::{self, PageLink};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Keywords marking an informational link or URL
pub const INFO_KEYWORDS: [&str; 5] = ["about", "contact", "terms", "privacy", "legal"];

/// Candidate links examined per page
const MAX_CANDIDATES: usize = 6;
/// Successful fetches per page
const MAX_FETCHED: usize = 3;
/// Conventional paths probed when link discovery comes up short
const FALLBACK_PATHS: [&str; 4] = ["/contact", "/about", "/contact-us", "/about-us"];

/// Label used when weighting evidence found on an auxiliary page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    Terms,
    AboutContact,
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageType::Terms => write!(f, "terms"),
            PageType::AboutContact => write!(f, "about/contact"),
        }
    }
}

/// A successfully fetched auxiliary page
#[derive(Debug, Clone)]
pub struct CrawledPage {
    pub url: String,
    /// Short label for the evidence trail (href or fallback path)
    pub label: String,
    pub page_type: PageType,
    pub via_fallback: bool,
    /// Extracted plain text of the page
    pub text: String,
}

/// A fetch attempt that produced no page
#[derive(Debug, Clone)]
pub struct CrawlFailure {
    pub url: String,
    pub label: String,
    pub via_fallback: bool,
    pub error: String,
}

#[derive(Debug, Clone)]
pub enum CrawlAttempt {
    Fetched(CrawledPage),
    Failed(CrawlFailure),
}

/// Every attempt made while crawling one site, in order
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    pub attempts: Vec<CrawlAttempt>,
    pub fetched_count: usize,
}

/// True when the URL itself is an informational page, in which case its
/// full text (not just the footer) is scanned for addresses
pub fn is_info_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    INFO_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Pick and order candidate info links: links whose href or visible text
/// mentions an info keyword, sorted contact-first, capped at 6
pub fn select_candidates(links: &[PageLink]) -> Vec<&PageLink> {
    let mut candidates: Vec<&PageLink> = links
        .iter()
        .filter(|link| {
            let href = link.href.to_lowercase();
            let text = link.text.to_lowercase();
            INFO_KEYWORDS
                .iter()
                .any(|keyword| href.contains(keyword) || text.contains(keyword))
        })
        .collect();
    candidates.sort_by_key(|link| link_priority(&link.href.to_lowercase()));
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

/// Contact pages carry the densest address/phone signal, so they sort first
fn link_priority(href: &str) -> u8 {
    if href.contains("contact") {
        0
    } else if href.contains("about") {
        1
    } else if href.contains("terms") || href.contains("privacy") || href.contains("legal") {
        2
    } else {
        3
    }
}

/// Crawl the info pages of one site: discovered links first, then the
/// conventional fallback paths until 3 pages have been fetched.
pub async fn crawl_info_pages<F: PageFetcher>(
    fetcher: &F,
    base: &Url,
    links: &[PageLink],
    timeout: Duration,
) -> CrawlOutcome {
    let mut outcome = CrawlOutcome::default();
    let mut checked: HashSet<String> = HashSet::new();

    for link in select_candidates(links) {
        if outcome.fetched_count >= MAX_FETCHED {
            break;
        }
        let full_url = match base.join(&link.href) {
            Ok(resolved) => resolved.to_string(),
            Err(e) => {
                debug!("Skipping unresolvable href {}: {}", link.href, e);
                continue;
            }
        };
        if !checked.insert(full_url.clone()) {
            continue;
        }

        let page_type = if link.href.to_lowercase().contains("terms") {
            PageType::Terms
        } else {
            PageType::AboutContact
        };
        let label = html::clip(&link.href, 30).to_string();
        attempt(fetcher, &mut outcome, full_url, label, page_type, false, timeout).await;
    }

    if outcome.fetched_count < MAX_FETCHED {
        for path in FALLBACK_PATHS {
            if outcome.fetched_count >= MAX_FETCHED {
                break;
            }
            let fallback_url = match base.join(path) {
                Ok(resolved) => resolved.to_string(),
                Err(_) => continue,
            };
            if !checked.insert(fallback_url.clone()) {
                continue;
            }
            attempt(
                fetcher,
                &mut outcome,
                fallback_url,
                path.to_string(),
                PageType::AboutContact,
                true,
                timeout,
            )
            .await;
        }
    }

    outcome
}

async fn attempt<F: PageFetcher>(
    fetcher: &F,
    outcome: &mut CrawlOutcome,
    url: String,
    label: String,
    page_type: PageType,
    via_fallback: bool,
    timeout: Duration,
) {
    match fetcher.fetch(&url, timeout).await {
        Ok(page) if page.status_code == 200 => {
            let extract = html::extract_page(&page.body);
            outcome.attempts.push(CrawlAttempt::Fetched(CrawledPage {
                url,
                label,
                page_type,
                via_fallback,
                text: extract.text,
            }));
            outcome.fetched_count += 1;
        }
        Ok(page) => {
            debug!("Info page {} returned HTTP {}", url, page.status_code);
            outcome.attempts.push(CrawlAttempt::Failed(CrawlFailure {
                url,
                label,
                via_fallback,
                error: format!("HTTP {}", page.status_code),
            }));
        }
        Err(e) => {
            debug!("Info page {} failed: {}", url, e);
            outcome.attempts.push(CrawlAttempt::Failed(CrawlFailure {
                url,
                label,
                via_fallback,
                error: describe_error(&e),
            }));
        }
    }
}

fn describe_error(error: &FetchError) -> String {
    match error {
        FetchError::Timeout => "timeout".to_string(),
        FetchError::Connection => "connection error".to_string(),
        FetchError::Other(message) => message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(href: &str, text: &str) -> PageLink {
        PageLink {
            href: href.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_contact_links_sort_first() {
        let links = vec![
            link("/terms", "Terms of Service"),
            link("/about", "About us"),
            link("/contact", "Contact"),
            link("/blog", "Blog"),
        ];
        let candidates = select_candidates(&links);
        let hrefs: Vec<&str> = candidates.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/contact", "/about", "/terms"]);
    }

    #[test]
    fn test_link_text_alone_qualifies() {
        let links = vec![link("/page-17", "Contact our team")];
        let candidates = select_candidates(&links);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_candidates_capped_at_six() {
        let links: Vec<PageLink> = (0..10)
            .map(|i| link(&format!("/about-{}", i), "About"))
            .collect();
        assert_eq!(select_candidates(&links).len(), 6);
    }

    #[test]
    fn test_about_with_contact_in_href_counts_as_contact() {
        let links = vec![
            link("/about", "About"),
            link("/about/contact", "Reach us"),
        ];
        let candidates = select_candidates(&links);
        assert_eq!(candidates[0].href, "/about/contact");
    }

    #[test]
    fn test_is_info_url() {
        assert!(is_info_url("https://example.com/about-us"));
        assert!(is_info_url("https://example.com/legal/TERMS"));
        assert!(!is_info_url("https://example.com/blog/post-1"));
    }

    #[test]
    fn test_page_type_labels() {
        assert_eq!(PageType::Terms.to_string(), "terms");
        assert_eq!(PageType::AboutContact.to_string(), "about/contact");
    }
}

//! Per-URL analysis pipeline
//!
//! Runs the full pipeline for one URL: domain attribution, main-page
//! fetch, address/phone evidence collection, info-page crawling, evidence
//! aggregation, and cultural relevance classification, assembled into one
//! immutable `AnalysisResult`.

use crate::address;
use crate::classify::{classify, CulturalCategory};
use crate::concepts::scan_concepts;
use crate::crawler::{self, CrawlAttempt, PageType};
use crate::domain::{attribute_domain, DomainMatchKind, DomainVerdict};
use crate::fetch::{FetchError, PageFetcher};
use crate::html::{self, clip, PageExtract};
use crate::phone;
use crate::profile::LocaleProfile;
use crate::score::{content_verdict, score_countries, Evidence, SourceKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Main-page request timeout
pub const PRIMARY_TIMEOUT: Duration = Duration::from_secs(15);
/// Auxiliary info-page request timeout
pub const AUX_TIMEOUT: Duration = Duration::from_secs(5);

/// Addresses retained from the main page
const MAX_MAIN_ADDRESSES: usize = 3;
/// Addresses retained per auxiliary page
const MAX_AUX_ADDRESSES: usize = 2;

/// Outcome of the main-page fetch, rendered into the report vocabulary
/// ("working", "404", "error_503", "timeout", ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Unknown,
    Working,
    HttpError(u16),
    Timeout,
    ConnectionError,
    OtherError,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStatus::Unknown => write!(f, "unknown"),
            FetchStatus::Working => write!(f, "working"),
            FetchStatus::HttpError(404) => write!(f, "404"),
            FetchStatus::HttpError(code) => write!(f, "error_{}", code),
            FetchStatus::Timeout => write!(f, "timeout"),
            FetchStatus::ConnectionError => write!(f, "connection_error"),
            FetchStatus::OtherError => write!(f, "error"),
        }
    }
}

impl Serialize for FetchStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The complete, immutable analysis record for one URL
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub url: String,
    pub fetch_status: FetchStatus,
    pub status_code: Option<u16>,
    pub attributed_country: String,
    pub evidence: Vec<String>,
    pub cultural_category: CulturalCategory,
    pub concept_matches: BTreeMap<String, Vec<String>>,
    pub unique_concept_count: usize,
    pub tracked_vocabulary_hits: Vec<String>,
    pub turn_number: Option<u32>,
}

impl AnalysisResult {
    fn new(url: &str, turn_number: Option<u32>) -> Self {
        AnalysisResult {
            url: url.to_string(),
            fetch_status: FetchStatus::Unknown,
            status_code: None,
            attributed_country: "Unknown".to_string(),
            evidence: Vec::new(),
            cultural_category: CulturalCategory::Unknown,
            concept_matches: BTreeMap::new(),
            unique_concept_count: 0,
            tracked_vocabulary_hits: Vec::new(),
            turn_number,
        }
    }

    /// Result for a URL whose analysis task could not complete at all
    pub(crate) fn task_failed(url: &str, turn_number: Option<u32>, message: &str) -> Self {
        let mut result = Self::new(url, turn_number);
        result.fetch_status = FetchStatus::OtherError;
        result.evidence.push(format!("Error: {}", message));
        result
    }
}

/// Analyzes URLs against one locale profile through a page fetcher
#[derive(Debug, Clone)]
pub struct UrlAnalyzer<F> {
    profile: Arc<LocaleProfile>,
    fetcher: F,
    primary_timeout: Duration,
    aux_timeout: Duration,
}

impl<F: PageFetcher + Sync> UrlAnalyzer<F> {
    pub fn new(profile: Arc<LocaleProfile>, fetcher: F) -> Self {
        Self::with_timeouts(profile, fetcher, PRIMARY_TIMEOUT, AUX_TIMEOUT)
    }

    pub fn with_timeouts(
        profile: Arc<LocaleProfile>,
        fetcher: F,
        primary_timeout: Duration,
        aux_timeout: Duration,
    ) -> Self {
        UrlAnalyzer {
            profile,
            fetcher,
            primary_timeout,
            aux_timeout,
        }
    }

    pub fn profile(&self) -> &LocaleProfile {
        &self.profile
    }

    /// Analyze a single URL for location and cultural context.
    /// Errors degrade to a recorded fetch status; this never fails.
    pub async fn analyze(&self, url: &str, turn_number: Option<u32>) -> AnalysisResult {
        debug!("Analyzing {}", url);
        let mut result = AnalysisResult::new(url, turn_number);

        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                result.fetch_status = FetchStatus::OtherError;
                result.evidence.push(format!("Error: invalid URL: {}", e));
                return result;
            }
        };
        let host = parsed.host_str().unwrap_or("").to_lowercase();

        let domain_verdict = attribute_domain(&self.profile, &host);
        if let Some(verdict) = &domain_verdict {
            result.attributed_country = verdict.country.clone();
            result.evidence.push(verdict.descriptor.clone());
        }

        match self.fetcher.fetch(url, self.primary_timeout).await {
            Ok(page) => {
                result.status_code = Some(page.status_code);
                match page.status_code {
                    200 => {
                        result.fetch_status = FetchStatus::Working;
                        self.analyze_content(
                            url,
                            &parsed,
                            &host,
                            &page.body,
                            domain_verdict.as_ref(),
                            &mut result,
                        )
                        .await;
                    }
                    404 => {
                        result.fetch_status = FetchStatus::HttpError(404);
                        result.evidence.push("Page not found (404)".to_string());
                    }
                    code => {
                        result.fetch_status = FetchStatus::HttpError(code);
                        result.evidence.push(format!("HTTP status code: {}", code));
                    }
                }
            }
            Err(FetchError::Timeout) => {
                result.fetch_status = FetchStatus::Timeout;
                result.evidence.push(format!(
                    "Request timed out after {} seconds",
                    self.primary_timeout.as_secs()
                ));
            }
            Err(FetchError::Connection) => {
                result.fetch_status = FetchStatus::ConnectionError;
                result.evidence.push("Could not connect to URL".to_string());
            }
            Err(FetchError::Other(message)) => {
                result.fetch_status = FetchStatus::OtherError;
                result.evidence.push(format!("Error: {}", message));
            }
        }

        info!(
            "Analyzed {}: status={}, country={}, category={}",
            url, result.fetch_status, result.attributed_country, result.cultural_category
        );
        result
    }

    async fn analyze_content(
        &self,
        url: &str,
        parsed: &Url,
        host: &str,
        body: &str,
        domain_verdict: Option<&DomainVerdict>,
        result: &mut AnalysisResult,
    ) {
        let extract = html::extract_page(body);

        let content_country = self
            .collect_geo_evidence(url, parsed, host, &extract, result)
            .await;

        match (domain_verdict, content_country) {
            (Some(verdict), Some(content)) if content != verdict.country => {
                // The domain verdict stands; the disagreement is recorded
                // so callers can audit it.
                let note = match verdict.kind {
                    DomainMatchKind::KnownOrganization => format!(
                        "Content analysis suggested: {} (but known organization is {})",
                        content, verdict.country
                    ),
                    _ => format!(
                        "Content analysis suggested: {} (but domain says {})",
                        content, verdict.country
                    ),
                };
                result.evidence.push(note);
            }
            (None, Some(content)) => {
                result.attributed_country = content;
            }
            _ => {}
        }

        if extract.text.trim().is_empty() {
            result.cultural_category = CulturalCategory::NotRelated;
            return;
        }

        let scan = scan_concepts(&self.profile, &extract.text);
        result.cultural_category = classify(&scan, self.profile.dilemma_concept_threshold);
        result.unique_concept_count = scan.unique_concept_count;
        result.concept_matches = scan.matches;
        result.tracked_vocabulary_hits = scan.tracked_vocabulary_hits;
    }

    /// Gather address and phone evidence from the main page and crawled
    /// info pages, returning the content-derived country verdict.
    async fn collect_geo_evidence(
        &self,
        url: &str,
        parsed: &Url,
        host: &str,
        extract: &PageExtract,
        result: &mut AnalysisResult,
    ) -> Option<String> {
        if host.contains(".bank") {
            result
                .evidence
                .push("Domain is .bank TLD (US-based)".to_string());
            return Some("US".to_string());
        }

        let mut items: Vec<Evidence> = Vec::new();

        // Info pages are scanned whole; ordinary pages only in the footer
        // region, where organizational addresses conventionally live.
        let scan_text = if crawler::is_info_url(url) {
            &extract.text
        } else {
            &extract.footer_text
        };

        for address in address::extract_addresses(&self.profile, scan_text, MAX_MAIN_ADDRESSES) {
            result
                .evidence
                .push(format!("Physical address found: {}...", clip(&address.snippet, 50)));
            items.push(Evidence::new(
                SourceKind::Address,
                address.country,
                format!("in address: {}", clip(&address.snippet, 30)),
            ));
        }

        for phone_match in phone::detect_phone_codes(&self.profile, scan_text) {
            result
                .evidence
                .push(format!("Phone number found: {}", phone_match.label));
            items.push(Evidence::new(
                SourceKind::Phone,
                phone_match.label,
                "Phone pattern detected",
            ));
        }

        let outcome =
            crawler::crawl_info_pages(&self.fetcher, parsed, &extract.links, self.aux_timeout)
                .await;

        for crawl_attempt in &outcome.attempts {
            match crawl_attempt {
                CrawlAttempt::Fetched(page) => {
                    if page.via_fallback {
                        result
                            .evidence
                            .push(format!("Checking fallback {}...", page.label));
                    } else {
                        result.evidence.push(format!("Checking {}...", page.label));
                    }
                    let kind = match page.page_type {
                        PageType::Terms => SourceKind::TermsAddress,
                        PageType::AboutContact => SourceKind::AboutAddress,
                    };
                    for address in
                        address::extract_addresses(&self.profile, &page.text, MAX_AUX_ADDRESSES)
                    {
                        result.evidence.push(format!(
                            "{} page address: {}...",
                            page.page_type,
                            clip(&address.snippet, 40)
                        ));
                        items.push(Evidence::new(
                            kind,
                            address.country,
                            format!("in address: {}", clip(&address.snippet, 30)),
                        ));
                    }
                    for phone_match in phone::detect_phone_codes(&self.profile, &page.text) {
                        result.evidence.push(format!(
                            "{} page phone: {}",
                            page.page_type, phone_match.label
                        ));
                        items.push(Evidence::new(
                            SourceKind::Phone,
                            phone_match.label,
                            "Phone pattern detected",
                        ));
                    }
                }
                CrawlAttempt::Failed(failure) => {
                    if !failure.via_fallback {
                        result.evidence.push(format!("Checking {}...", failure.label));
                        result
                            .evidence
                            .push(format!("Info page unavailable: {}", failure.error));
                    }
                }
            }
        }

        let scores = score_countries(&self.profile, &items);
        content_verdict(&scores).map(|(country, _)| country)
    }
}

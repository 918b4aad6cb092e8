//! geocite: evidence-fusion geo-attribution and cultural relevance
//! classification for cited web pages.
//!
//! Given a URL and a locale profile, the engine attributes the most
//! probable country of the publishing organization (domain registries,
//! addresses, phone codes, weighted scoring with conflict resolution) and
//! classifies whether the page engages the locale's cultural practice or
//! merely adjacent generic themes. Used to audit whether advice-generating
//! systems cite geographically and culturally appropriate sources.

pub mod address;
pub mod analyzer;
pub mod classify;
pub mod concepts;
pub mod crawler;
pub mod domain;
pub mod fetch;
pub mod html;
pub mod phone;
pub mod profile;
pub mod runner;
pub mod score;

pub use analyzer::{AnalysisResult, FetchStatus, UrlAnalyzer};
pub use classify::CulturalCategory;
pub use fetch::{FetchError, HttpFetcher, PageFetcher};
pub use profile::{LocaleProfile, ProfileError};
pub use runner::{run_batch, summarize, BatchSummary, RunnerConfig, UrlTask};

//! Domain-based country attribution
//!
//! Resolves a country from the URL host alone, before any network fetch.
//! Checks run in order: known-organization registry, country-code TLD
//! table, hostname-substring hints, and the generic `.edu` fallback.

use crate::profile::LocaleProfile;
use tracing::debug;

/// How the verdict was derived. Known-organization matches are
/// authoritative in conflict resolution; the rest yield a different
/// disagreement note when content evidence points elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainMatchKind {
    KnownOrganization,
    TldSuffix,
    NameHint,
    EduDefault,
}

/// A country verdict derived from the URL host
#[derive(Debug, Clone)]
pub struct DomainVerdict {
    pub country: String,
    pub kind: DomainMatchKind,
    pub descriptor: String,
}

/// Attribute a country to a hostname using the profile's registries.
/// Returns `None` when no registry, TLD, or hint applies.
pub fn attribute_domain(profile: &LocaleProfile, host: &str) -> Option<DomainVerdict> {
    let host = host.to_lowercase();
    let bare_host = host.strip_prefix("www.").unwrap_or(&host);

    for registry in &profile.known_organizations {
        for domain in &registry.domains {
            if matches_known_domain(&host, domain) || matches_known_domain(bare_host, domain) {
                debug!("Host {} matches known {} organization {}", host, registry.country, domain);
                return Some(DomainVerdict {
                    country: registry.country.clone(),
                    kind: DomainMatchKind::KnownOrganization,
                    descriptor: format!("Known {} organization: {}", registry.country, host),
                });
            }
        }
    }

    for tld in &profile.country_tlds {
        if host.ends_with(&tld.suffix) {
            return Some(DomainVerdict {
                country: tld.country.clone(),
                kind: DomainMatchKind::TldSuffix,
                descriptor: format!("Domain TLD: {}", tld.suffix),
            });
        }
    }

    // Substring hints run against the hostname with separators collapsed,
    // so "new-york-times.com" still matches "newyork".
    let collapsed: String = host.chars().filter(|c| *c != '.' && *c != '-').collect();
    for hint in &profile.domain_hints {
        for substring in &hint.substrings {
            if collapsed.contains(substring.as_str()) {
                return Some(DomainVerdict {
                    country: hint.country.clone(),
                    kind: DomainMatchKind::NameHint,
                    descriptor: format!(
                        "Domain name suggests {}: contains \"{}\"",
                        hint.country, substring
                    ),
                });
            }
        }
    }

    if host.ends_with(".edu") {
        return Some(DomainVerdict {
            country: profile.edu_default_country.clone(),
            kind: DomainMatchKind::EduDefault,
            descriptor: format!("Domain ends with .edu: {}", host),
        });
    }

    None
}

/// Exact or subdomain match: `x.y.knowndomain.tld` matches `knowndomain.tld`
fn matches_known_domain(host: &str, known: &str) -> bool {
    host == known || host.ends_with(&format!(".{}", known))
}

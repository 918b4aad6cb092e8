//! Cultural relevance classification
//!
//! A small precedence machine turning a concept scan into one of four
//! categories. Evaluated once per URL against the main-page text only;
//! auxiliary pages never contribute.

use crate::concepts::ConceptScan;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CulturalCategory {
    /// No text was available to classify (fetch failed or non-200)
    Unknown,
    /// Broad concept coverage: the page engages the dilemma holistically
    AddressesUserDilemma,
    /// Locale-specific term plus defining language: an explainer
    DefinesPractice,
    /// Relevant concepts present, none locale-specific
    GenericAdvice,
    /// No concepts matched
    NotRelated,
}

impl fmt::Display for CulturalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CulturalCategory::Unknown => "unknown",
            CulturalCategory::AddressesUserDilemma => "addresses_user_dilemma",
            CulturalCategory::DefinesPractice => "defines_practice",
            CulturalCategory::GenericAdvice => "generic_advice",
            CulturalCategory::NotRelated => "not_related",
        };
        write!(f, "{}", label)
    }
}

impl Serialize for CulturalCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Classify a concept scan. Rules are evaluated in precedence order and
/// the first matching rule wins:
///
/// 1. concept count at or above `threshold` -> addresses the dilemma
/// 2. locale-specific concept plus definition language -> defines the practice
/// 3. concepts present but none locale-specific -> generic advice
/// 4. nothing matched -> not related
/// 5. otherwise (locale-specific, narrow, no defining language) the page
///    still centers the practice -> defines the practice
pub fn classify(scan: &ConceptScan, threshold: usize) -> CulturalCategory {
    let n = scan.unique_concept_count;

    if n >= threshold {
        CulturalCategory::AddressesUserDilemma
    } else if scan.has_locale_specific && scan.has_definition_language {
        CulturalCategory::DefinesPractice
    } else if n >= 1 && !scan.has_locale_specific {
        CulturalCategory::GenericAdvice
    } else if n == 0 {
        CulturalCategory::NotRelated
    } else if scan.has_locale_specific {
        CulturalCategory::DefinesPractice
    } else {
        CulturalCategory::GenericAdvice
    }
}

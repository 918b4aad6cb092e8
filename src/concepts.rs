//! Cultural concept matching
//!
//! Maps lower-cased page text to concept matches using literal substring
//! containment, with configured multi-word keywords expanding to an
//! equivalence class of phrasings. Also scans the tracked vocabulary
//! (individualistic/Western framing terms) and the definition/advice
//! language indicators; tracked terms never affect the concept count.

use crate::profile::LocaleProfile;
use std::collections::BTreeMap;

/// Outcome of scanning one page's text against a profile's dictionaries
#[derive(Debug, Clone, Default)]
pub struct ConceptScan {
    /// Concept name to the keywords that matched it
    pub matches: BTreeMap<String, Vec<String>>,
    /// Number of distinct concepts with at least one matched keyword
    pub unique_concept_count: usize,
    /// Tracked vocabulary terms present in the text (reported, never scored)
    pub tracked_vocabulary_hits: Vec<String>,
    /// A definition-style phrase ("refers to", "is defined as", ...) is present
    pub has_definition_language: bool,
    /// An advice-style phrase ("how to navigate", "tips for", ...) is present
    pub has_advice_language: bool,
    /// At least one matched concept is in the locale-specific subset
    pub has_locale_specific: bool,
}

/// Scan `text` for cultural concepts, tracked vocabulary, and language
/// indicators. Matching is case-insensitive substring containment.
pub fn scan_concepts(profile: &LocaleProfile, text: &str) -> ConceptScan {
    let lower = text.to_lowercase();
    let mut matches: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (concept, keywords) in &profile.concepts {
        let mut found: Vec<String> = Vec::new();
        for keyword in keywords {
            if keyword_matches(profile, keyword, &lower) {
                found.push(keyword.clone());
            }
        }
        if !found.is_empty() {
            matches.insert(concept.clone(), found);
        }
    }

    let unique_concept_count = matches.len();
    let has_locale_specific = profile
        .locale_specific_concepts
        .iter()
        .any(|concept| matches.contains_key(concept));

    let tracked_vocabulary_hits = profile
        .tracked_vocabulary
        .iter()
        .filter(|term| lower.contains(term.to_lowercase().as_str()))
        .cloned()
        .collect();

    let has_definition_language = profile
        .definition_phrases
        .iter()
        .any(|phrase| lower.contains(phrase.as_str()));
    let has_advice_language = profile
        .advice_phrases
        .iter()
        .any(|phrase| lower.contains(phrase.as_str()));

    ConceptScan {
        matches,
        unique_concept_count,
        tracked_vocabulary_hits,
        has_definition_language,
        has_advice_language,
        has_locale_specific,
    }
}

/// A keyword with a configured equivalence class matches when ANY member
/// of the class is found; other keywords match literally.
fn keyword_matches(profile: &LocaleProfile, keyword: &str, lower_text: &str) -> bool {
    match profile.flexible_keywords.get(keyword) {
        Some(variants) => variants.iter().any(|v| lower_text.contains(v.as_str())),
        None => lower_text.contains(keyword),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::LocaleProfile;

    fn indian() -> LocaleProfile {
        LocaleProfile::builtin("indian").unwrap()
    }

    #[test]
    fn test_literal_concept_match() {
        let scan = scan_concepts(&indian(), "Living in a joint family has its challenges.");
        assert!(scan.matches.contains_key("joint_family"));
        assert!(scan.has_locale_specific);
    }

    #[test]
    fn test_flexible_variant_expansion() {
        // "multigenerational household" sits in the "joint family"
        // equivalence class
        let scan = scan_concepts(&indian(), "A multigenerational household under one roof.");
        assert!(scan.matches.contains_key("joint_family"));
    }

    #[test]
    fn test_currency_symbol_variant() {
        let scan = scan_concepts(&indian(), "He sends ₹40,000 home every month.");
        assert!(scan.matches.contains_key("rupees"));
        assert!(scan.has_locale_specific);
    }

    #[test]
    fn test_case_insensitive_matching() {
        let scan = scan_concepts(&indian(), "JOINT FAMILY life in modern India");
        assert!(scan.matches.contains_key("joint_family"));
    }

    #[test]
    fn test_unique_count_is_distinct_concepts() {
        let text = "joint family, salary contribution, and grandfather authority expectations";
        let scan = scan_concepts(&indian(), text);
        assert_eq!(scan.unique_concept_count, scan.matches.len());
        assert!(scan.unique_concept_count >= 3);
    }

    #[test]
    fn test_tracked_vocabulary_reported_not_scored() {
        let scan = scan_concepts(&indian(), "Learn to set boundaries and build financial independence.");
        assert!(!scan.tracked_vocabulary_hits.is_empty());
        assert_eq!(scan.unique_concept_count, 0, "tracked terms never count as concepts");
    }

    #[test]
    fn test_definition_language_detected() {
        let scan = scan_concepts(&indian(), "Salary pooling refers to sharing income with elders.");
        assert!(scan.has_definition_language);
    }

    #[test]
    fn test_empty_text() {
        let scan = scan_concepts(&indian(), "");
        assert_eq!(scan.unique_concept_count, 0);
        assert!(scan.matches.is_empty());
        assert!(!scan.has_locale_specific);
    }
}

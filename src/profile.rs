//! Locale profile loading and validation
//!
//! A locale profile is the immutable knowledge base for one classification
//! target: known-organization registries, TLD and phone-code tables, postal
//! and location regexes, and the cultural concept dictionary. Profiles are
//! loaded once from TOML, validated (every regex must compile), and passed
//! by reference into the engine - never mutated at runtime.

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Built-in profile for Indian cultural context analysis
pub const INDIAN_PROFILE: &str = include_str!("../profiles/indian.toml");

/// Built-in profile for Nigerian cultural context analysis
pub const NIGERIAN_PROFILE: &str = include_str!("../profiles/nigerian.toml");

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Profile file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read profile file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse profile file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid regex pattern '{pattern_name}': {error}\n  Pattern: {pattern}")]
    InvalidRegex {
        pattern_name: String,
        pattern: String,
        error: String,
    },

    #[error("Profile field '{field}' cannot be empty")]
    EmptyRequired { field: String },

    #[error("No built-in profile named '{0}'")]
    UnknownBuiltin(String),
}

/// Known-organization registry entry: domains attributed to one country
#[derive(Debug, Clone, Deserialize)]
pub struct KnownOrganizations {
    pub country: String,
    pub domains: Vec<String>,
}

/// Country-code TLD entry; the table is ordered and first match wins,
/// so compound suffixes like `.co.uk` must precede `.uk`
#[derive(Debug, Clone, Deserialize)]
pub struct CountryTld {
    pub suffix: String,
    pub country: String,
}

/// Hostname-substring heuristic (nationality adjectives, region names)
#[derive(Debug, Clone, Deserialize)]
pub struct DomainHint {
    pub country: String,
    pub substrings: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PhoneCodeData {
    label: String,
    countries: Vec<String>,
    patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PostalCodeData {
    country: String,
    pattern: String,
    #[serde(default)]
    trusted: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct LocationNamesData {
    country: String,
    patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AddressRulesData {
    postal_optional_countries: Vec<String>,
    street_keywords: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ConceptData {
    keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ClassificationData {
    #[serde(default = "default_dilemma_threshold")]
    dilemma_concept_threshold: usize,
}

fn default_dilemma_threshold() -> usize {
    3
}

/// Raw profile structure as it appears on disk
#[derive(Debug, Clone, Deserialize)]
struct ProfileData {
    name: String,
    edu_default_country: String,
    locale_specific_concepts: Vec<String>,
    tracked_vocabulary: Vec<String>,
    definition_phrases: Vec<String>,
    #[serde(default)]
    advice_phrases: Vec<String>,
    known_organizations: Vec<KnownOrganizations>,
    country_tlds: Vec<CountryTld>,
    #[serde(default)]
    domain_hints: Vec<DomainHint>,
    phone_codes: Vec<PhoneCodeData>,
    postal_codes: Vec<PostalCodeData>,
    location_names: Vec<LocationNamesData>,
    address: AddressRulesData,
    concepts: BTreeMap<String, ConceptData>,
    #[serde(default)]
    flexible_keywords: BTreeMap<String, Vec<String>>,
    classification: Option<ClassificationData>,
}

/// Phone country-code entry with compiled patterns.
/// A combined entry (e.g. "US/Canada") lists every covered country;
/// its weight is split evenly across them at aggregation time.
#[derive(Debug, Clone)]
pub struct PhoneCode {
    pub label: String,
    pub countries: Vec<String>,
    pub patterns: Vec<Regex>,
}

/// Postal-code format for one country. `trusted` formats (e.g. UK
/// alphanumeric postcodes) are accepted without a co-occurring place name.
#[derive(Debug, Clone)]
pub struct PostalCode {
    pub country: String,
    pub pattern: Regex,
    pub trusted: bool,
}

/// Place-name / demonym patterns for one country (case-insensitive)
#[derive(Debug, Clone)]
pub struct LocationNames {
    pub country: String,
    pub patterns: Vec<Regex>,
}

/// A validated, compiled locale profile
#[derive(Debug, Clone)]
pub struct LocaleProfile {
    pub name: String,
    pub edu_default_country: String,
    pub known_organizations: Vec<KnownOrganizations>,
    pub country_tlds: Vec<CountryTld>,
    pub domain_hints: Vec<DomainHint>,
    pub phone_codes: Vec<PhoneCode>,
    pub postal_codes: Vec<PostalCode>,
    pub location_names: Vec<LocationNames>,
    pub postal_optional_countries: Vec<String>,
    pub street_keywords: Regex,
    pub concepts: BTreeMap<String, Vec<String>>,
    pub flexible_keywords: BTreeMap<String, Vec<String>>,
    pub locale_specific_concepts: Vec<String>,
    pub tracked_vocabulary: Vec<String>,
    pub definition_phrases: Vec<String>,
    pub advice_phrases: Vec<String>,
    pub dilemma_concept_threshold: usize,
}

impl LocaleProfile {
    /// Load one of the built-in profiles by name ("indian", "nigerian")
    pub fn builtin(name: &str) -> Result<Self, ProfileError> {
        let content = match name {
            "indian" => INDIAN_PROFILE,
            "nigerian" => NIGERIAN_PROFILE,
            other => return Err(ProfileError::UnknownBuiltin(other.to_string())),
        };
        Self::from_toml(content)
    }

    /// Load a profile from a TOML file on disk
    pub fn load_from_path(path: &Path) -> Result<Self, ProfileError> {
        if !path.exists() {
            return Err(ProfileError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a profile from TOML content
    pub fn from_toml(content: &str) -> Result<Self, ProfileError> {
        let data: ProfileData = toml::from_str(content)?;
        let profile = Self::compile(data)?;
        debug!(
            "Loaded locale profile '{}': {} known-org registries, {} TLDs, {} concepts",
            profile.name,
            profile.known_organizations.len(),
            profile.country_tlds.len(),
            profile.concepts.len()
        );
        Ok(profile)
    }

    fn compile(data: ProfileData) -> Result<Self, ProfileError> {
        if data.name.is_empty() {
            return Err(ProfileError::EmptyRequired {
                field: "name".to_string(),
            });
        }
        if data.known_organizations.is_empty() {
            return Err(ProfileError::EmptyRequired {
                field: "known_organizations".to_string(),
            });
        }
        if data.country_tlds.is_empty() {
            return Err(ProfileError::EmptyRequired {
                field: "country_tlds".to_string(),
            });
        }
        if data.concepts.is_empty() {
            return Err(ProfileError::EmptyRequired {
                field: "concepts".to_string(),
            });
        }

        let mut phone_codes = Vec::with_capacity(data.phone_codes.len());
        for entry in &data.phone_codes {
            let mut patterns = Vec::with_capacity(entry.patterns.len());
            for pattern in &entry.patterns {
                patterns.push(compile_regex(
                    &format!("phone_codes.{}", entry.label),
                    pattern,
                    false,
                )?);
            }
            phone_codes.push(PhoneCode {
                label: entry.label.clone(),
                countries: entry.countries.clone(),
                patterns,
            });
        }

        let mut postal_codes = Vec::with_capacity(data.postal_codes.len());
        for entry in &data.postal_codes {
            postal_codes.push(PostalCode {
                country: entry.country.clone(),
                pattern: compile_regex(
                    &format!("postal_codes.{}", entry.country),
                    &entry.pattern,
                    false,
                )?,
                trusted: entry.trusted,
            });
        }

        let mut location_names = Vec::with_capacity(data.location_names.len());
        for entry in &data.location_names {
            let mut patterns = Vec::with_capacity(entry.patterns.len());
            for pattern in &entry.patterns {
                patterns.push(compile_regex(
                    &format!("location_names.{}", entry.country),
                    pattern,
                    true,
                )?);
            }
            location_names.push(LocationNames {
                country: entry.country.clone(),
                patterns,
            });
        }

        let street_keywords = compile_regex(
            "address.street_keywords",
            &data.address.street_keywords,
            true,
        )?;

        let concepts = data
            .concepts
            .into_iter()
            .map(|(name, entry)| (name, entry.keywords))
            .collect();

        let dilemma_concept_threshold = data
            .classification
            .map(|c| c.dilemma_concept_threshold)
            .unwrap_or_else(default_dilemma_threshold);

        Ok(LocaleProfile {
            name: data.name,
            edu_default_country: data.edu_default_country,
            known_organizations: data.known_organizations,
            country_tlds: data.country_tlds,
            domain_hints: data.domain_hints,
            phone_codes,
            postal_codes,
            location_names,
            postal_optional_countries: data.address.postal_optional_countries,
            street_keywords,
            concepts,
            flexible_keywords: data.flexible_keywords,
            locale_specific_concepts: data.locale_specific_concepts,
            tracked_vocabulary: data.tracked_vocabulary,
            definition_phrases: data.definition_phrases,
            advice_phrases: data.advice_phrases,
            dilemma_concept_threshold,
        })
    }

    /// Look up the phone-code entry for a detected label
    pub fn phone_code(&self, label: &str) -> Option<&PhoneCode> {
        self.phone_codes.iter().find(|entry| entry.label == label)
    }

    /// Location-name patterns for one country, if configured
    pub fn locations_for(&self, country: &str) -> Option<&LocationNames> {
        self.location_names
            .iter()
            .find(|entry| entry.country == country)
    }
}

fn compile_regex(
    pattern_name: &str,
    pattern: &str,
    case_insensitive: bool,
) -> Result<Regex, ProfileError> {
    let source = if case_insensitive {
        format!("(?i){}", pattern)
    } else {
        pattern.to_string()
    };
    Regex::new(&source).map_err(|e| ProfileError::InvalidRegex {
        pattern_name: pattern_name.to_string(),
        pattern: pattern.to_string(),
        error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_indian_profile_loads() {
        let profile = LocaleProfile::builtin("indian").expect("indian profile should load");
        assert_eq!(profile.name, "indian");
        assert_eq!(profile.edu_default_country, "US");
        assert!(profile.concepts.contains_key("joint_family"));
        assert!(!profile.tracked_vocabulary.is_empty());
    }

    #[test]
    fn test_builtin_nigerian_profile_loads() {
        let profile = LocaleProfile::builtin("nigerian").expect("nigerian profile should load");
        assert_eq!(profile.name, "nigerian");
        assert!(profile.concepts.contains_key("owambe"));
        assert!(profile
            .postal_optional_countries
            .contains(&"Nigeria".to_string()));
    }

    #[test]
    fn test_unknown_builtin_rejected() {
        let result = LocaleProfile::builtin("martian");
        assert!(matches!(result, Err(ProfileError::UnknownBuiltin(_))));
    }

    #[test]
    fn test_compound_tlds_precede_bare_tlds() {
        let profile = LocaleProfile::builtin("indian").unwrap();
        let co_uk = profile
            .country_tlds
            .iter()
            .position(|t| t.suffix == ".co.uk")
            .expect(".co.uk should be present");
        let uk = profile
            .country_tlds
            .iter()
            .position(|t| t.suffix == ".uk")
            .expect(".uk should be present");
        assert!(co_uk < uk, ".co.uk must be checked before .uk");
    }

    #[test]
    fn test_uk_postcode_is_trusted() {
        let profile = LocaleProfile::builtin("indian").unwrap();
        let uk = profile
            .postal_codes
            .iter()
            .find(|p| p.country == "UK")
            .expect("UK postal format should be present");
        assert!(uk.trusted, "UK alphanumeric postcodes are trusted");
    }

    #[test]
    fn test_combined_phone_code_lists_both_countries() {
        let profile = LocaleProfile::builtin("indian").unwrap();
        let shared = profile
            .phone_code("US/Canada")
            .expect("US/Canada phone entry should exist");
        assert_eq!(shared.countries, vec!["US", "Canada"]);
    }

    #[test]
    fn test_invalid_regex_reported_with_field() {
        let broken = INDIAN_PROFILE.replace(
            r"'\b[A-Z]{1,2}\d{1,2}[A-Z]?\s?\d[A-Z]{2}\b'",
            r"'\b[A-Z{1,2'",
        );
        let result = LocaleProfile::from_toml(&broken);
        match result {
            Err(ProfileError::InvalidRegex { pattern_name, .. }) => {
                assert!(pattern_name.contains("postal_codes"));
            }
            other => panic!("expected InvalidRegex, got {:?}", other.map(|p| p.name)),
        }
    }

    #[test]
    fn test_location_patterns_match_case_insensitively() {
        let profile = LocaleProfile::builtin("indian").unwrap();
        let india = profile
            .locations_for("India")
            .expect("India locations should be present");
        let matched = india.patterns.iter().any(|p| p.is_match("offices in MUMBAI"));
        assert!(matched, "location patterns should ignore case");
    }
}

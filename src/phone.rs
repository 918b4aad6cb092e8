//! Phone country-code detection
//!
//! Scans arbitrary text for international calling-code patterns configured
//! in the locale profile. Entries are independent: several labels can match
//! the same text, but at most one match is reported per entry.

use crate::profile::LocaleProfile;

/// One detected phone country-code entry, reported under its label.
/// A combined label ("US/Canada") is resolved into its member countries
/// by the scorer, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneMatch {
    pub label: String,
}

/// Detect phone country codes in `text`, one match per profile entry
pub fn detect_phone_codes(profile: &LocaleProfile, text: &str) -> Vec<PhoneMatch> {
    let mut found = Vec::new();
    for entry in &profile.phone_codes {
        if entry.patterns.iter().any(|pattern| pattern.is_match(text)) {
            found.push(PhoneMatch {
                label: entry.label.clone(),
            });
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::LocaleProfile;

    fn indian() -> LocaleProfile {
        LocaleProfile::builtin("indian").unwrap()
    }

    #[test]
    fn test_us_number_with_parens() {
        let matches = detect_phone_codes(&indian(), "Call us at (415) 555-0123 today");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].label, "US/Canada");
    }

    #[test]
    fn test_indian_country_code() {
        let matches = detect_phone_codes(&indian(), "Support: +91 98765 43210");
        assert!(matches.iter().any(|m| m.label == "India"));
    }

    #[test]
    fn test_tel_prefix_pattern() {
        let matches = detect_phone_codes(&indian(), "Tel: +44 20 7946 0958");
        assert!(matches.iter().any(|m| m.label == "UK"));
    }

    #[test]
    fn test_multiple_entries_match_independently() {
        let text = "US office: +1 212-555-0100. Mumbai office: +91 22 5555 0100.";
        let matches = detect_phone_codes(&indian(), text);
        let labels: Vec<&str> = matches.iter().map(|m| m.label.as_str()).collect();
        assert!(labels.contains(&"US/Canada"));
        assert!(labels.contains(&"India"));
    }

    #[test]
    fn test_one_match_per_entry() {
        let text = "+91 11 5555 0001 and +91 22 5555 0002";
        let matches = detect_phone_codes(&indian(), text);
        assert_eq!(
            matches.iter().filter(|m| m.label == "India").count(),
            1,
            "first matching pattern wins per entry"
        );
    }

    #[test]
    fn test_no_match_in_plain_prose() {
        let matches = detect_phone_codes(&indian(), "Nothing resembling contact details here.");
        assert!(matches.is_empty());
    }
}

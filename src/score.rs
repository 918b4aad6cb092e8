//! Evidence model and country scoring
//!
//! Every geographic signal becomes an `Evidence` item with a weight fixed
//! by its source kind. Scores are summed per country in discovery order;
//! ties resolve to the country whose evidence appeared first.

use crate::profile::LocaleProfile;
use serde::Serialize;

/// Where a piece of evidence came from. Addresses are the strongest
/// signal, phone numbers the weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Address found on the main page footer region
    Address,
    /// Address found on a terms/privacy/legal page
    TermsAddress,
    /// Address found on an about/contact page
    AboutAddress,
    /// Country mention on a terms page
    Terms,
    /// Country mention on an about/contact page
    AboutContact,
    /// Country mention on the main page
    MainPage,
    /// Phone country-code pattern
    Phone,
}

impl SourceKind {
    pub const fn weight(self) -> u32 {
        match self {
            SourceKind::Address | SourceKind::TermsAddress | SourceKind::AboutAddress => 25,
            SourceKind::Terms => 20,
            SourceKind::AboutContact => 15,
            SourceKind::MainPage => 10,
            SourceKind::Phone => 2,
        }
    }
}

/// A single weighted observation supporting one country hypothesis.
/// For phone evidence `country` holds the profile entry's label (which
/// may cover several countries); the scorer resolves it.
#[derive(Debug, Clone, Serialize)]
pub struct Evidence {
    pub source: SourceKind,
    pub country: String,
    pub weight: u32,
    pub descriptor: String,
}

impl Evidence {
    pub fn new(source: SourceKind, country: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Evidence {
            source,
            country: country.into(),
            weight: source.weight(),
            descriptor: descriptor.into(),
        }
    }
}

/// Sum evidence weights per country, preserving first-seen order.
///
/// Phone evidence whose label covers several countries (a shared calling
/// code like +1) splits its weight evenly across them, so a lone shared
/// match yields equal non-zero scores for every covered country.
pub fn score_countries(profile: &LocaleProfile, evidence: &[Evidence]) -> Vec<(String, f64)> {
    let mut scores: Vec<(String, f64)> = Vec::new();

    for item in evidence {
        if item.source == SourceKind::Phone {
            match profile.phone_code(&item.country) {
                Some(entry) if !entry.countries.is_empty() => {
                    let share = f64::from(item.weight) / entry.countries.len() as f64;
                    for country in &entry.countries {
                        bump(&mut scores, country, share);
                    }
                }
                _ => bump(&mut scores, &item.country, f64::from(item.weight)),
            }
        } else {
            bump(&mut scores, &item.country, f64::from(item.weight));
        }
    }

    scores
}

/// The content-derived verdict: argmax over summed scores, first seen
/// wins on a tie.
pub fn content_verdict(scores: &[(String, f64)]) -> Option<(String, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for (country, score) in scores {
        match best {
            Some((_, top)) if *score <= top => {}
            _ => best = Some((country, *score)),
        }
    }
    best.map(|(country, score)| (country.to_string(), score))
}

fn bump(scores: &mut Vec<(String, f64)>, country: &str, amount: f64) {
    if let Some(entry) = scores.iter_mut().find(|(c, _)| c == country) {
        entry.1 += amount;
    } else {
        scores.push((country.to_string(), amount));
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
    fn test_weights_by_source_kind() {
        assert_eq!(SourceKind::Address.weight(), 25);
        assert_eq!(SourceKind::TermsAddress.weight(), 25);
        assert_eq!(SourceKind::AboutAddress.weight(), 25);
        assert_eq!(SourceKind::Terms.weight(), 20);
        assert_eq!(SourceKind::AboutContact.weight(), 15);
        assert_eq!(SourceKind::MainPage.weight(), 10);
        assert_eq!(SourceKind::Phone.weight(), 2);
    }

    #[test]
    fn test_address_outscores_phone() {
        let evidence = vec![
            Evidence::new(SourceKind::Phone, "UK", "Phone number found: UK"),
            Evidence::new(SourceKind::Address, "India", "in address: Mumbai 400001"),
        ];
        let scores = score_countries(&indian(), &evidence);
        let (country, score) = content_verdict(&scores).expect("verdict expected");
        assert_eq!(country, "India");
        assert_eq!(score, 25.0);
    }

    #[test]
    fn test_shared_phone_code_splits_weight() {
        let evidence = vec![Evidence::new(
            SourceKind::Phone,
            "US/Canada",
            "Phone number found: US/Canada",
        )];
        let scores = score_countries(&indian(), &evidence);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0], ("US".to_string(), 1.0));
        assert_eq!(scores[1], ("Canada".to_string(), 1.0));
    }

    #[test]
    fn test_tie_breaks_to_first_seen() {
        let evidence = vec![Evidence::new(
            SourceKind::Phone,
            "US/Canada",
            "Phone number found: US/Canada",
        )];
        let scores = score_countries(&indian(), &evidence);
        let (country, score) = content_verdict(&scores).expect("verdict expected");
        assert_eq!(country, "US", "US is listed first for the +1 code");
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_scores_accumulate_per_country() {
        let evidence = vec![
            Evidence::new(SourceKind::Address, "India", "in address: first"),
            Evidence::new(SourceKind::Phone, "India", "Phone number found: India"),
        ];
        let scores = score_countries(&indian(), &evidence);
        assert_eq!(scores, vec![("India".to_string(), 27.0)]);
    }

    #[test]
    fn test_empty_evidence_no_verdict() {
        let scores = score_countries(&indian(), &[]);
        assert!(content_verdict(&scores).is_none());
    }
}

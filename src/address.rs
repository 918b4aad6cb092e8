//! Windowed address and locale extraction
//!
//! Scans a block of text (footer region, or an info page's full text) for
//! physical address fragments. A candidate line is only accepted when a
//! postal-code pattern AND a same-country place name co-occur within its
//! 4-line window; a postal code alone is never enough, since a bare 5-digit
//! number is indistinguishable from a US zip.

use crate::html::clip;
use crate::profile::LocaleProfile;

/// Lines shorter than this cannot be an address fragment
const MIN_LINE_CHARS: usize = 5;
/// Lines longer than this are prose, not an address
const MAX_LINE_CHARS: usize = 150;
/// Postal-code-less address formats must stay short to count
const SHORT_LINE_CHARS: usize = 80;
/// Retained snippet length
const SNIPPET_CHARS: usize = 100;

/// An accepted address line and the country it indicates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressMatch {
    pub snippet: String,
    pub country: String,
}

/// Extract address evidence from `text`, at most `max` matches.
///
/// For each candidate line the context window is the line plus its
/// predecessor and the next two lines, each capped below 150 chars.
/// Acceptance requires, in profile order, a postal format whose country's
/// place names also appear in the window (trusted formats skip the place
/// name check). Countries configured as postal-optional instead need a
/// place name plus a street keyword on a line of at most 80 chars.
pub fn extract_addresses(profile: &LocaleProfile, text: &str, max: usize) -> Vec<AddressMatch> {
    let mut matches: Vec<AddressMatch> = Vec::new();
    let lines: Vec<String> = text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();

    for i in 0..lines.len() {
        if matches.len() >= max {
            break;
        }

        let line = &lines[i];
        let line_chars = line.chars().count();
        if line_chars < MIN_LINE_CHARS || line_chars > MAX_LINE_CHARS {
            continue;
        }

        let window = build_window(&lines, i);

        if let Some(country) = accept_line(profile, line, line_chars, &window) {
            let candidate = AddressMatch {
                snippet: clip(line, SNIPPET_CHARS).to_string(),
                country,
            };
            if !matches.contains(&candidate) {
                matches.push(candidate);
            }
        }
    }

    matches
}

fn build_window(lines: &[String], i: usize) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(4);
    if i > 0 && lines[i - 1].chars().count() < MAX_LINE_CHARS {
        parts.push(&lines[i - 1]);
    }
    parts.push(&lines[i]);
    for offset in 1..=2 {
        if let Some(line) = lines.get(i + offset) {
            if line.chars().count() < MAX_LINE_CHARS {
                parts.push(line);
            }
        }
    }
    parts.join(" ")
}

fn accept_line(
    profile: &LocaleProfile,
    line: &str,
    line_chars: usize,
    window: &str,
) -> Option<String> {
    // Postal formats are tested in profile order; first satisfied wins.
    for postal in &profile.postal_codes {
        if !postal.pattern.is_match(window) {
            continue;
        }
        if postal.trusted || location_in_window(profile, &postal.country, window) {
            return Some(postal.country.clone());
        }
    }

    if line_chars <= SHORT_LINE_CHARS {
        for country in &profile.postal_optional_countries {
            if location_in_window(profile, country, window)
                && profile.street_keywords.is_match(line)
            {
                return Some(country.clone());
            }
        }
    }

    None
}

fn location_in_window(profile: &LocaleProfile, country: &str, window: &str) -> bool {
    profile
        .locations_for(country)
        .map(|entry| entry.patterns.iter().any(|p| p.is_match(window)))
        .unwrap_or(false)
}

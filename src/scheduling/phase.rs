//! Phase classification of locations and trades.
//!
//! Both classifiers are pure functions of their inputs.

use super::model::{PhaseGroup, PhaseHint};

/// Trade keywords per phase group, checked in priority order.
///
/// A keyword matches when consecutive tokens of the text start with the
/// keyword's tokens, so `pil` matches "piling" and "fit out" matches
/// "Fit-Out Works".
const TRADE_KEYWORDS: [(PhaseGroup, &[&str]); 3] = [
    (
        PhaseGroup::Substructure,
        &[
            "excavat",
            "earthwork",
            "pile",
            "piling",
            "foundation",
            "basement",
            "substructure",
            "shoring",
            "dewatering",
            "footing",
        ],
    ),
    (
        PhaseGroup::Shell,
        &[
            "structur",
            "concrete",
            "steel",
            "frame",
            "framing",
            "envelope",
            "facade",
            "cladding",
            "roof",
            "masonry",
            "curtain wall",
            "glazing",
        ],
    ),
    (
        PhaseGroup::Fitout,
        &[
            "mep",
            "mechanical",
            "electrical",
            "plumbing",
            "hvac",
            "fire",
            "drywall",
            "partition",
            "ceiling",
            "floor",
            "tiling",
            "paint",
            "finish",
            "joinery",
            "carpentry",
            "fitout",
            "fit out",
            "commissioning",
        ],
    ),
];

/// Location types that are always substructure work.
const SUBSTRUCTURE_LOCATION_TYPES: [&str; 2] = ["sector", "grid"];

/// Classify a location by its type, falling back to its phase hint.
#[must_use]
pub fn classify_location(location_type: &str, hint: PhaseHint) -> PhaseGroup {
    if SUBSTRUCTURE_LOCATION_TYPES.contains(&location_type.trim().to_ascii_lowercase().as_str()) {
        return PhaseGroup::Substructure;
    }
    match hint {
        PhaseHint::Fitout => PhaseGroup::Fitout,
        PhaseHint::Shell | PhaseHint::Unspecified => PhaseGroup::Shell,
    }
}

/// Classify a trade by discipline first, then by name. Defaults to shell.
#[must_use]
pub fn classify_trade(discipline: Option<&str>, name: &str) -> PhaseGroup {
    discipline
        .and_then(match_keywords)
        .or_else(|| match_keywords(name))
        .unwrap_or(PhaseGroup::Shell)
}

fn match_keywords(text: &str) -> Option<PhaseGroup> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return None;
    }
    TRADE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| contains_keyword(&tokens, kw)))
        .map(|(group, _)| *group)
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_keyword(tokens: &[String], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split(' ').collect();
    tokens.windows(parts.len()).any(|window| {
        window
            .iter()
            .zip(&parts)
            .all(|(token, part)| token.starts_with(part))
    })
}

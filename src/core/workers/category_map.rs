//! Shared category-classification and title-synthesis helpers used by
//! several venue workers.
//!
//! Each venue declares its own lookup table (venue-native category string ->
//! [`Category`]) and falls back to keyword matching on the market title when
//! the venue doesn't report a category at all, mirroring the per-venue
//! `CATEGORY_MAP`/keyword-table pairs workers relied on upstream.

use crate::core::domain::{Category, PriceFormat};

/// Resolve a category from an optional venue-native category string, falling
/// back to keyword matching on `title`, falling back to `default` if nothing
/// matches either.
#[must_use]
pub fn classify(
    native_category: Option<&str>,
    lookup: &[(&str, Category)],
    title: &str,
    keywords: &[(&str, Category)],
    default: Category,
) -> Category {
    if let Some(raw) = native_category {
        if let Some((_, category)) = lookup.iter().find(|(key, _)| key.eq_ignore_ascii_case(raw)) {
            return *category;
        }
    }
    classify_by_keywords(title, keywords, default)
}

/// First keyword table entry whose key appears (case-insensitively) in
/// `title`; `default` if none match.
#[must_use]
pub fn classify_by_keywords(title: &str, keywords: &[(&str, Category)], default: Category) -> Category {
    let lower = title.to_lowercase();
    keywords
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map_or(default, |(_, category)| *category)
}

/// One prefix rewrite rule for multi-candidate title synthesis: a
/// lower-case prefix to strip off a generic market title, and the verb
/// phrase to splice the candidate's name in front of.
pub struct TitlePrefixRule {
    pub prefix: &'static str,
    pub verb: &'static str,
}

/// Generic "who will win X" style multi-candidate rewrites, shared by Kalshi
/// and PredictIt: matches the original's `_build_candidate_title` prefix
/// tables.
pub const WHO_WILL_PREFIXES: &[TitlePrefixRule] = &[
    TitlePrefixRule { prefix: "who will win ", verb: "win" },
    TitlePrefixRule { prefix: "who will be ", verb: "be" },
    TitlePrefixRule { prefix: "who will run for ", verb: "run for" },
    TitlePrefixRule { prefix: "who will run in ", verb: "run in" },
];

/// PredictIt additionally phrases some multi-candidate markets as "which
/// party will win X" — its sibling rewrite table.
pub const WHICH_PARTY_PREFIXES: &[TitlePrefixRule] = &[
    TitlePrefixRule { prefix: "which party will win ", verb: "win" },
];

/// Rewrite a generic multi-candidate market title ("Who will win the 2028
/// primary?") into a per-candidate binary title ("Will Jane Doe win the 2028
/// primary?") using the first matching rule in `rules`. Falls back to
/// appending the candidate name when no prefix matches, so every candidate
/// still gets a distinguishable synthetic title.
#[must_use]
pub fn build_candidate_title(generic_title: &str, candidate: &str, rules: &[TitlePrefixRule]) -> String {
    let trimmed = generic_title.trim();
    let lower = trimmed.to_lowercase();
    for rule in rules {
        if let Some(rest) = lower.strip_prefix(rule.prefix) {
            let rest = &trimmed[trimmed.len() - rest.len()..];
            return format!("Will {candidate} {} {rest}", rule.verb);
        }
    }
    format!("{trimmed} — {candidate}")
}

/// Infer the missing side of a binary yes/no market from the side a venue
/// does report, in the same price format: `no = 1 - yes` for probability-like
/// formats, `no = 100 - yes` for cents.
#[must_use]
pub fn infer_missing_side(known_price: f64, format: PriceFormat) -> f64 {
    match format {
        PriceFormat::Cents => 100.0 - known_price,
        _ => 1.0 - known_price,
    }
}

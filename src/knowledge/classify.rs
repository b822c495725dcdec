//! Heuristic classification and hashtag extraction.
//!
//! Category inference walks [`SIGNAL_RULES`] in order and stops at the first rule
//! with a matching signal, so work phrasing beats reflective phrasing, which beats
//! speculative phrasing. Blocks matching nothing are research.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use super::types::Category;

/// Ordered (category, signals) rules. Signals are lower-case substrings.
pub const SIGNAL_RULES: &[(Category, &[&str])] = &[
    (
        Category::WorkLog,
        &["shipped", "fixed", "deployed", "pr #", "merged", "standup", "meeting", "1:1"],
    ),
    (
        Category::Journal,
        &["i feel", "i think", "i realized", "feeling", "frustrated", "grateful"],
    ),
    (
        Category::Idea,
        &["what if", "i should", "maybe", "could", "would be nice"],
    ),
];

/// Category used when no rule matches.
pub const DEFAULT_CATEGORY: Category = Category::Research;

pub fn infer_type(content: &str) -> Category {
    let lowered = content.to_lowercase();
    SIGNAL_RULES
        .iter()
        .find(|(_, signals)| signals.iter().any(|s| lowered.contains(s)))
        .map(|(category, _)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}

fn hashtag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"#(\w+)").expect("hashtag pattern is valid"))
}

/// Every `#word` in `content`, lower-cased and de-duplicated. Order is not meaningful.
pub fn extract_tags(content: &str) -> Vec<String> {
    hashtag_pattern()
        .captures_iter(content)
        .map(|caps| caps[1].to_lowercase())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

//! Pass/fail decision over extracted translations.
//!
//! Both sides are normalized before any comparison. An empty extraction, or one
//! without Sinhala text, always fails. With keywords the verdict depends on how
//! many of them appear in the extraction; without keywords it is a two-way
//! substring check against the expected text.

use crate::script::{contains_sinhala, page_words};
use serde::{Deserialize, Serialize};
use std::fmt;

const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Minimum number of keyword hits regardless of list length
pub const MIN_KEYWORD_MATCHES: usize = 2;

/// Translation-quality verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "Pass"),
            Verdict::Fail => write!(f, "Fail"),
        }
    }
}

/// Why a judgement came out as Fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    /// Nothing containing Sinhala text was extracted
    NoTranslation,
    /// Fewer keywords matched than the threshold
    KeywordThreshold,
    /// Neither text contains the other
    TextMismatch,
}

/// Keyword match statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordScore {
    pub matched: usize,
    pub total: usize,
    pub threshold: usize,
}

/// Outcome of judging one extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgement {
    pub verdict: Verdict,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailReason>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<KeywordScore>,
}

impl Judgement {
    fn pass(keywords: Option<KeywordScore>) -> Self {
        Self { verdict: Verdict::Pass, reason: None, keywords }
    }

    fn fail(reason: FailReason, keywords: Option<KeywordScore>) -> Self {
        Self { verdict: Verdict::Fail, reason: Some(reason), keywords }
    }
}

/// Remove zero-width spaces, collapse whitespace runs (BOM included) and trim
pub fn normalize(text: &str) -> String {
    let stripped: String = text.chars().filter(|&c| c != ZERO_WIDTH_SPACE).collect();
    page_words(&stripped).collect::<Vec<_>>().join(" ")
}

/// Number of keyword hits needed for a list of `total` keywords: max(2, floor(0.6 * total))
pub fn keyword_threshold(total: usize) -> usize {
    (total * 3 / 5).max(MIN_KEYWORD_MATCHES)
}

/// Count keywords (normalized) found in already-normalized text
pub fn score_keywords<S: AsRef<str>>(normalized_text: &str, keywords: &[S]) -> KeywordScore {
    let matched = keywords
        .iter()
        .filter(|k| normalized_text.contains(normalize(k.as_ref()).as_str()))
        .count();

    KeywordScore { matched, total: keywords.len(), threshold: keyword_threshold(keywords.len()) }
}

/// Judge an extraction against the expected text and optional keywords
pub fn judge<S: AsRef<str>>(extracted: &str, expected: &str, keywords: &[S]) -> Judgement {
    let actual = normalize(extracted);
    let expected = normalize(expected);

    if actual.is_empty() || !contains_sinhala(&actual) {
        return Judgement::fail(FailReason::NoTranslation, None);
    }

    if !keywords.is_empty() {
        let score = score_keywords(&actual, keywords);
        return if score.matched >= score.threshold {
            Judgement::pass(Some(score))
        } else {
            Judgement::fail(FailReason::KeywordThreshold, Some(score))
        };
    }

    if actual.contains(expected.as_str()) || expected.contains(actual.as_str()) {
        Judgement::pass(None)
    } else {
        Judgement::fail(FailReason::TextMismatch, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_KEYWORDS: &[&str] = &[];

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a\u{200B}b"), "ab");
        assert_eq!(normalize("  මම \n\t ගෙදර  "), "මම ගෙදර");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_treats_bom_as_whitespace() {
        assert_eq!(normalize("a\u{FEFF} b"), "a b");
        assert_eq!(normalize("\u{FEFF}කොහොමද\u{FEFF}"), "කොහොමද");
    }

    #[test]
    fn test_normalize_idempotent() {
        for s in ["", "  x  y ", "a\u{200B} \u{200B}b", "\u{200B}", "කොහොමද\r\nඔයා"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_empty_extraction_always_fails() {
        let j = judge("", "කොහොමද", NO_KEYWORDS);
        assert_eq!(j.verdict, Verdict::Fail);
        assert_eq!(j.reason, Some(FailReason::NoTranslation));

        // Keywords do not rescue an empty extraction
        let j = judge("", "", &["", ""]);
        assert_eq!(j.verdict, Verdict::Fail);
        assert_eq!(j.keywords, None);
    }

    #[test]
    fn test_non_sinhala_extraction_fails() {
        let j = judge("kohomada", "kohomada", NO_KEYWORDS);
        assert_eq!(j.verdict, Verdict::Fail);
        assert_eq!(j.reason, Some(FailReason::NoTranslation));
    }

    #[test]
    fn test_threshold() {
        assert_eq!(keyword_threshold(1), 2);
        assert_eq!(keyword_threshold(2), 2);
        assert_eq!(keyword_threshold(3), 2);
        assert_eq!(keyword_threshold(5), 3);
        assert_eq!(keyword_threshold(10), 6);
        assert_eq!(keyword_threshold(11), 6);
    }

    #[test]
    fn test_keywords_two_of_three() {
        let keywords = ["මම", "ගෙදර", "බත්"];
        let j = judge("මම ගෙදර යනවා", "", &keywords);
        assert_eq!(j.verdict, Verdict::Pass);
        assert_eq!(j.keywords, Some(KeywordScore { matched: 2, total: 3, threshold: 2 }));
    }

    #[test]
    fn test_keywords_two_needs_both() {
        let j = judge("මම ගෙදර යනවා", "", &["මම", "බත්"]);
        assert_eq!(j.verdict, Verdict::Fail);
        assert_eq!(j.reason, Some(FailReason::KeywordThreshold));

        let j = judge("මම ගෙදර යනවා", "", &["මම", "ගෙදර"]);
        assert_eq!(j.verdict, Verdict::Pass);
    }

    #[test]
    fn test_keywords_single_never_passes() {
        let j = judge("මම ගෙදර යනවා", "මම ගෙදර යනවා", &["මම"]);
        assert_eq!(j.verdict, Verdict::Fail);
    }

    #[test]
    fn test_keywords_are_normalized() {
        let j = judge("මම ගෙදර යනවා", "", &[" මම\u{200B} ", "ගෙදර  යනවා"]);
        assert_eq!(j.verdict, Verdict::Pass);
    }

    #[test]
    fn test_keywords_override_text_comparison() {
        // Expected text matches exactly, but keywords decide
        let j = judge("කොහොමද", "කොහොමද", &["මම", "ගෙදර", "යනවා"]);
        assert_eq!(j.verdict, Verdict::Fail);
    }

    #[test]
    fn test_substring_either_direction() {
        assert_eq!(judge("කොහොමද ඔයාට", "කොහොමද", NO_KEYWORDS).verdict, Verdict::Pass);
        assert_eq!(judge("කොහොමද", "කොහොමද ඔයාට", NO_KEYWORDS).verdict, Verdict::Pass);

        let j = judge("කොහොමද", "මම ගෙදර", NO_KEYWORDS);
        assert_eq!(j.verdict, Verdict::Fail);
        assert_eq!(j.reason, Some(FailReason::TextMismatch));
    }

    #[test]
    fn test_kohomada_scenario() {
        let j = judge(" කොහොමද\u{200B} ", "කොහොමද", NO_KEYWORDS);
        assert_eq!(j, Judgement { verdict: Verdict::Pass, reason: None, keywords: None });
    }

    #[test]
    fn test_verdict_serde() {
        assert_eq!(serde_json::to_string(&Verdict::Pass).unwrap(), "\"Pass\"");
        let v: Verdict = serde_json::from_str("\"Fail\"").unwrap();
        assert_eq!(v, Verdict::Fail);
        assert_eq!(Verdict::Pass.to_string(), "Pass");
    }
}

//! Locates the translated text inside a rendered translator page.
//!
//! The page has no stable element for its output, so extraction works on the
//! visible text: everything after the last "Sinhala" label is scanned line by
//! line, and the first line that looks like real translated prose wins. If that
//! finds nothing, textarea contents are tried in document order.

use crate::script::{contains_sinhala, is_diacritics_only, page_words, text_len, trim_page};
use serde::{Deserialize, Serialize};

/// Text captured from a rendered page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    /// `document.body.innerText`
    pub body_text: String,

    /// Value (or text content) of every textarea, in document order
    #[serde(default)]
    pub textareas: Vec<String>,
}

impl PageSnapshot {
    pub fn new(body_text: impl Into<String>) -> Self {
        Self { body_text: body_text.into(), textareas: Vec::new() }
    }

    /// Builder method: set textarea contents
    pub fn with_textareas<I, S>(mut self, textareas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.textareas = textareas.into_iter().map(Into::into).collect();
        self
    }
}

/// Heuristics used to pick the translation out of page text
#[derive(Debug, Clone)]
pub struct ExtractorRules {
    /// Label preceding the output section
    pub marker: String,

    /// Substrings identifying UI chrome rather than translated text
    pub chrome: Vec<String>,

    /// Exclusive lower bound on candidate length
    pub min_len: usize,

    /// Exclusive upper bound on candidate length
    pub max_len: usize,

    /// Lines with this many single-character tokens or more are treated as fragmented labels
    pub max_single_char_tokens: usize,
}

impl Default for ExtractorRules {
    fn default() -> Self {
        Self {
            marker: "Sinhala".to_string(),
            chrome: ["View Suggestions", "Uses AI", "grammar", "piliwela"]
                .into_iter()
                .map(String::from)
                .collect(),
            min_len: 3,
            max_len: 1000,
            max_single_char_tokens: 15,
        }
    }
}

impl ExtractorRules {
    fn has_chrome(&self, text: &str) -> bool {
        self.chrome.iter().any(|c| text.contains(c.as_str()))
    }

    fn is_candidate(&self, text: &str) -> bool {
        let len = text_len(text);
        len > self.min_len && len < self.max_len && contains_sinhala(text)
    }

    fn is_fragmented(&self, text: &str) -> bool {
        let single = page_words(text).filter(|w| text_len(w) == 1).count();
        single >= self.max_single_char_tokens
    }

    /// Pick the first acceptable line after the last marker
    fn from_marked_section(&self, body_text: &str) -> Option<String> {
        let (_, section) = body_text.rsplit_once(self.marker.as_str())?;

        section
            .split('\n')
            .map(trim_page)
            .filter(|line| !is_diacritics_only(line))
            .filter(|line| self.is_candidate(line))
            .filter(|line| !self.has_chrome(line))
            .find(|line| !self.is_fragmented(line))
            .map(String::from)
    }

    /// Pick the first acceptable textarea value
    fn from_textareas(&self, textareas: &[String]) -> Option<String> {
        textareas
            .iter()
            .map(|t| trim_page(t))
            .filter(|text| !is_diacritics_only(text))
            .filter(|text| !self.has_chrome(text))
            .find(|text| self.is_candidate(text))
            .map(String::from)
    }
}

/// Return the best candidate translation, or an empty string if none is found.
///
/// A non-empty result always contains at least one Sinhala base character.
pub fn extract_translation(snapshot: &PageSnapshot, rules: &ExtractorRules) -> String {
    if let Some(line) = rules.from_marked_section(&snapshot.body_text) {
        log::debug!("Extracted translation from text after '{}'", rules.marker);
        return line;
    }

    if let Some(text) = rules.from_textareas(&snapshot.textareas) {
        log::debug!("Extracted translation from textarea fallback");
        return text;
    }

    String::new()
}

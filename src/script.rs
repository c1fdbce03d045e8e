//! Sinhala script predicates shared by the extractor and the judge.

use regex::Regex;
use std::sync::LazyLock;

/// First Sinhala base character (අ)
pub const SINHALA_BASE_START: char = '\u{0D85}';

/// Last Sinhala base character (ෆ)
pub const SINHALA_BASE_END: char = '\u{0DC6}';

/// Byte order mark, which the page treats as whitespace
pub const BYTE_ORDER_MARK: char = '\u{FEFF}';

// Vowel signs and virama, whitespace (including BOM), ZWJ, ර (from the rakaransaya conjunct), anusvara, visarga.
static DIACRITICS_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\x{0DCA}-\x{0DDF}\s\x{FEFF}\x{200D}\x{0DBB}\x{0D82}\x{0D83}]+$").expect("diacritics pattern is valid")
});

/// Check whether a character is a Sinhala base (non-diacritic) character
pub fn is_sinhala_base(c: char) -> bool {
    (SINHALA_BASE_START..=SINHALA_BASE_END).contains(&c)
}

/// Check whether text contains at least one Sinhala base character
pub fn contains_sinhala(text: &str) -> bool {
    text.chars().any(is_sinhala_base)
}

/// Check whether text is made up entirely of combining marks and joiners.
///
/// The empty string is not diacritics-only.
pub fn is_diacritics_only(text: &str) -> bool {
    DIACRITICS_ONLY.is_match(text)
}

/// Whitespace as the page's scripts see it: Unicode whitespace plus the byte order mark
pub fn is_page_whitespace(c: char) -> bool {
    c.is_whitespace() || c == BYTE_ORDER_MARK
}

/// Trim page whitespace from both ends
pub fn trim_page(text: &str) -> &str {
    text.trim_matches(is_page_whitespace)
}

/// Split on runs of page whitespace, skipping empty pieces
pub fn page_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_page_whitespace).filter(|w| !w.is_empty())
}

/// Length of text in UTF-16 code units, which is how the page measures strings
pub fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

//! Test case records and the data file they are loaded from.

use crate::error::{Result, SuiteError};
use crate::judge::Verdict;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Status recorded for a case in the data file. Shares the verdict vocabulary.
pub type ExpectedStatus = Verdict;

/// One input/expected-output record driving one automated run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCase {
    /// Unique case identifier (also names the mismatch screenshot)
    pub id: String,

    /// Free-form tag such as "pos" or "neg"
    #[serde(rename = "type")]
    pub kind: String,

    /// Singlish source text typed into the translator
    pub input: String,

    /// Expected Sinhala output
    pub expected: String,

    /// Verdict the judge is expected to reach
    #[serde(rename = "expectedStatus")]
    pub expected_status: ExpectedStatus,

    /// Keywords that should appear in the translation
    #[serde(default, deserialize_with = "nullable_keywords")]
    pub keywords: Vec<String>,
}

fn nullable_keywords<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl TestCase {
    /// Create a case without keywords
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        input: impl Into<String>,
        expected: impl Into<String>,
        expected_status: ExpectedStatus,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            input: input.into(),
            expected: expected.into(),
            expected_status,
            keywords: Vec::new(),
        }
    }

    /// Builder method: set keywords
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

/// Parse cases from JSON text, validating ids
pub fn parse_cases(json: &str) -> Result<Vec<TestCase>> {
    let cases: Vec<TestCase> = serde_json::from_str(json)?;
    validate(&cases)?;
    Ok(cases)
}

/// Load the ordered case list from a JSON data file
pub fn load_cases(path: impl AsRef<Path>) -> Result<Vec<TestCase>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| SuiteError::DataFile { path: path.to_path_buf(), reason: e.to_string() })?;

    let cases: Vec<TestCase> = serde_json::from_str(&text)
        .map_err(|e| SuiteError::DataFile { path: path.to_path_buf(), reason: e.to_string() })?;
    validate(&cases)?;

    log::debug!("Loaded {} test cases from {}", cases.len(), path.display());
    Ok(cases)
}

fn validate(cases: &[TestCase]) -> Result<()> {
    let mut seen = HashSet::new();
    for (position, case) in cases.iter().enumerate() {
        if case.id.trim().is_empty() {
            return Err(SuiteError::InvalidCase { position, reason: "empty id".to_string() });
        }
        if !seen.insert(case.id.as_str()) {
            return Err(SuiteError::DuplicateCase(case.id.clone()));
        }
    }
    Ok(())
}

/// Selects a subset of cases by id substring and/or kind
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    /// Keep cases whose id contains this substring
    pub id_contains: Option<String>,

    /// Keep cases whose kind equals this tag (case-insensitive)
    pub kind: Option<String>,
}

impl CaseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: filter by id substring
    pub fn id_contains(mut self, pattern: impl Into<String>) -> Self {
        self.id_contains = Some(pattern.into());
        self
    }

    /// Builder method: filter by kind
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn matches(&self, case: &TestCase) -> bool {
        let id_ok = self.id_contains.as_deref().is_none_or(|p| case.id.contains(p));
        let kind_ok = self.kind.as_deref().is_none_or(|k| case.kind.eq_ignore_ascii_case(k));
        id_ok && kind_ok
    }

    /// Apply the filter, preserving order
    pub fn apply(&self, cases: Vec<TestCase>) -> Vec<TestCase> {
        cases.into_iter().filter(|c| self.matches(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DATA: &str = r#"[
        {"id": "Pos_Fun_0001", "type": "pos", "input": "kohomada", "expected": "කොහොමද", "expectedStatus": "Pass", "keywords": []},
        {"id": "Pos_Fun_0002", "type": "pos", "input": "mama gedhara yanavaa", "expected": "මම ගෙදර යනවා", "expectedStatus": "Pass", "keywords": ["මම", "ගෙදර", "යනවා"]},
        {"id": "Neg_Fun_0001", "type": "neg", "input": "xyz", "expected": "", "expectedStatus": "Fail"}
    ]"#;

    #[test]
    fn test_parse_cases() {
        let cases = parse_cases(DATA).unwrap();
        assert_eq!(cases.len(), 3);
        assert_eq!(cases[0].id, "Pos_Fun_0001");
        assert_eq!(cases[0].kind, "pos");
        assert_eq!(cases[0].expected_status, Verdict::Pass);
        assert_eq!(cases[1].keywords, vec!["මම", "ගෙදර", "යනවා"]);
        assert!(cases[2].keywords.is_empty());
        assert_eq!(cases[2].expected_status, Verdict::Fail);
    }

    #[test]
    fn test_null_keywords() {
        let json = r#"[{"id": "a", "type": "pos", "input": "x", "expected": "y", "expectedStatus": "Pass", "keywords": null}]"#;
        let cases = parse_cases(json).unwrap();
        assert!(cases[0].keywords.is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"[
            {"id": "a", "type": "pos", "input": "x", "expected": "y", "expectedStatus": "Pass"},
            {"id": "a", "type": "neg", "input": "x", "expected": "y", "expectedStatus": "Fail"}
        ]"#;
        match parse_cases(json) {
            Err(SuiteError::DuplicateCase(id)) => assert_eq!(id, "a"),
            other => panic!("Expected duplicate error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_id_rejected() {
        let json = r#"[{"id": " ", "type": "pos", "input": "x", "expected": "y", "expectedStatus": "Pass"}]"#;
        assert!(matches!(parse_cases(json), Err(SuiteError::InvalidCase { position: 0, .. })));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let json = r#"[{"id": "a", "type": "pos", "input": "x", "expected": "y", "expectedStatus": "Maybe"}]"#;
        assert!(matches!(parse_cases(json), Err(SuiteError::Json(_))));
    }

    #[test]
    fn test_load_cases_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DATA.as_bytes()).unwrap();

        let cases = load_cases(file.path()).unwrap();
        assert_eq!(cases.len(), 3);
        assert_eq!(cases[2].id, "Neg_Fun_0001");
    }

    #[test]
    fn test_load_cases_missing_file() {
        let result = load_cases("/nonexistent/test-data.json");
        assert!(matches!(result, Err(SuiteError::DataFile { .. })));
    }

    #[test]
    fn test_filter() {
        let cases = parse_cases(DATA).unwrap();

        let neg = CaseFilter::new().kind("NEG").apply(cases.clone());
        assert_eq!(neg.len(), 1);
        assert_eq!(neg[0].id, "Neg_Fun_0001");

        let pos = CaseFilter::new().id_contains("Pos_").apply(cases.clone());
        assert_eq!(pos.len(), 2);

        let all = CaseFilter::new().apply(cases);
        assert_eq!(all.len(), 3);
    }
}

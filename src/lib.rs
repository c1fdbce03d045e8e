//! # swift-translator-e2e
//!
//! End-to-end checks for the Swift Translator Singlish-to-Sinhala web tool, driven
//! over the Chrome DevTools Protocol (CDP).
//!
//! Each test case types Singlish into the translator, waits, scrapes the rendered
//! Sinhala out of the page and judges it against an expected string or keyword list.
//! A case passes when the judge's verdict equals the status recorded for it.
//!
//! ## Running the suite
//!
//! ```bash
//! # Headless, one browser
//! cargo run -- --data tests/data/test-data.json
//!
//! # Visible browser, only negative cases
//! cargo run -- --data tests/data/test-data.json --headed --kind neg
//! ```
//!
//! ## Library Usage
//!
//! Extraction and judging are pure functions over captured page text, so they can be
//! used without a browser:
//!
//! ```rust
//! use swift_translator_e2e::{ExtractorRules, PageSnapshot, Verdict, extract_translation, judge};
//!
//! let page = PageSnapshot::new("Singlish\nkohomada\nSinhala\nකොහොමද");
//! let extracted = extract_translation(&page, &ExtractorRules::default());
//! assert_eq!(extracted, "කොහොමද");
//!
//! let no_keywords: &[&str] = &[];
//! assert_eq!(judge(&extracted, "කොහොමද", no_keywords).verdict, Verdict::Pass);
//! ```
//!
//! Driving the real page:
//!
//! ```rust,no_run
//! use swift_translator_e2e::{BrowserSource, ChromeTranslatorPage, PageConfig, SuiteConfig, SuiteRunner, load_cases};
//!
//! # fn main() -> swift_translator_e2e::Result<()> {
//! let cases = load_cases("tests/data/test-data.json")?;
//! let runner = SuiteRunner::new(SuiteConfig::default());
//! let source = BrowserSource::default();
//!
//! let report = runner.run(&cases, || ChromeTranslatorPage::open(&source, PageConfig::default()))?;
//! println!("{}/{} cases matched", report.matched, report.total);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`case`]: Test case records and data file loading
//! - [`extract`]: Locating the translation in page text
//! - [`judge`]: Normalization and the pass/fail verdict
//! - [`wait`]: Length-tiered waits and stability polling
//! - [`runner`]: Per-case flow, screenshots and the suite report
//! - [`browser`]: Browser session management and the CDP-backed page
//! - [`script`]: Sinhala codepoint predicates
//! - [`error`]: Error types and result aliases

pub mod browser;
pub mod case;
pub mod error;
pub mod extract;
pub mod judge;
pub mod runner;
pub mod script;
pub mod wait;

pub use browser::{BrowserSession, BrowserSource, ChromeTranslatorPage, ConnectionOptions, LaunchOptions, PageConfig};
pub use case::{CaseFilter, ExpectedStatus, TestCase, load_cases, parse_cases};
pub use error::{Result, SuiteError};
pub use extract::{ExtractorRules, PageSnapshot, extract_translation};
pub use judge::{FailReason, Judgement, KeywordScore, Verdict, judge, normalize};
pub use runner::{CaseOutcome, CaseReport, SuiteConfig, SuiteReport, SuiteRunner, TranslatorPage};
pub use wait::{WaitStrategy, settle_duration};

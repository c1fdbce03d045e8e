//! Drives test cases through a translator page and records the outcome.
//!
//! Each case runs strictly in order: reset the page, fill the input, wait,
//! snapshot, extract, judge. The judge's verdict is then compared with the
//! status recorded for the case; that comparison, not the verdict itself, is
//! what passes or fails the case.

use crate::{case::TestCase,
            error::{Result, SuiteError},
            extract::{ExtractorRules, PageSnapshot, extract_translation},
            judge::{Judgement, Verdict, judge, normalize},
            script::text_len,
            wait::{StabilityTracker, WaitStrategy, settle_duration}};
use serde::{Deserialize, Serialize};
use std::{path::{Path, PathBuf},
          sync::atomic::{AtomicUsize, Ordering},
          thread,
          time::{Duration, Instant}};

const INPUT_PREVIEW: usize = 50;
const TEXT_PREVIEW: usize = 60;

/// The page operations a case needs
pub trait TranslatorPage {
    /// Load the translator fresh
    fn reset(&mut self) -> Result<()>;

    /// Clear the input field and enter `text`
    fn fill_input(&mut self, text: &str) -> Result<()>;

    /// Capture the page's visible text and textarea contents
    fn snapshot(&mut self) -> Result<PageSnapshot>;

    /// Capture a full-page PNG
    fn screenshot(&mut self) -> Result<Vec<u8>>;

    /// Block while the translator works
    fn pause(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Harness-level result of a case, distinct from the judge's [`Verdict`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    /// Verdict equals the recorded status
    Matched,
    /// Verdict differs from the recorded status
    Mismatched,
    /// The page could not be driven to a verdict
    Errored,
}

impl CaseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CaseOutcome::Matched)
    }
}

/// Everything recorded about one case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    pub id: String,
    pub kind: String,
    pub expected_status: Verdict,
    pub outcome: CaseOutcome,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub judgement: Option<Judgement>,

    /// Normalized extracted text
    pub extracted: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,

    /// Input length in UTF-16 code units, as the page counts it
    pub input_len: usize,

    pub waited_ms: u64,
    pub duration_ms: u64,
}

impl CaseReport {
    /// The judge's verdict, if one was reached
    pub fn verdict(&self) -> Option<Verdict> {
        self.judgement.as_ref().map(|j| j.verdict)
    }
}

/// Aggregate over all cases, in data-file order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub errored: usize,
    pub duration_ms: u64,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    pub fn from_cases(cases: Vec<CaseReport>, duration: Duration) -> Self {
        let count = |outcome: CaseOutcome| cases.iter().filter(|c| c.outcome == outcome).count();
        Self {
            total: cases.len(),
            matched: count(CaseOutcome::Matched),
            mismatched: count(CaseOutcome::Mismatched),
            errored: count(CaseOutcome::Errored),
            duration_ms: duration.as_millis() as u64,
            cases,
        }
    }

    /// True when every case matched its recorded status
    pub fn all_matched(&self) -> bool {
        self.matched == self.total
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Runner settings
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Directory for mismatch screenshots and the JSON report
    pub results_dir: PathBuf,

    /// Wall-clock limit for a single case
    pub case_timeout: Duration,

    pub wait: WaitStrategy,

    pub rules: ExtractorRules,

    /// Number of pages driven in parallel
    pub workers: usize,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("test-results"),
            case_timeout: Duration::from_secs(180),
            wait: WaitStrategy::Fixed,
            rules: ExtractorRules::default(),
            workers: 1,
        }
    }
}

impl SuiteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set results directory
    pub fn results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    /// Builder method: set per-case timeout
    pub fn case_timeout(mut self, timeout: Duration) -> Self {
        self.case_timeout = timeout;
        self
    }

    /// Builder method: set wait strategy
    pub fn wait(mut self, wait: WaitStrategy) -> Self {
        self.wait = wait;
        self
    }

    /// Builder method: set worker count (at least one)
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Path of the screenshot captured when a case mismatches
    pub fn screenshot_path(&self, case_id: &str) -> PathBuf {
        self.results_dir.join(format!("{}-mismatch.png", case_id))
    }

    pub fn report_path(&self) -> PathBuf {
        self.results_dir.join("report.json")
    }
}

/// Per-case wall-clock budget
struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    fn check(&self, step: &str) -> Result<()> {
        let elapsed = self.started.elapsed();
        if elapsed > self.limit {
            return Err(SuiteError::Timeout {
                step: step.to_string(),
                elapsed_ms: elapsed.as_millis(),
                limit_ms: self.limit.as_millis(),
            });
        }
        Ok(())
    }
}

/// Runs cases against translator pages
pub struct SuiteRunner {
    config: SuiteConfig,
}

impl SuiteRunner {
    pub fn new(config: SuiteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Run every case, opening one page per worker with `open_page`.
    ///
    /// Failing to open a page is a setup error; failures inside a case are recorded in its report.
    pub fn run<P, F>(&self, cases: &[TestCase], open_page: F) -> Result<SuiteReport>
    where
        P: TranslatorPage + Send,
        F: Fn() -> Result<P>,
    {
        let started = Instant::now();
        if cases.is_empty() {
            log::warn!("No test cases selected");
            return Ok(SuiteReport::from_cases(Vec::new(), started.elapsed()));
        }

        let workers = self.config.workers.clamp(1, cases.len());

        let mut pages = Vec::with_capacity(workers);
        for _ in 0..workers {
            pages.push(open_page()?);
        }

        let reports = if workers == 1 {
            let mut page = pages.remove(0);
            cases.iter().map(|case| self.run_case(&mut page, case)).collect()
        } else {
            self.run_parallel(cases, pages)
        };

        let report = SuiteReport::from_cases(reports, started.elapsed());
        log::info!(
            "{} cases: {} matched, {} mismatched, {} errored in {}ms",
            report.total,
            report.matched,
            report.mismatched,
            report.errored,
            report.duration_ms
        );
        Ok(report)
    }

    fn run_parallel<P>(&self, cases: &[TestCase], pages: Vec<P>) -> Vec<CaseReport>
    where
        P: TranslatorPage + Send,
    {
        let next = AtomicUsize::new(0);
        let mut indexed: Vec<(usize, CaseReport)> = Vec::with_capacity(cases.len());

        thread::scope(|scope| {
            let next = &next;
            let handles: Vec<_> = pages
                .into_iter()
                .map(|mut page| {
                    scope.spawn(move || {
                        let mut done = Vec::new();
                        loop {
                            let i = next.fetch_add(1, Ordering::SeqCst);
                            let Some(case) = cases.get(i) else { break };
                            done.push((i, self.run_case(&mut page, case)));
                        }
                        done
                    })
                })
                .collect();

            for handle in handles {
                match handle.join() {
                    Ok(done) => indexed.extend(done),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        });

        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, report)| report).collect()
    }

    /// Drive one case through `page` and judge it
    pub fn run_case<P: TranslatorPage>(&self, page: &mut P, case: &TestCase) -> CaseReport {
        let started = Instant::now();
        let wait = settle_duration(&case.input);

        log::info!("=== {} ===", case.id);
        log::info!("Type: {} | Expected: {}", case.kind.to_uppercase(), case.expected_status);
        log::info!("Input: \"{}\"", preview(&case.input, INPUT_PREVIEW));
        let input_len = text_len(&case.input);
        log::info!("Input length: {} characters", input_len);

        let mut report = CaseReport {
            id: case.id.clone(),
            kind: case.kind.clone(),
            expected_status: case.expected_status,
            outcome: CaseOutcome::Errored,
            judgement: None,
            extracted: String::new(),
            error: None,
            screenshot: None,
            input_len,
            waited_ms: wait.as_millis() as u64,
            duration_ms: 0,
        };

        let deadline = Deadline { started, limit: self.config.case_timeout };
        match self.drive(page, case, wait, &deadline) {
            Ok(extracted) => {
                let actual = normalize(&extracted);
                let expected = normalize(&case.expected);
                log::info!("Expected: \"{}\"", preview(&expected, TEXT_PREVIEW));
                log::info!("Actual:   \"{}\"", preview(&actual, TEXT_PREVIEW));

                let judgement = judge(&actual, &expected, &case.keywords);
                log_judgement(case, &judgement);

                report.outcome = if judgement.verdict == case.expected_status {
                    log::info!("TEST PASSED - Result matches expected status");
                    CaseOutcome::Matched
                } else {
                    log::info!("TEST FAILED - Expected {} but got {}", case.expected_status, judgement.verdict);
                    report.screenshot = self.save_screenshot(page, &case.id);
                    CaseOutcome::Mismatched
                };
                report.extracted = actual;
                report.judgement = Some(judgement);
            }
            Err(e) => {
                log::error!("{} could not be evaluated: {}", case.id, e);
                report.error = Some(e.to_string());
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        report
    }

    fn drive<P: TranslatorPage>(
        &self,
        page: &mut P,
        case: &TestCase,
        wait: Duration,
        deadline: &Deadline,
    ) -> Result<String> {
        page.reset()?;
        deadline.check("page load")?;

        page.fill_input(&case.input)?;
        deadline.check("input")?;

        log::info!("Waiting {}ms for translation...", wait.as_millis());
        let extracted = match self.config.wait {
            WaitStrategy::Fixed => {
                page.pause(wait);
                extract_translation(&page.snapshot()?, &self.config.rules)
            }
            WaitStrategy::Stable { interval, samples } => self.poll_until_stable(page, wait, interval, samples)?,
        };
        deadline.check("extraction")?;

        Ok(extracted)
    }

    fn poll_until_stable<P: TranslatorPage>(
        &self,
        page: &mut P,
        limit: Duration,
        interval: Duration,
        samples: usize,
    ) -> Result<String> {
        let mut tracker = StabilityTracker::new(samples);
        let mut waited = Duration::ZERO;
        let mut latest = String::new();

        while waited < limit {
            let step = interval.min(limit - waited);
            page.pause(step);
            waited += step;

            latest = extract_translation(&page.snapshot()?, &self.config.rules);
            if tracker.observe(&latest) {
                log::debug!("Translation stable after {}ms", waited.as_millis());
                break;
            }
        }

        Ok(latest)
    }

    fn save_screenshot<P: TranslatorPage>(&self, page: &mut P, case_id: &str) -> Option<PathBuf> {
        let path = self.config.screenshot_path(case_id);
        let saved = page.screenshot().and_then(|png| {
            std::fs::create_dir_all(&self.config.results_dir)?;
            std::fs::write(&path, png)?;
            Ok(())
        });

        match saved {
            Ok(()) => {
                log::info!("Screenshot saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::warn!("Failed to save screenshot for {}: {}", case_id, e);
                None
            }
        }
    }
}

fn log_judgement(case: &TestCase, judgement: &Judgement) {
    if let Some(score) = &judgement.keywords {
        log::info!("Keywords: {:?}", case.keywords);
        log::info!("Matched: {}/{} keywords (need {})", score.matched, score.total, score.threshold);
    }
    if let Some(reason) = judgement.reason {
        log::debug!("Fail reason: {:?}", reason);
    }
    log::info!("Actual Result: {}", judgement.verdict);
    log::info!("Expected Status: {}", case.expected_status);
}

/// First `max` characters of `text`, with an ellipsis if truncated
fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("kohomada", 50), "kohomada");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("කොහොමද", 2), "කො...");
        assert_eq!(preview("abc", 3), "abc");
    }

    #[test]
    fn test_suite_config_paths() {
        let config = SuiteConfig::new().results_dir("out");
        assert_eq!(config.screenshot_path("Pos_Fun_0001"), PathBuf::from("out/Pos_Fun_0001-mismatch.png"));
        assert_eq!(config.report_path(), PathBuf::from("out/report.json"));
    }

    #[test]
    fn test_workers_at_least_one() {
        assert_eq!(SuiteConfig::new().workers(0).workers, 1);
        assert_eq!(SuiteConfig::new().workers(4).workers, 4);
    }

    #[test]
    fn test_deadline() {
        let deadline = Deadline { started: Instant::now(), limit: Duration::from_secs(60) };
        assert!(deadline.check("input").is_ok());

        let deadline = Deadline { started: Instant::now(), limit: Duration::ZERO };
        thread::sleep(Duration::from_millis(2));
        assert!(matches!(deadline.check("input"), Err(SuiteError::Timeout { .. })));
    }

    #[test]
    fn test_suite_report_counts() {
        let case = |id: &str, outcome| CaseReport {
            id: id.to_string(),
            kind: "pos".to_string(),
            expected_status: Verdict::Pass,
            outcome,
            judgement: None,
            extracted: String::new(),
            error: None,
            screenshot: None,
            input_len: 0,
            waited_ms: 0,
            duration_ms: 0,
        };
        let report = SuiteReport::from_cases(
            vec![case("a", CaseOutcome::Matched), case("b", CaseOutcome::Mismatched), case("c", CaseOutcome::Errored)],
            Duration::from_millis(5),
        );
        assert_eq!(report.total, 3);
        assert_eq!(report.matched, 1);
        assert_eq!(report.mismatched, 1);
        assert_eq!(report.errored, 1);
        assert!(!report.all_matched());
    }
}

//! How long to let the translator work before reading its output.

use crate::script::text_len;
use std::time::Duration;

/// Inputs longer than this many code units get the longest wait
pub const LONG_INPUT: usize = 500;

/// Inputs longer than this many code units get the medium wait
pub const MEDIUM_INPUT: usize = 200;

pub const LONG_WAIT: Duration = Duration::from_millis(30_000);
pub const MEDIUM_WAIT: Duration = Duration::from_millis(20_000);
pub const SHORT_WAIT: Duration = Duration::from_millis(8_000);

/// Fixed wait for an input, tiered by its length
pub fn settle_duration(input: &str) -> Duration {
    let len = text_len(input);
    if len > LONG_INPUT {
        LONG_WAIT
    } else if len > MEDIUM_INPUT {
        MEDIUM_WAIT
    } else {
        SHORT_WAIT
    }
}

/// Strategy for waiting on a translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitStrategy {
    /// Sleep the full length tier
    #[default]
    Fixed,

    /// Poll the page until the extraction stops changing, bounded by the length tier
    Stable {
        /// Delay between samples
        interval: Duration,
        /// Consecutive identical non-empty samples required
        samples: usize,
    },
}

impl WaitStrategy {
    /// Polling with a one second interval and three matching samples
    pub fn stable() -> Self {
        WaitStrategy::Stable { interval: Duration::from_secs(1), samples: 3 }
    }
}

/// Tracks consecutive identical samples of the extracted text
#[derive(Debug, Clone)]
pub struct StabilityTracker {
    required: usize,
    last: Option<String>,
    streak: usize,
}

impl StabilityTracker {
    pub fn new(required: usize) -> Self {
        Self { required: required.max(1), last: None, streak: 0 }
    }

    /// Record a sample; returns true once the same non-empty text has been seen `required` times in a row
    pub fn observe(&mut self, sample: &str) -> bool {
        if sample.is_empty() {
            self.last = None;
            self.streak = 0;
            return false;
        }

        if self.last.as_deref() == Some(sample) {
            self.streak += 1;
        } else {
            self.last = Some(sample.to_string());
            self.streak = 1;
        }

        self.streak >= self.required
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers() {
        assert_eq!(settle_duration("kohomada"), SHORT_WAIT);
        assert_eq!(settle_duration(&"a".repeat(200)), SHORT_WAIT);
        assert_eq!(settle_duration(&"a".repeat(201)), MEDIUM_WAIT);
        assert_eq!(settle_duration(&"a".repeat(500)), MEDIUM_WAIT);
        assert_eq!(settle_duration(&"a".repeat(501)), LONG_WAIT);
    }

    #[test]
    fn test_600_chars_waits_30s() {
        assert_eq!(settle_duration(&"x".repeat(600)), Duration::from_millis(30_000));
    }

    #[test]
    fn test_default_strategy_is_fixed() {
        assert_eq!(WaitStrategy::default(), WaitStrategy::Fixed);
    }

    #[test]
    fn test_stability_tracker() {
        let mut tracker = StabilityTracker::new(3);
        assert!(!tracker.observe("අ"));
        assert!(!tracker.observe("අම"));
        assert!(!tracker.observe("අම"));
        assert!(tracker.observe("අම"));
        assert_eq!(tracker.last(), Some("අම"));
    }

    #[test]
    fn test_stability_tracker_resets_on_empty() {
        let mut tracker = StabilityTracker::new(2);
        assert!(!tracker.observe("අම"));
        assert!(!tracker.observe(""));
        assert!(!tracker.observe("අම"));
        assert!(tracker.observe("අම"));
    }
}

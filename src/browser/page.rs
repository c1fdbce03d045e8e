use crate::{browser::{config::BrowserSource, session::BrowserSession},
            error::{Result, SuiteError},
            extract::PageSnapshot,
            runner::TranslatorPage};
use std::time::Duration;

/// Public URL of the translator under test
pub const DEFAULT_URL: &str = "https://www.swifttranslator.com/";

/// Placeholder text identifying the Singlish input field
pub const DEFAULT_PLACEHOLDER: &str = "Input Your Singlish Text Here.";

/// Where the translator lives and how to find its input
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Page URL, loaded fresh before every case
    pub url: String,

    /// Placeholder of the input field, matched as a case-insensitive substring
    pub placeholder: String,

    /// How long the input may take to appear
    pub input_timeout: Duration,

    /// Pause after load so client-side scripts can finish
    pub load_settle: Duration,

    /// Default timeout for CDP waits on the tab
    pub step_timeout: Duration,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            input_timeout: Duration::from_secs(10),
            load_settle: Duration::from_secs(3),
            step_timeout: Duration::from_secs(180),
        }
    }
}

impl PageConfig {
    /// Builder method: set URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Builder method: set input placeholder
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Builder method: set per-step timeout
    pub fn step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// CSS selector for any element whose placeholder contains `placeholder`, ignoring case
    pub fn input_selector(&self) -> String {
        format!("[placeholder*=\"{}\" i]", self.placeholder.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// Translator page driven through a real browser tab
pub struct ChromeTranslatorPage {
    session: BrowserSession,
    config: PageConfig,
}

impl ChromeTranslatorPage {
    pub fn new(session: BrowserSession, config: PageConfig) -> Self {
        session.set_timeout(config.step_timeout);
        Self { session, config }
    }

    /// Open a browser from `source` and wrap its tab
    pub fn open(source: &BrowserSource, config: PageConfig) -> Result<Self> {
        let session = match source {
            BrowserSource::Launch(options) => BrowserSession::launch(options.clone())?,
            BrowserSource::Connect(options) => BrowserSession::connect(options.clone())?,
        };
        Ok(Self::new(session, config))
    }

    pub fn session(&self) -> &BrowserSession {
        &self.session
    }
}

impl TranslatorPage for ChromeTranslatorPage {
    fn reset(&mut self) -> Result<()> {
        self.session.navigate(&self.config.url)?;
        self.session.wait_for_navigation()?;
        std::thread::sleep(self.config.load_settle);
        Ok(())
    }

    fn fill_input(&mut self, text: &str) -> Result<()> {
        let selector = self.config.input_selector();
        let element = self.session.wait_for_visible_element(&selector, self.config.input_timeout)?;

        element
            .call_js_fn(include_str!("fill_input.js"), vec![serde_json::json!(text)], false)
            .map_err(|e| SuiteError::InputFailed(e.to_string()))?;

        Ok(())
    }

    fn snapshot(&mut self) -> Result<PageSnapshot> {
        self.session.evaluate_json(include_str!("snapshot.js"))
    }

    fn screenshot(&mut self) -> Result<Vec<u8>> {
        self.session.capture_full_page()
    }
}

impl Drop for ChromeTranslatorPage {
    fn drop(&mut self) {
        if let Err(e) = self.session.close() {
            log::debug!("Failed to close tab: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_config() {
        let config = PageConfig::default();
        assert_eq!(config.url, "https://www.swifttranslator.com/");
        assert_eq!(config.input_timeout, Duration::from_secs(10));
        assert_eq!(config.step_timeout, Duration::from_secs(180));
    }

    #[test]
    fn test_input_selector() {
        let config = PageConfig::default();
        assert_eq!(config.input_selector(), r#"[placeholder*="Input Your Singlish Text Here." i]"#);

        let config = PageConfig::default().placeholder(r#"Say "hi""#);
        assert_eq!(config.input_selector(), r#"[placeholder*="Say \"hi\"" i]"#);
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_placeholder_matches_loosely_and_skips_hidden_inputs() {
        let html = "<html><body><textarea placeholder='input your singlish text here.' style='display:none'></textarea>\
                    <textarea id='shown' placeholder='INPUT YOUR SINGLISH TEXT HERE. (max 5000)'></textarea></body></html>";
        let config = PageConfig::default().url(format!("data:text/html,{}", html));

        let mut page = ChromeTranslatorPage::open(&BrowserSource::default(), config).expect("Failed to launch browser");
        page.reset().expect("Failed to load page");
        page.fill_input("kohomada").expect("Failed to fill input");

        let value: String = page
            .session()
            .evaluate_json("JSON.stringify(document.getElementById('shown').value)")
            .expect("Failed to read input");
        assert_eq!(value, "kohomada");
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_fill_and_snapshot() {
        let html = "<html><body><p>Sinhala</p><textarea placeholder='Input Your Singlish Text Here.'></textarea>\
                    <textarea>කොහොමද</textarea></body></html>";
        let config = PageConfig::default().url(format!("data:text/html,{}", html));
        let source = BrowserSource::default();

        let mut page = ChromeTranslatorPage::open(&source, config).expect("Failed to launch browser");
        page.reset().expect("Failed to load page");
        page.fill_input("kohomada").expect("Failed to fill input");

        let snapshot = page.snapshot().expect("Failed to snapshot page");
        assert!(snapshot.body_text.contains("Sinhala"));
        assert_eq!(snapshot.textareas.len(), 2);
        assert_eq!(snapshot.textareas[0], "kohomada");
    }
}

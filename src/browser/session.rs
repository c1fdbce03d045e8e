use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            error::{Result, SuiteError}};
use base64::Engine;
use headless_chrome::{Browser, Element, Tab,
                      protocol::cdp::Page::{self, CaptureScreenshotFormatOption, Viewport},
                      util::Wait};
use serde::de::DeserializeOwned;
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Browser session that owns a Chrome/Chromium instance and one tab
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// Tab this session drives; other tabs in a shared browser are left alone
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Long inputs sit idle for up to 30s while the page translates
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| SuiteError::LaunchFailed(e.to_string()))?;

        let tab = browser.new_tab().map_err(|e| SuiteError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser, tab })
    }

    /// Connect to an existing browser instance via WebSocket and open a fresh tab in it
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, Duration::from_millis(options.timeout))
            .map_err(|e| SuiteError::ConnectionFailed(e.to_string()))?;

        let tab =
            browser.new_tab().map_err(|e| SuiteError::ConnectionFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser, tab })
    }

    /// Get the session's tab
    pub fn tab(&self) -> Arc<Tab> {
        self.tab.clone()
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Default timeout for element lookups and waits on this tab
    pub fn set_timeout(&self, timeout: Duration) {
        self.tab.set_default_timeout(timeout);
    }

    /// Navigate to a URL
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| SuiteError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab
            .wait_until_navigated()
            .map_err(|e| SuiteError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// Wait for an element matching a CSS selector to be rendered with a non-empty box
    pub fn wait_for_visible_element(&self, css_selector: &str, timeout: Duration) -> Result<Element<'_>> {
        Wait::with_timeout(timeout)
            .until(|| {
                let element = self.tab.find_element(css_selector).ok()?;
                let visible = element.call_js_fn(include_str!("is_visible.js"), vec![], false).ok()?.value?.as_bool()?;
                visible.then_some(element)
            })
            .map_err(|e| {
                SuiteError::ElementNotFound(format!(
                    "No visible element '{}' within {:?}: {}",
                    css_selector, timeout, e
                ))
            })
    }

    /// Evaluate a script that returns a JSON string and deserialize it
    pub fn evaluate_json<T: DeserializeOwned>(&self, js_code: &str) -> Result<T> {
        let result = self.tab.evaluate(js_code, false).map_err(|e| SuiteError::EvaluationFailed(e.to_string()))?;

        let json_value = result
            .value
            .ok_or_else(|| SuiteError::SnapshotParseFailed("No value returned from script".to_string()))?;

        // The script returns a JSON string, so parse it as a string first
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| SuiteError::SnapshotParseFailed(format!("Failed to get JSON string: {}", e)))?;

        serde_json::from_str(&json_str).map_err(|e| SuiteError::SnapshotParseFailed(e.to_string()))
    }

    /// Capture a PNG of the whole scrollable page, including what lies below the viewport
    pub fn capture_full_page(&self) -> Result<Vec<u8>> {
        let (width, height): (f64, f64) = self.evaluate_json(
            "JSON.stringify([document.documentElement.scrollWidth, document.documentElement.scrollHeight])",
        )?;

        let clip = Viewport { x: 0.0, y: 0.0, width, height, scale: 1.0 };

        let data = self
            .tab
            .call_method(Page::CaptureScreenshot {
                format: Some(CaptureScreenshotFormatOption::Png),
                quality: None,
                clip: Some(clip),
                from_surface: Some(true),
                capture_beyond_viewport: Some(true),
                optimize_for_speed: None,
            })
            .map_err(|e| SuiteError::ScreenshotFailed(e.to_string()))?
            .data;

        let png = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| SuiteError::ScreenshotFailed(format!("Invalid screenshot data: {}", e)))?;

        if let Some((w, h)) = png_dimensions(&png) {
            log::debug!("Captured {}x{} screenshot of {}x{} page", w, h, width, height);
        }

        Ok(png)
    }

    /// Close the session's tab
    pub fn close(&self) -> Result<()> {
        self.tab.close(false).map_err(|e| SuiteError::TabOperationFailed(format!("Failed to close tab: {}", e)))?;
        Ok(())
    }
}

/// Width and height from a PNG's IHDR chunk
pub fn png_dimensions(png: &[u8]) -> Option<(u32, u32)> {
    const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    if png.len() < 24 || png[..8] != SIGNATURE || &png[12..16] != b"IHDR" {
        return None;
    }

    let width = u32::from_be_bytes(png[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(png[20..24].try_into().ok()?);
    Some((width, height))
}

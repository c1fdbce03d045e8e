//! Browser session management and the CDP-backed translator page

pub mod config;
pub mod page;
pub mod session;

pub use config::{BrowserSource, ConnectionOptions, LaunchOptions};
pub use page::{ChromeTranslatorPage, PageConfig, DEFAULT_PLACEHOLDER, DEFAULT_URL};
pub use session::BrowserSession;

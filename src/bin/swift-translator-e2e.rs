//! Swift Translator E2E runner
//!
//! Loads test cases from a JSON data file, drives the translator page in Chrome
//! and reports whether each case's verdict matches its recorded status.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::{path::PathBuf, process::ExitCode, time::Duration};
use swift_translator_e2e::{BrowserSource, CaseFilter, ChromeTranslatorPage, ConnectionOptions, LaunchOptions,
                           PageConfig, SuiteConfig, SuiteRunner, WaitStrategy, load_cases};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Wait {
    /// Sleep a fixed time tiered by input length (default)
    Fixed,
    /// Poll until the extracted text stops changing, bounded by the same tiers
    Stable,
}

#[derive(Parser)]
#[command(name = "swift-translator-e2e")]
#[command(version)]
#[command(about = "End-to-end checks for the Swift Translator web tool", long_about = None)]
struct Cli {
    /// JSON file with the test cases
    #[arg(long, short = 'd', value_name = "FILE", default_value = "tests/data/test-data.json")]
    data: PathBuf,

    /// Translator URL
    #[arg(long, value_name = "URL", default_value = swift_translator_e2e::browser::DEFAULT_URL)]
    url: String,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// WebSocket endpoint URL of an already running browser
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// Directory for mismatch screenshots and report.json
    #[arg(long, short = 'o', value_name = "DIR", default_value = "test-results")]
    results_dir: PathBuf,

    /// Number of browser pages driven in parallel
    #[arg(long, short = 'w', default_value = "1")]
    workers: usize,

    /// Only run cases whose id contains this text
    #[arg(long, short = 'g', value_name = "TEXT")]
    grep: Option<String>,

    /// Only run cases of this type (e.g. pos, neg)
    #[arg(long, value_name = "TYPE")]
    kind: Option<String>,

    /// How to wait for the translation
    #[arg(long, value_enum, default_value = "fixed")]
    wait: Wait,

    /// Per-case timeout in seconds
    #[arg(long, value_name = "SECS", default_value = "180")]
    case_timeout: u64,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let cases = load_cases(&cli.data).with_context(|| format!("Failed to load {}", cli.data.display()))?;

    let mut filter = CaseFilter::new();
    if let Some(pattern) = cli.grep {
        filter = filter.id_contains(pattern);
    }
    if let Some(kind) = cli.kind {
        filter = filter.kind(kind);
    }
    let cases = filter.apply(cases);

    let source = match cli.ws_endpoint {
        Some(ws_url) => {
            log::info!("Connecting to browser at {}", ws_url);
            BrowserSource::Connect(ConnectionOptions::new(ws_url))
        }
        None => {
            let mut options = LaunchOptions::new().headless(!cli.headed);
            if let Some(path) = cli.executable_path {
                options = options.chrome_path(path);
            }
            if let Some(dir) = cli.user_data_dir {
                options = options.user_data_dir(dir);
            }
            log::info!("Browser mode: {}", if options.headless { "headless" } else { "headed" });
            BrowserSource::Launch(options)
        }
    };

    let case_timeout = Duration::from_secs(cli.case_timeout);
    let page_config = PageConfig::default().url(cli.url).step_timeout(case_timeout);

    let config = SuiteConfig::new()
        .results_dir(cli.results_dir)
        .case_timeout(case_timeout)
        .workers(cli.workers)
        .wait(match cli.wait {
            Wait::Fixed => WaitStrategy::Fixed,
            Wait::Stable => WaitStrategy::stable(),
        });

    log::info!("Running {} cases with {} worker(s)", cases.len(), config.workers);

    let runner = SuiteRunner::new(config);
    let report = runner
        .run(&cases, || ChromeTranslatorPage::open(&source, page_config.clone()))
        .context("Failed to start browser")?;

    let report_path = runner.config().report_path();
    report.write_json(&report_path).with_context(|| format!("Failed to write {}", report_path.display()))?;
    log::info!("Report written to {}", report_path.display());

    for case in report.cases.iter().filter(|c| !c.outcome.is_success()) {
        match &case.error {
            Some(error) => log::warn!("{}: errored: {}", case.id, error),
            None => log::warn!(
                "{}: expected {} but got {}",
                case.id,
                case.expected_status,
                case.verdict().map(|v| v.to_string()).unwrap_or_default()
            ),
        }
    }

    Ok(report.all_matched())
}

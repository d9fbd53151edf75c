use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LLM_MODEL: &str = "google/gemini-2.0-flash-001";

#[derive(Debug, Clone)]
pub struct Config {
    /// Missing key disables text extraction for the run.
    pub openrouter_api_key: Option<String>,
    pub llm_model: String,
    pub database_path: String,
    pub snapshot_dir: PathBuf,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let openrouter_api_key = env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let llm_model = env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string());

        let database_path = env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "ptr_trades.db".to_string());

        let snapshot_dir = env::var("SNAPSHOT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let http_timeout = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    Error::Config(format!("HTTP_TIMEOUT_SECS must be a whole number, got '{}'", raw))
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(60),
        };

        Ok(Self {
            openrouter_api_key,
            llm_model,
            database_path,
            snapshot_dir,
            http_timeout,
        })
    }
}

/// Per-run settings for the pipeline driver, built from CLI arguments.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub year: i32,
    /// Overall cap on newly processed filings; 0 means unlimited.
    pub limit: usize,
    /// Cap on result pages scanned per source; `None` scans everything.
    pub max_pages: Option<u32>,
    pub dry_run: bool,
    pub save_scrape_json: bool,
    pub snapshot_dir: PathBuf,
    pub include_house: bool,
    pub include_senate: bool,
}

impl PipelineConfig {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            limit: 10,
            max_pages: None,
            dry_run: false,
            save_scrape_json: false,
            snapshot_dir: PathBuf::from("."),
            include_house: true,
            include_senate: true,
        }
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        let mut pipeline = Self::new(chrono::Datelike::year(&chrono::Utc::now()));
        pipeline.snapshot_dir = config.snapshot_dir.clone();
        pipeline
    }
}

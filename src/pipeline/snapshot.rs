use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::FilingDescriptor;

/// Raw House scrape kept on disk for offline inspection.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeSnapshot {
    pub year: i32,
    pub filings: Vec<FilingDescriptor>,
    pub scraped_at: DateTime<Utc>,
}

pub fn snapshot_path(dir: &Path, year: i32) -> PathBuf {
    dir.join(format!("house_scraped_filings_{}.json", year))
}

pub fn save_snapshot(dir: &Path, year: i32, filings: &[FilingDescriptor]) -> Result<PathBuf> {
    let snapshot = ScrapeSnapshot {
        year,
        filings: filings.to_vec(),
        scraped_at: Utc::now(),
    };
    std::fs::create_dir_all(dir)?;
    let path = snapshot_path(dir, year);
    std::fs::write(&path, serde_json::to_string_pretty(&snapshot)?)?;
    Ok(path)
}

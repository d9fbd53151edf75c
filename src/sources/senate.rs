use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{FilingDescriptor, Office, SenateReportLink};
use crate::sources::session::SenateSession;
use crate::sources::{FilingSource, ScrapeRequest};

const REPORT_DATA_PATH: &str = "/search/report/data/";
/// Largest page the eFD results endpoint serves.
pub const ROWS_PER_PAGE: usize = 100;
/// eFD report type id for Periodic Transaction Reports.
const PTR_REPORT_TYPE: &str = "[11]";

static RE_HREF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"href="([^"]+)""#).unwrap());

#[derive(Debug, Deserialize)]
struct ReportDataPage {
    #[serde(rename = "recordsTotal", default)]
    records_total: usize,
    #[serde(default)]
    data: Vec<Vec<String>>,
}

pub struct SenateSource {
    session: Arc<SenateSession>,
}

impl SenateSource {
    pub fn new(session: Arc<SenateSession>) -> Self {
        Self { session }
    }

    fn page_form(&self, year: i32, start: usize) -> Vec<(&'static str, String)> {
        vec![
            ("start", start.to_string()),
            ("length", ROWS_PER_PAGE.to_string()),
            ("report_types", PTR_REPORT_TYPE.to_string()),
            ("filer_types", "[]".to_string()),
            ("submitted_start_date", format!("01/01/{} 00:00:00", year)),
            ("submitted_end_date", format!("12/31/{} 23:59:59", year)),
            ("candidate_state", String::new()),
            ("senator_state", String::new()),
            ("office_id", String::new()),
            ("first_name", String::new()),
            ("last_name", String::new()),
            // newest filings first
            ("order[0][column]", "4".to_string()),
            ("order[0][dir]", "desc".to_string()),
        ]
    }
}

#[async_trait]
impl FilingSource for SenateSource {
    fn office(&self) -> Office {
        Office::Senate
    }

    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<FilingDescriptor>> {
        let mut links = Vec::new();
        let mut page: u32 = 0;

        loop {
            if request.max_pages.is_some_and(|max| page >= max) {
                break;
            }

            let start = page as usize * ROWS_PER_PAGE;
            let form = self.page_form(request.year, start);
            let data: ReportDataPage = self.session.post_search(REPORT_DATA_PATH, &form).await?;
            let rows = data.data.len();
            page += 1;

            tracing::info!("Senate page {}: {} rows ({} total)", page, rows, data.records_total);
            links.extend(data.data.iter().filter_map(|row| parse_report_row(row)));

            if rows < ROWS_PER_PAGE || start + rows >= data.records_total {
                break;
            }
        }

        let base_url = self.session.base_url().to_string();
        let filings: Vec<_> = links
            .into_iter()
            .map(|link| link.into_descriptor(&base_url))
            .collect();

        tracing::info!("Senate search: {} PTR links", filings.len());
        Ok(filings)
    }
}

/// Columns: first name, last name, filer office, report link html, date filed.
pub fn parse_report_row(row: &[String]) -> Option<SenateReportLink> {
    if row.len() < 4 {
        return None;
    }
    let cell = |idx: usize| row.get(idx).map(|c| c.trim().to_string()).unwrap_or_default();
    let href = RE_HREF.captures(&row[3]).map(|caps| caps[1].to_string());

    Some(SenateReportLink {
        first_name: cell(0),
        last_name: cell(1),
        filer_office: cell(2),
        href,
        filed_date: cell(4),
    })
}

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{Error, Result};
use crate::http::RateLimiter;
use crate::models::{FilingDescriptor, HouseSearchRow, Office};
use crate::sources::{FilingSource, ScrapeRequest};

pub const HOUSE_BASE_URL: &str = "https://disclosures-clerk.house.gov";
const SEARCH_PATH: &str = "/FinancialDisclosure/ViewMemberSearchResult";
/// The Clerk's result table shows at most this many rows per page.
pub const ROWS_PER_PAGE: usize = 100;

pub struct HouseSource {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
}

impl HouseSource {
    /// `rate_limiter` should be shared with every other client of the Clerk site.
    pub fn new(client: Client, rate_limiter: RateLimiter) -> Self {
        Self::with_base_url(client, rate_limiter, HOUSE_BASE_URL)
    }

    pub fn with_base_url(client: Client, rate_limiter: RateLimiter, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter,
        }
    }
}

#[async_trait]
impl FilingSource for HouseSource {
    fn office(&self) -> Office {
        Office::House
    }

    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<FilingDescriptor>> {
        self.rate_limiter.wait().await;
        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        let year = request.year.to_string();
        tracing::info!(
            "Searching House filings for year={} max_pages={}",
            year,
            request
                .max_pages
                .map(|p| p.to_string())
                .unwrap_or_else(|| "ALL".to_string())
        );

        let response = self
            .client
            .post(&url)
            .form(&[
                ("LastName", ""),
                ("FilingYear", year.as_str()),
                ("State", ""),
                ("District", ""),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Scrape {
                office: Office::House.to_string(),
                message: format!("search returned {}", response.status()),
            });
        }

        let html = response.text().await?;
        let rows = parse_search_results(&html);
        let total = rows.len();

        let mut filings: Vec<FilingDescriptor> = rows
            .into_iter()
            .filter(HouseSearchRow::is_ptr)
            .map(|row| row.into_descriptor(&self.base_url))
            .collect();

        // Clerk ids are sequential, so descending id puts the newest filings first.
        filings.sort_by(|a, b| {
            let a_id = a.doc_id.parse::<u64>().unwrap_or(0);
            let b_id = b.doc_id.parse::<u64>().unwrap_or(0);
            b_id.cmp(&a_id)
        });

        if let Some(cap) = request.row_cap(ROWS_PER_PAGE) {
            filings.truncate(cap);
        }

        tracing::info!("House search: {} PTR filings from {} result rows", filings.len(), total);
        Ok(filings)
    }
}

/// Parse the member search result table. Rows without a document link are skipped.
pub fn parse_search_results(html: &str) -> Vec<HouseSearchRow> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("table tbody tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();
    let link_selector = Selector::parse("a[href]").unwrap();

    let mut rows = Vec::new();
    for row in document.select(&row_selector) {
        let cells: Vec<_> = row.select(&cell_selector).collect();
        if cells.len() < 4 {
            continue;
        }

        let Some(link) = cells[0].select(&link_selector).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };

        let text = |idx: usize| cells[idx].text().collect::<String>().trim().to_string();

        rows.push(HouseSearchRow {
            member_name: link.text().collect::<String>().trim().to_string(),
            office: text(1),
            filing_year: text(2),
            filing_type: text(3),
            pdf_href: href.trim().to_string(),
        });
    }
    rows
}

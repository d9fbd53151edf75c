//! Fixtures and hand-written doubles shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::extract::FilingExtractor;
use crate::models::{
    CanonicalTransaction, FilingDescriptor, HouseRow, Office, RawTransactionRow, WriteSummary,
};
use crate::sources::{FilingSource, ScrapeRequest};
use crate::storage::PersistenceGateway;

pub fn house_filing(doc_id: &str) -> FilingDescriptor {
    FilingDescriptor::new(
        doc_id,
        format!("https://disclosures-clerk.house.gov/public_disc/ptr-pdfs/2024/{doc_id}.pdf"),
        "Hon. Jane Doe",
        Office::House,
    )
}

pub fn senate_filing(doc_id: &str) -> FilingDescriptor {
    FilingDescriptor::new(
        doc_id,
        format!("https://efdsearch.senate.gov/search/view/ptr/{doc_id}/"),
        "John Smith",
        Office::Senate,
    )
}

pub fn house_row(ticker: &str) -> RawTransactionRow {
    RawTransactionRow::House(HouseRow {
        ticker: Some(ticker.to_string()),
        asset_name: Some(format!("{ticker} Holdings")),
        transaction_type: Some("Purchase".to_string()),
        transaction_date: Some("01/02/2024".to_string()),
        amount_low: Some(1001),
        amount_high: Some(15000),
        owner: Some("SP".to_string()),
        comment: None,
    })
}

pub fn canonical_tx(doc_id: &str, office: Office, ticker: Option<&str>) -> CanonicalTransaction {
    CanonicalTransaction {
        doc_id: doc_id.to_string(),
        member_name: format!("{office} Member"),
        office,
        pdf_url: format!("https://example.test/{doc_id}.pdf"),
        ticker: ticker.map(str::to_string),
        asset_name: ticker.map(|t| format!("{t} Holdings")),
        transaction_type: Some("Purchase".to_string()),
        transaction_date: Some("01/02/2024".to_string()),
        amount_low: Some(1001),
        amount_high: Some(15000),
        owner: Some("SP".to_string()),
        comment: String::new(),
    }
}

/// Extractor returning canned rows per `doc_id`. Clones share the call log.
#[derive(Clone, Default)]
pub struct MockExtractor {
    rows: HashMap<String, Vec<RawTransactionRow>>,
    failing: HashSet<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, doc_id: &str, rows: Vec<RawTransactionRow>) -> Self {
        self.rows.insert(doc_id.to_string(), rows);
        self
    }

    pub fn failing(mut self, doc_id: &str) -> Self {
        self.failing.insert(doc_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FilingExtractor for MockExtractor {
    async fn extract(&self, filing: &FilingDescriptor) -> Result<Vec<RawTransactionRow>> {
        self.calls.lock().unwrap().push(filing.doc_id.clone());
        if self.failing.contains(&filing.doc_id) {
            return Err(Error::EmptyDocument(filing.doc_id.clone()));
        }
        Ok(self.rows.get(&filing.doc_id).cloned().unwrap_or_default())
    }
}

pub struct MockSource {
    office: Office,
    filings: Option<Vec<FilingDescriptor>>,
    scrapes: Arc<Mutex<usize>>,
}

impl MockSource {
    pub fn new(office: Office, filings: Vec<FilingDescriptor>) -> Self {
        Self {
            office,
            filings: Some(filings),
            scrapes: Arc::default(),
        }
    }

    pub fn unreachable(office: Office) -> Self {
        Self {
            office,
            filings: None,
            scrapes: Arc::default(),
        }
    }

    pub fn scrape_counter(&self) -> Arc<Mutex<usize>> {
        self.scrapes.clone()
    }
}

#[async_trait]
impl FilingSource for MockSource {
    fn office(&self) -> Office {
        self.office
    }

    async fn scrape(&self, _request: &ScrapeRequest) -> Result<Vec<FilingDescriptor>> {
        *self.scrapes.lock().unwrap() += 1;
        self.filings.clone().ok_or_else(|| Error::Scrape {
            office: self.office.to_string(),
            message: "portal unreachable".to_string(),
        })
    }
}

/// In-memory gateway recording every `write_batch` call.
#[derive(Clone, Default)]
pub struct MockGateway {
    known: HashSet<String>,
    unreadable: bool,
    writes: Arc<Mutex<Vec<Vec<CanonicalTransaction>>>>,
}

impl MockGateway {
    pub fn new(known: &[&str]) -> Self {
        Self {
            known: known.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn unreadable() -> Self {
        Self {
            unreadable: true,
            ..Self::default()
        }
    }

    pub fn writes(&self) -> Vec<Vec<CanonicalTransaction>> {
        self.writes.lock().unwrap().clone()
    }
}

impl PersistenceGateway for MockGateway {
    fn known_doc_ids(&self) -> Result<HashSet<String>> {
        if self.unreadable {
            return Err(Error::StoreUnavailable("connection refused".to_string()));
        }
        Ok(self.known.clone())
    }

    fn write_batch(&self, transactions: &[CanonicalTransaction]) -> Result<WriteSummary> {
        self.writes.lock().unwrap().push(transactions.to_vec());
        Ok(WriteSummary {
            transactions_inserted: transactions.len(),
            ..WriteSummary::default()
        })
    }
}

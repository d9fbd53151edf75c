use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Error, Result};
use crate::extract::text::pdf_to_text;
use crate::extract::FilingExtractor;
use crate::http::RateLimiter;
use crate::llm::{parse_llm_transactions, ExtractionRequest, LLMProvider};
use crate::models::{FilingDescriptor, HouseRow, RawTransactionRow};

/// Downloads a House PTR PDF, extracts its text and has the LLM transcribe it.
pub struct HousePdfExtractor {
    client: Client,
    llm: Arc<dyn LLMProvider>,
    rate_limiter: RateLimiter,
}

impl HousePdfExtractor {
    pub fn new(client: Client, llm: Arc<dyn LLMProvider>, rate_limiter: RateLimiter) -> Self {
        Self {
            client,
            llm,
            rate_limiter,
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.rate_limiter.wait().await;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl FilingExtractor for HousePdfExtractor {
    async fn extract(&self, filing: &FilingDescriptor) -> Result<Vec<RawTransactionRow>> {
        let bytes = self.download(&filing.pdf_url).await?;
        tracing::debug!("[{}] Downloaded {} bytes", filing.doc_id, bytes.len());

        let text = pdf_to_text(&bytes)?;
        if text.trim().is_empty() {
            return Err(Error::EmptyDocument(filing.doc_id.clone()));
        }

        tracing::debug!("[{}] Transcribing {} chars with {}", filing.doc_id, text.len(), self.llm.name());
        let request = ExtractionRequest::new(&filing.doc_id, &filing.member_name, text);
        let reply = self.llm.transcribe(request).await?;

        Ok(parse_llm_transactions(&reply, &filing.doc_id)
            .into_iter()
            .map(|line| RawTransactionRow::House(HouseRow::from(line)))
            .collect())
    }
}

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::extract::text::html_to_text;
use crate::extract::FilingExtractor;
use crate::llm::{parse_llm_transactions, ExtractionRequest, LLMProvider};
use crate::models::{is_paper_report, FilingDescriptor, RawTransactionRow};
use crate::sources::SenateSession;

/// Reads an electronic Senate report page through the shared eFD session.
pub struct SenateReportExtractor {
    session: Arc<SenateSession>,
    llm: Arc<dyn LLMProvider>,
}

impl SenateReportExtractor {
    pub fn new(session: Arc<SenateSession>, llm: Arc<dyn LLMProvider>) -> Self {
        Self { session, llm }
    }
}

#[async_trait]
impl FilingExtractor for SenateReportExtractor {
    async fn extract(&self, filing: &FilingDescriptor) -> Result<Vec<RawTransactionRow>> {
        check_report_url(filing)?;

        let html = self.session.get_page(&filing.pdf_url).await?;
        let text = html_to_text(&html);
        if text.trim().is_empty() {
            return Err(Error::EmptyDocument(filing.doc_id.clone()));
        }

        tracing::debug!("[{}] Transcribing report page with {}", filing.doc_id, self.llm.name());
        let request = ExtractionRequest::new(&filing.doc_id, &filing.member_name, text);
        let reply = self.llm.transcribe(request).await?;

        Ok(parse_llm_transactions(&reply, &filing.doc_id)
            .into_iter()
            .map(RawTransactionRow::Senate)
            .collect())
    }
}

/// Paper filings are scanned images and need OCR, which this extractor does not do.
fn check_report_url(filing: &FilingDescriptor) -> Result<()> {
    if is_paper_report(&filing.pdf_url) {
        return Err(Error::UnsupportedDocument {
            doc_id: filing.doc_id.clone(),
            reason: "paper filing (scanned images)".to_string(),
        });
    }
    if !filing.pdf_url.contains("/view/ptr/") {
        return Err(Error::UnsupportedDocument {
            doc_id: filing.doc_id.clone(),
            reason: format!("unrecognized report url {}", filing.pdf_url),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Office;

    #[test]
    fn test_paper_filings_are_unsupported() {
        let paper = FilingDescriptor::new(
            "X1",
            "https://efdsearch.senate.gov/search/view/paper/X1/",
            "A B",
            Office::Senate,
        );
        let err = check_report_url(&paper).unwrap_err();
        assert_eq!(err.kind(), "unsupported_document");

        let electronic = FilingDescriptor::new(
            "Y2",
            "https://efdsearch.senate.gov/search/view/ptr/Y2/",
            "A B",
            Office::Senate,
        );
        assert!(check_report_url(&electronic).is_ok());
    }
}

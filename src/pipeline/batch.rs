use indicatif::{ProgressBar, ProgressStyle};

use crate::extract::FilingExtractor;
use crate::models::{FilingDescriptor, FilingFailure, TaggedRow};

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub rows: Vec<TaggedRow>,
    pub failures: Vec<FilingFailure>,
}

/// Run the extractor over each filing in order, one at a time.
///
/// A failing filing is logged and recorded, then skipped; it never stops the
/// batch. A filing with no rows is not a failure.
pub async fn extract_all(extractor: &dyn FilingExtractor, filings: &[FilingDescriptor]) -> BatchOutcome {
    let pb = ProgressBar::new(filings.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} filings",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );

    let mut outcome = BatchOutcome::default();
    let total = filings.len();

    for (idx, filing) in filings.iter().enumerate() {
        tracing::info!(
            "[{}/{}] Processing filing doc_id={} member={}",
            idx + 1,
            total,
            filing.doc_id,
            filing.member_name
        );

        match extractor.extract(filing).await {
            Ok(rows) => {
                tracing::info!("[{}] Extracted {} transaction(s)", filing.doc_id, rows.len());
                outcome
                    .rows
                    .extend(rows.into_iter().map(|row| TaggedRow::new(filing, row)));
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!("[{}] Processing failed, retry on a later run: {}", filing.doc_id, e);
                } else {
                    tracing::error!("[{}] Processing failed: {}", filing.doc_id, e);
                }
                outcome.failures.push(FilingFailure {
                    doc_id: filing.doc_id.clone(),
                    office: filing.office,
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                });
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    outcome
}

use std::collections::HashSet;

use crate::models::FilingDescriptor;

/// Keep filings whose `doc_id` is not yet known, in source order.
///
/// Records without a `doc_id` are dropped silently, as are repeats of an id
/// already accepted. `limit == 0` means no cap.
pub fn filter_new(
    filings: &[FilingDescriptor],
    known: &HashSet<String>,
    limit: usize,
) -> Vec<FilingDescriptor> {
    let mut accepted: HashSet<&str> = HashSet::new();
    let mut new_filings = Vec::new();

    for filing in filings {
        if limit > 0 && new_filings.len() >= limit {
            break;
        }
        if !filing.has_doc_id() {
            continue;
        }
        let doc_id = filing.doc_id.as_str();
        if known.contains(doc_id) || !accepted.insert(doc_id) {
            continue;
        }
        new_filings.push(filing.clone());
    }

    tracing::info!(
        "Filtered new filings: {} (from {} total scraped)",
        new_filings.len(),
        filings.len()
    );
    new_filings
}

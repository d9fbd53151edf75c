pub mod sqlite;

pub use sqlite::Storage;

use std::collections::HashSet;

use crate::error::Result;
use crate::models::{CanonicalTransaction, WriteSummary};

/// The shared store. Writes are idempotent on `doc_id` plus transaction
/// identity, so a retried run may resubmit overlapping data.
pub trait PersistenceGateway {
    fn known_doc_ids(&self) -> Result<HashSet<String>>;
    fn write_batch(&self, transactions: &[CanonicalTransaction]) -> Result<WriteSummary>;
}

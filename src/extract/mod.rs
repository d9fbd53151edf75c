pub mod text;
pub mod house;
pub mod senate;

pub use house::HousePdfExtractor;
pub use senate::SenateReportExtractor;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FilingDescriptor, RawTransactionRow};

/// Retrieves one filing's document and returns its raw transaction rows.
/// Implementations keep no partial state between calls.
#[async_trait]
pub trait FilingExtractor: Send + Sync {
    async fn extract(&self, filing: &FilingDescriptor) -> Result<Vec<RawTransactionRow>>;
}

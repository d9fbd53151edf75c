pub mod house;
pub mod senate;
pub mod session;

pub use house::HouseSource;
pub use senate::SenateSource;
pub use session::SenateSession;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FilingDescriptor, Office};

/// What to scrape: the filing year plus an optional cap on result pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub year: i32,
    pub max_pages: Option<u32>,
}

impl ScrapeRequest {
    /// Row cap implied by the page budget for a portal with `page_size` rows per page.
    pub fn row_cap(&self, page_size: usize) -> Option<usize> {
        self.max_pages.map(|pages| pages as usize * page_size)
    }
}

/// A disclosure portal. Returns an empty list when nothing is found and an
/// error only when the portal itself could not be read.
#[async_trait]
pub trait FilingSource: Send + Sync {
    fn office(&self) -> Office;
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<FilingDescriptor>>;
}

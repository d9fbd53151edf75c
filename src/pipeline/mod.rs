pub mod batch;
pub mod budget;
pub mod dedup;
pub mod driver;
pub mod normalizer;
pub mod snapshot;

pub use batch::{extract_all, BatchOutcome};
pub use budget::{remaining_quota, Quota};
pub use dedup::filter_new;
pub use driver::{PipelineDriver, SourceStage};
pub use normalizer::normalize;
pub use snapshot::{save_snapshot, ScrapeSnapshot};

pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, PipelineConfig};
pub use error::{Error, Result};
pub use llm::{LLMProvider, OpenRouterProvider};
pub use pipeline::{PipelineDriver, SourceStage};
pub use storage::{PersistenceGateway, Storage};

use async_trait::async_trait;
use crate::error::Result;
use crate::llm::prompts::ExtractionRequest;

/// Text-extraction service: turns raw document text into CSV-like transaction lines.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn transcribe(&self, request: ExtractionRequest) -> Result<String>;
    fn name(&self) -> &str;
}

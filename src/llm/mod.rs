pub mod provider;
pub mod openrouter;
pub mod prompts;
pub mod parser;

pub use provider::LLMProvider;
pub use openrouter::OpenRouterProvider;
pub use prompts::ExtractionRequest;
pub use parser::parse_llm_transactions;

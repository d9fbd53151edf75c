use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_LLM_MODEL;
use crate::error::{Error, Result};
use crate::http::RateLimiter;
use crate::llm::prompts::{ExtractionRequest, SYSTEM_PROMPT};
use crate::llm::provider::LLMProvider;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    model: String,
    rate_limiter: RateLimiter,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChatMessage>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl OpenRouterProvider {
    pub fn new(api_key: String, model: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            rate_limiter: RateLimiter::llm(),
        })
    }
}

#[async_trait]
impl LLMProvider for OpenRouterProvider {
    async fn transcribe(&self, request: ExtractionRequest) -> Result<String> {
        let max_tokens = request.max_tokens();
        tracing::info!(
            "[{}] Sending ~{} tokens to {} (max_tokens={})",
            request.doc_id,
            request.estimate_tokens(),
            self.model,
            max_tokens
        );

        let body = ChatRequest {
            model: self.model.clone(),
            max_tokens,
            temperature: 0.1,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.to_prompt(),
                },
            ],
        };

        self.rate_limiter.wait().await;

        let response = self
            .client
            .post(OPENROUTER_API_URL)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .header("X-Title", "ptrsync")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::LLMApi(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::LLMApi(format!(
                "OpenRouter API error ({}): {}",
                status, body
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::LLMApi(format!("Failed to parse OpenRouter response: {}", e)))?;

        if let Some(error) = result.error {
            return Err(Error::LLMApi(error.message));
        }

        let choice = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::LLMApi("Response contained no choices".to_string()))?;

        if choice.finish_reason.as_deref() == Some("length") {
            tracing::warn!("[{}] Reply truncated at max_tokens={}", request.doc_id, max_tokens);
        }

        let text = choice.message.map(|m| m.content).unwrap_or_default();
        if text.trim().is_empty() {
            return Err(Error::LLMApi("Empty response from OpenRouter".to_string()));
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        "OpenRouter"
    }
}

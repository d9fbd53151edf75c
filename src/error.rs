use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Scrape failed for {office}: {message}")]
    Scrape { office: String, message: String },

    #[error("Session error: {0}")]
    Session(String),

    #[error("Document download failed ({status}) for {url}")]
    Download { url: String, status: u16 },

    #[error("PDF text extraction failed: {0}")]
    PdfText(String),

    #[error("No text extracted from document {0}")]
    EmptyDocument(String),

    #[error("Unsupported document format for {doc_id}: {reason}")]
    UnsupportedDocument { doc_id: String, reason: String },

    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Download { .. })
    }

    /// Short label used in run summaries and failure logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Scrape { .. } => "scrape",
            Error::Session(_) => "session",
            Error::Download { .. } | Error::Network(_) => "network",
            Error::PdfText(_) => "pdf_text",
            Error::EmptyDocument(_) => "empty_document",
            Error::UnsupportedDocument { .. } => "unsupported_document",
            Error::LLMApi(_) => "llm",
            Error::ParseError(_) | Error::Serialization(_) => "parse",
            Error::Config(_) => "config",
            Error::StoreUnavailable(_) | Error::Database(_) => "store",
            Error::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(Error::EmptyDocument("1".into()).kind(), "empty_document");
        assert_eq!(Error::LLMApi("boom".into()).kind(), "llm");
        assert!(Error::Download { url: "u".into(), status: 503 }.is_retryable());
        assert!(!Error::ParseError("x".into()).is_retryable());
    }
}

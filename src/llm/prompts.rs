pub const SYSTEM_PROMPT: &str = "You extract financial transactions from congressional \
Periodic Transaction Report text. Follow the output format exactly and never invent data.";

const TASK_PROMPT: &str = r#"Extract every transaction in the text below as one CSV line with exactly six columns, in this order:
1. Owner code (SP, DC, JT, or empty when the filer owns the asset)
2. Asset description, with the ticker in parentheses at the end when present, e.g. Microsoft Corporation (MSFT)
3. Transaction type code: P (purchase), S (sale) or E (exchange)
4. Transaction date as MM/DD/YYYY
5. Notification date as MM/DD/YYYY
6. Amount range as written, e.g. $1,001 - $15,000 or Over $1,000,000

Wrap a field in double quotes when it contains a comma.
Output only CSV lines: no header, no commentary.
If the text holds no transactions, output the single line NO_TRANSACTIONS_FOUND.
If the text is unreadable or corrupted, output the single line DOCUMENT_UNREADABLE.

Text:
"#;

/// Replies for long documents need a larger completion budget.
const LONG_DOCUMENT_CHARS: usize = 25_000;

#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub doc_id: String,
    pub member_name: String,
    pub text: String,
}

impl ExtractionRequest {
    pub fn new(doc_id: impl Into<String>, member_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            member_name: member_name.into(),
            text: text.into(),
        }
    }

    pub fn to_prompt(&self) -> String {
        let mut prompt = String::with_capacity(TASK_PROMPT.len() + self.text.len());
        prompt.push_str(TASK_PROMPT);
        prompt.push_str(&self.text);
        prompt
    }

    pub fn max_tokens(&self) -> u32 {
        if self.text.len() > LONG_DOCUMENT_CHARS {
            8192
        } else {
            4096
        }
    }

    pub fn estimate_tokens(&self) -> usize {
        // Rough estimate: ~4 characters per token
        self.text.len() / 4
    }
}

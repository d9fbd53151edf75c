use std::sync::LazyLock;

use regex::Regex;

use crate::models::LlmTransaction;

pub const NO_TRANSACTIONS_FOUND: &str = "NO_TRANSACTIONS_FOUND";
pub const DOCUMENT_UNREADABLE: &str = "DOCUMENT_UNREADABLE";
pub const NO_TEXT_FOUND: &str = "NO_TEXT_FOUND";

static RE_BRACKET_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\[[^\]]+\]\s*").unwrap());
static RE_PAREN_TICKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]+)\)$").unwrap());
static RE_TRAILING_TICKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s([A-Z0-9.]{1,5})$").unwrap());
static RE_TICKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z0-9.]+$").unwrap());
static RE_PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").unwrap());
static RE_OVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^over\s*\$?\s*([\d,]+)").unwrap());
static RE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}[/-]\d{1,2}[/-]\d{2,4}$").unwrap());

const REFUSAL_PREFIXES: [&str; 3] = ["there are no", "i am unable", "no transaction"];

/// Parse the CSV-like reply of the text-extraction service.
///
/// Expected columns: owner, asset description, type code (P/S/E),
/// transaction date, notification date, amount range. Lines that do not
/// look like transactions are skipped, never fatal.
pub fn parse_llm_transactions(reply: &str, doc_id: &str) -> Vec<LlmTransaction> {
    let text = reply.trim();
    match text {
        NO_TRANSACTIONS_FOUND => {
            tracing::info!("[{}] Extraction service reported no transactions", doc_id);
            return Vec::new();
        }
        DOCUMENT_UNREADABLE => {
            tracing::warn!("[{}] Extraction service reported document unreadable", doc_id);
            return Vec::new();
        }
        NO_TEXT_FOUND => {
            tracing::warn!("[{}] Extraction service reported no text", doc_id);
            return Vec::new();
        }
        _ => {}
    }

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("```"))
        .collect();

    tracing::debug!("[{}] Parsing {} reply lines", doc_id, lines.len());

    let transactions: Vec<_> = lines
        .iter()
        .filter_map(|line| parse_line(line, doc_id))
        .collect();

    tracing::info!("[{}] Parsed {} transaction(s)", doc_id, transactions.len());
    transactions
}

fn parse_line(line: &str, doc_id: &str) -> Option<LlmTransaction> {
    let cleaned = RE_BRACKET_TAG.replace_all(line, " ");
    let parts = split_csv_line(&cleaned);

    if parts.len() < 5 {
        return None;
    }
    if parts.iter().any(|p| {
        let lower = p.to_lowercase();
        REFUSAL_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
    }) {
        return None;
    }

    let owner_code = parts[0].trim().to_string();

    let Some(type_idx) = parts
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, p)| matches!(p.trim().to_uppercase().as_str(), "P" | "S" | "E"))
        .map(|(i, _)| i)
    else {
        tracing::warn!("[{}] No transaction type in line: {}", doc_id, line);
        return None;
    };

    let asset_description = parts[1..type_idx].join(",").trim().to_string();
    let type_code = parts[type_idx].trim().to_uppercase();

    let remaining = &parts[type_idx + 1..];
    let (transaction_date_str, notification_date_str, amount_range) = if remaining.len() >= 3 {
        (
            remaining[0].trim().to_string(),
            remaining[1].trim().to_string(),
            remaining[2..].concat().trim().to_string(),
        )
    } else {
        (String::new(), String::new(), String::new())
    };

    let (company_name, ticker) = split_asset_description(&asset_description);
    let (amount_low, amount_high) = parse_amount_range(&amount_range);

    if !is_date(&transaction_date_str) {
        tracing::warn!(
            "[{}] Invalid transaction date '{}' in line: {}",
            doc_id,
            transaction_date_str,
            line
        );
    }
    if !is_date(&notification_date_str) {
        tracing::debug!(
            "[{}] Invalid notification date '{}' in line: {}",
            doc_id,
            notification_date_str,
            line
        );
    }

    Some(LlmTransaction {
        owner_code,
        company_name,
        ticker,
        transaction_type_full: transaction_type_name(&type_code).to_string(),
        transaction_date_str,
        notification_date_str,
        amount_low,
        amount_high,
        raw_llm_line: line.to_string(),
    })
}

/// Quote-aware comma split; doubled quotes inside a quoted field are unescaped.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if matches!(chars.peek(), Some('"')) {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
                // skip initial space, like the reply format allows
                while matches!(chars.peek(), Some(' ')) {
                    chars.next();
                }
            }
            _ => field.push(ch),
        }
    }
    fields.push(field);
    fields
}

/// Split `Microsoft Corp (MSFT)` into name and ticker. A trailing upper-case
/// word of at most five characters also counts as a ticker.
pub fn split_asset_description(description: &str) -> (String, Option<String>) {
    let description = description.trim();

    if let Some(caps) = RE_PAREN_TICKER.captures(description) {
        let candidate = caps[1].trim();
        if RE_TICKER.is_match(candidate) {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(description.len());
            let name = description[..start].trim();
            let name = if name.is_empty() { description } else { name };
            return (name.to_string(), Some(candidate.to_string()));
        }
        return (description.to_string(), None);
    }

    if let Some(caps) = RE_TRAILING_TICKER.captures(description) {
        let candidate = caps[1].trim();
        let start = caps.get(0).map(|m| m.start()).unwrap_or(description.len());
        let name = description[..start].trim();
        if !name.is_empty() {
            return (name.to_string(), Some(candidate.to_string()));
        }
    }

    (description.to_string(), None)
}

pub fn transaction_type_name(code: &str) -> &'static str {
    let cleaned = RE_PARENTHETICAL.replace_all(code, "");
    match cleaned.trim().to_uppercase().as_str() {
        "P" => "Purchase",
        "S" => "Sale",
        "E" => "Exchange",
        _ => "Unknown",
    }
}

/// Parse `$1,001 - $15,000`, `Over $1,000,000` or a single amount.
pub fn parse_amount_range(raw: &str) -> (Option<i64>, Option<i64>) {
    let raw = raw.trim();
    if raw.is_empty() {
        return (None, None);
    }

    let parts: Vec<&str> = raw.split('-').collect();
    if parts.len() == 2 {
        if let (Some(low), Some(high)) = (parse_amount(parts[0]), parse_amount(parts[1])) {
            return (Some(low), Some(high));
        }
    }

    if let Some(caps) = RE_OVER.captures(raw) {
        if let Some(low) = parse_amount(&caps[1]) {
            return (Some(low), None);
        }
    }

    match parse_amount(raw) {
        Some(value) => (Some(value), Some(value)),
        None => (None, None),
    }
}

fn parse_amount(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    cleaned.parse().ok()
}

fn is_date(value: &str) -> bool {
    RE_DATE.is_match(value)
}

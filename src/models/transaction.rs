use serde::{Deserialize, Serialize};

use super::filing::{FilingDescriptor, Office};

/// One transaction line as parsed from the text-extraction service reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LlmTransaction {
    pub owner_code: String,
    pub company_name: String,
    pub ticker: Option<String>,
    pub transaction_type_full: String,
    pub transaction_date_str: String,
    pub notification_date_str: String,
    pub amount_low: Option<i64>,
    pub amount_high: Option<i64>,
    pub raw_llm_line: String,
}

/// House rows arrive already mapped to store column names by the PDF processor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HouseRow {
    pub ticker: Option<String>,
    pub asset_name: Option<String>,
    pub transaction_type: Option<String>,
    pub transaction_date: Option<String>,
    pub amount_low: Option<i64>,
    pub amount_high: Option<i64>,
    pub owner: Option<String>,
    pub comment: Option<String>,
}

impl From<LlmTransaction> for HouseRow {
    fn from(line: LlmTransaction) -> Self {
        Self {
            ticker: line.ticker,
            asset_name: Some(line.company_name),
            transaction_type: Some(line.transaction_type_full),
            transaction_date: Some(line.transaction_date_str),
            amount_low: line.amount_low,
            amount_high: line.amount_high,
            owner: Some(line.owner_code),
            comment: Some(line.raw_llm_line),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RawTransactionRow {
    House(HouseRow),
    Senate(LlmTransaction),
}

/// A raw row carrying the metadata of the filing it was extracted from.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRow {
    pub doc_id: String,
    pub member_name: String,
    pub office: Office,
    pub pdf_url: String,
    pub row: RawTransactionRow,
}

impl TaggedRow {
    pub fn new(filing: &FilingDescriptor, row: RawTransactionRow) -> Self {
        Self {
            doc_id: filing.doc_id.clone(),
            member_name: filing.member_name.clone(),
            office: filing.office,
            pdf_url: filing.pdf_url.clone(),
            row,
        }
    }
}

/// The single transaction shape accepted by the persistence gateway.
///
/// Every field is always serialized; unmapped values are `null` so consumers
/// can rely on field presence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalTransaction {
    pub doc_id: String,
    pub member_name: String,
    pub office: Office,
    pub pdf_url: String,
    pub ticker: Option<String>,
    pub asset_name: Option<String>,
    pub transaction_type: Option<String>,
    pub transaction_date: Option<String>,
    pub amount_low: Option<i64>,
    pub amount_high: Option<i64>,
    pub owner: Option<String>,
    pub comment: String,
}

pub const CANONICAL_FIELDS: [&str; 12] = [
    "doc_id",
    "member_name",
    "office",
    "pdf_url",
    "ticker",
    "asset_name",
    "transaction_type",
    "transaction_date",
    "amount_low",
    "amount_high",
    "owner",
    "comment",
];

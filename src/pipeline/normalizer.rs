use crate::models::{CanonicalTransaction, RawTransactionRow, TaggedRow};

/// Map tagged rows of either source shape into canonical transactions.
///
/// Pure field mapping: values are neither validated nor converted.
pub fn normalize(rows: &[TaggedRow]) -> Vec<CanonicalTransaction> {
    rows.iter().map(normalize_row).collect()
}

fn normalize_row(tagged: &TaggedRow) -> CanonicalTransaction {
    let mut tx = CanonicalTransaction {
        doc_id: tagged.doc_id.clone(),
        member_name: tagged.member_name.clone(),
        office: tagged.office,
        pdf_url: tagged.pdf_url.clone(),
        ticker: None,
        asset_name: None,
        transaction_type: None,
        transaction_date: None,
        amount_low: None,
        amount_high: None,
        owner: None,
        comment: String::new(),
    };

    match &tagged.row {
        RawTransactionRow::House(row) => {
            tx.ticker = row.ticker.clone();
            tx.asset_name = row.asset_name.clone();
            tx.transaction_type = row.transaction_type.clone();
            tx.transaction_date = row.transaction_date.clone();
            tx.amount_low = row.amount_low;
            tx.amount_high = row.amount_high;
            tx.owner = row.owner.clone();
            tx.comment = row.comment.clone().unwrap_or_default();
        }
        RawTransactionRow::Senate(line) => {
            tx.ticker = line.ticker.clone();
            tx.asset_name = Some(line.company_name.clone());
            tx.transaction_type = Some(line.transaction_type_full.clone());
            tx.transaction_date = Some(line.transaction_date_str.clone());
            tx.amount_low = line.amount_low;
            tx.amount_high = line.amount_high;
            tx.owner = Some(line.owner_code.clone());
            tx.comment = line.raw_llm_line.clone();
        }
    }

    tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HouseRow, LlmTransaction, CANONICAL_FIELDS};
    use crate::testing::{house_filing, senate_filing};

    #[test]
    fn test_house_row_mapping() {
        let filing = house_filing("20024542");
        let row = HouseRow {
            ticker: Some("MSFT".to_string()),
            asset_name: Some("Microsoft Corporation".to_string()),
            transaction_type: Some("Purchase".to_string()),
            transaction_date: Some("01/02/2024".to_string()),
            amount_low: Some(1001),
            amount_high: Some(15000),
            owner: Some("SP".to_string()),
            comment: None,
        };
        let txs = normalize(&[TaggedRow::new(&filing, RawTransactionRow::House(row))]);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].doc_id, "20024542");
        assert_eq!(txs[0].ticker.as_deref(), Some("MSFT"));
        assert_eq!(txs[0].owner.as_deref(), Some("SP"));
        assert_eq!(txs[0].comment, "");
    }

    #[test]
    fn test_senate_row_mapping() {
        let filing = senate_filing("abc-123");
        let line = LlmTransaction {
            owner_code: "JT".to_string(),
            company_name: "Apple Inc".to_string(),
            ticker: Some("AAPL".to_string()),
            transaction_type_full: "Sale".to_string(),
            transaction_date_str: "02/03/2024".to_string(),
            notification_date_str: "02/10/2024".to_string(),
            amount_low: Some(15001),
            amount_high: Some(50000),
            raw_llm_line: "JT,Apple Inc (AAPL),S,02/03/2024,02/10/2024,$15,001 - $50,000".to_string(),
        };
        let txs = normalize(&[TaggedRow::new(&filing, RawTransactionRow::Senate(line))]);
        let tx = &txs[0];
        assert_eq!(tx.asset_name.as_deref(), Some("Apple Inc"));
        assert_eq!(tx.transaction_type.as_deref(), Some("Sale"));
        assert_eq!(tx.transaction_date.as_deref(), Some("02/03/2024"));
        assert_eq!(tx.owner.as_deref(), Some("JT"));
        assert!(tx.comment.starts_with("JT,Apple"));
    }

    #[test]
    fn test_every_canonical_field_is_present() {
        let filing = house_filing("1");
        let rows = vec![
            TaggedRow::new(&filing, RawTransactionRow::House(HouseRow::default())),
            TaggedRow::new(&filing, RawTransactionRow::Senate(LlmTransaction::default())),
        ];
        for tx in normalize(&rows) {
            let value = serde_json::to_value(&tx).unwrap();
            let object = value.as_object().unwrap();
            assert_eq!(object.len(), CANONICAL_FIELDS.len());
            for field in CANONICAL_FIELDS {
                assert!(object.contains_key(field), "missing field {field}");
            }
            assert!(object["ticker"].is_null());
        }
    }
}

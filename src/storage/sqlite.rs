use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{CanonicalTransaction, Office, WriteSummary};
use crate::storage::PersistenceGateway;

pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the store at `path`. Any failure to open or migrate
    /// it is reported as `StoreUnavailable`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let unavailable = |e: Error| Error::StoreUnavailable(format!("{}: {}", path.display(), e));

        let conn = Connection::open(path).map_err(|e| unavailable(e.into()))?;
        let storage = Self { conn };
        storage.init_db().map_err(unavailable)?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    fn init_db(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS members (
                member_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                chamber TEXT,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS filings (
                filing_id INTEGER PRIMARY KEY,
                member_id INTEGER NOT NULL REFERENCES members(member_id),
                doc_id TEXT NOT NULL UNIQUE,
                url TEXT NOT NULL,
                office TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS assets (
                asset_id INTEGER PRIMARY KEY,
                company_name TEXT NOT NULL,
                ticker TEXT NOT NULL DEFAULT '',
                UNIQUE(company_name, ticker)
            );

            CREATE TABLE IF NOT EXISTS transactions (
                transaction_id INTEGER PRIMARY KEY,
                filing_id INTEGER NOT NULL REFERENCES filings(filing_id),
                asset_id INTEGER NOT NULL REFERENCES assets(asset_id),
                owner_code TEXT NOT NULL DEFAULT '',
                transaction_type TEXT NOT NULL,
                transaction_date TEXT NOT NULL DEFAULT '',
                amount_range_low INTEGER,
                amount_range_high INTEGER,
                raw_llm_csv_line TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_transactions_identity ON transactions(
                filing_id, asset_id, owner_code, transaction_type, transaction_date,
                IFNULL(amount_range_low, -1), IFNULL(amount_range_high, -1), raw_llm_csv_line
            );
            CREATE INDEX IF NOT EXISTS idx_filings_member_id ON filings(member_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_asset_id ON transactions(asset_id);
            "#,
        )?;

        Ok(())
    }

    fn upsert_member(
        conn: &Connection,
        name: &str,
        office: Office,
        summary: &mut WriteSummary,
    ) -> Result<i64> {
        let inserted = conn.execute(
            "INSERT INTO members (name, chamber) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
            params![name, office.to_string()],
        )?;
        summary.members += inserted;

        Ok(conn.query_row(
            "SELECT member_id FROM members WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?)
    }

    fn upsert_filing(
        conn: &Connection,
        tx: &CanonicalTransaction,
        member_id: i64,
        summary: &mut WriteSummary,
    ) -> Result<i64> {
        let inserted = conn.execute(
            r#"
            INSERT INTO filings (member_id, doc_id, url, office)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(doc_id) DO NOTHING
            "#,
            params![member_id, tx.doc_id, tx.pdf_url, tx.office.to_string()],
        )?;
        summary.filings += inserted;

        Ok(conn.query_row(
            "SELECT filing_id FROM filings WHERE doc_id = ?1",
            params![tx.doc_id],
            |row| row.get(0),
        )?)
    }

    fn upsert_asset(
        conn: &Connection,
        company_name: &str,
        ticker: &str,
        summary: &mut WriteSummary,
    ) -> Result<i64> {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO assets (company_name, ticker) VALUES (?1, ?2)",
            params![company_name, ticker],
        )?;
        summary.assets += inserted;

        Ok(conn.query_row(
            "SELECT asset_id FROM assets WHERE company_name = ?1 AND ticker = ?2",
            params![company_name, ticker],
            |row| row.get(0),
        )?)
    }

    pub fn transaction_count(&self, doc_id: &str) -> Result<usize> {
        let count: Option<i64> = self
            .conn
            .query_row(
                r#"
                SELECT COUNT(*) FROM transactions t
                JOIN filings f ON t.filing_id = f.filing_id
                WHERE f.doc_id = ?1
                "#,
                params![doc_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.unwrap_or(0) as usize)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl PersistenceGateway for Storage {
    fn known_doc_ids(&self) -> Result<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT DISTINCT doc_id FROM filings")?;
        let ids = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let ids = ids.collect::<std::result::Result<HashSet<_>, _>>()?;
        tracing::info!("Found {} existing doc_ids in store", ids.len());
        Ok(ids)
    }

    fn write_batch(&self, transactions: &[CanonicalTransaction]) -> Result<WriteSummary> {
        let db = self.conn.unchecked_transaction()?;
        let mut summary = WriteSummary::default();

        for tx in transactions {
            let asset_name = non_empty(tx.asset_name.as_deref());
            let ticker = non_empty(tx.ticker.as_deref());
            let company_name = match (asset_name, ticker) {
                (Some(name), _) => name,
                (None, Some(ticker)) => ticker,
                (None, None) => {
                    tracing::warn!("[{}] Rejected transaction without asset: {}", tx.doc_id, tx.comment);
                    summary.rejected += 1;
                    continue;
                }
            };

            let member_name = non_empty(Some(tx.member_name.as_str())).unwrap_or("Unknown");
            let member_id = Self::upsert_member(&db, member_name, tx.office, &mut summary)?;
            let filing_id = Self::upsert_filing(&db, tx, member_id, &mut summary)?;
            let asset_id = Self::upsert_asset(&db, company_name, ticker.unwrap_or(""), &mut summary)?;

            let inserted = db.execute(
                r#"
                INSERT OR IGNORE INTO transactions (
                    filing_id, asset_id, owner_code, transaction_type, transaction_date,
                    amount_range_low, amount_range_high, raw_llm_csv_line
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    filing_id,
                    asset_id,
                    tx.owner.as_deref().unwrap_or(""),
                    non_empty(tx.transaction_type.as_deref()).unwrap_or("Unknown"),
                    tx.transaction_date.as_deref().unwrap_or(""),
                    tx.amount_low,
                    tx.amount_high,
                    tx.comment,
                ],
            )?;

            if inserted == 0 {
                summary.duplicates_skipped += 1;
            } else {
                summary.transactions_inserted += 1;
            }
        }

        db.commit()?;
        tracing::info!(
            "Stored {} transaction(s) across {} new filing(s); {} duplicate(s), {} rejected",
            summary.transactions_inserted,
            summary.filings,
            summary.duplicates_skipped,
            summary.rejected
        );
        Ok(summary)
    }
}

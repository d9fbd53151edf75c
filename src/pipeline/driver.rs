use std::collections::HashSet;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::extract::FilingExtractor;
use crate::models::{
    CanonicalTransaction, FilingDescriptor, FilingFailure, Office, RunOutcome, RunSummary,
    SourceReport,
};
use crate::pipeline::batch::extract_all;
use crate::pipeline::budget::{remaining_quota, Quota};
use crate::pipeline::dedup::filter_new;
use crate::pipeline::normalizer::normalize;
use crate::pipeline::snapshot::save_snapshot;
use crate::sources::{FilingSource, ScrapeRequest};
use crate::storage::PersistenceGateway;

/// A source paired with the extractor that reads its documents.
///
/// Without an extractor the source is still scraped and deduplicated, so
/// snapshots and counts are produced, but no filing is processed.
pub struct SourceStage {
    pub source: Box<dyn FilingSource>,
    pub extractor: Option<Box<dyn FilingExtractor>>,
}

impl SourceStage {
    pub fn new(source: impl FilingSource + 'static, extractor: impl FilingExtractor + 'static) -> Self {
        Self {
            source: Box::new(source),
            extractor: Some(Box::new(extractor)),
        }
    }

    pub fn scrape_only(source: impl FilingSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            extractor: None,
        }
    }

    fn can_extract(&self) -> bool {
        self.extractor.is_some()
    }
}

#[derive(Default)]
struct StageOutput {
    report: SourceReport,
    transactions: Vec<CanonicalTransaction>,
    failures: Vec<FilingFailure>,
}

pub struct PipelineDriver {
    config: PipelineConfig,
    house: Option<SourceStage>,
    senate: Option<SourceStage>,
    gateway: Box<dyn PersistenceGateway>,
}

impl PipelineDriver {
    pub fn new(config: PipelineConfig, gateway: impl PersistenceGateway + 'static) -> Self {
        Self {
            config,
            house: None,
            senate: None,
            gateway: Box::new(gateway),
        }
    }

    pub fn with_house(mut self, stage: SourceStage) -> Self {
        self.house = Some(stage);
        self
    }

    pub fn with_senate(mut self, stage: SourceStage) -> Self {
        self.senate = Some(stage);
        self
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        let overall = Quota::from_limit(self.config.limit as i64);
        let house = self.active_stage(Office::House);
        let senate = self.active_stage(Office::Senate);

        // Step 1: Scrape House. This happens before the known ids are read so the
        // snapshot reflects the portal even when the store turns out to be unreachable.
        let house_scraped = match house {
            Ok(stage) => {
                let filings = self.scrape(stage).await;
                if self.config.save_scrape_json {
                    match save_snapshot(&self.config.snapshot_dir, self.config.year, &filings) {
                        Ok(path) => tracing::info!("Saved House scrape to {}", path.display()),
                        Err(e) => tracing::error!("Failed to save House scrape snapshot: {}", e),
                    }
                }
                filings
            }
            Err(_) => Vec::new(),
        };

        // Step 2: Load the doc_ids already in the store
        let known = match self.gateway.known_doc_ids() {
            Ok(known) => known,
            Err(e) => {
                tracing::error!("Could not load existing doc_ids: {}", e);
                return Ok(RunOutcome::Aborted {
                    reason: format!("known doc_ids unavailable: {}", e),
                });
            }
        };

        // Step 3: Process new House filings
        let house_out = match house {
            Ok(stage) => self.process(stage, house_scraped, &known, overall).await,
            Err(reason) => skipped(reason),
        };

        // Step 4: Senate gets whatever House left of the limit
        let house_processed = house.is_ok_and(SourceStage::can_extract);
        let senate_quota = remaining_quota(overall, house_out.report.new_filings, house_processed);
        let senate_out = match senate {
            Ok(_) if senate_quota.is_exhausted() => {
                tracing::info!("Overall limit reached after House processing; skipping Senate");
                skipped("limit exhausted by House filings")
            }
            Ok(stage) => {
                let scraped = self.scrape(stage).await;
                self.process(stage, scraped, &known, senate_quota).await
            }
            Err(reason) => skipped(reason),
        };

        // Step 5: Combine both chambers
        let mut transactions = house_out.transactions;
        transactions.extend(senate_out.transactions);
        let mut failures = house_out.failures;
        failures.extend(senate_out.failures);

        let mut summary = RunSummary {
            dry_run: self.config.dry_run,
            transactions: transactions.len(),
            house: house_out.report,
            senate: senate_out.report,
            failures,
            write: None,
        };

        // Step 6: Persist, unless there is nothing to write or this is a dry run
        if transactions.is_empty() {
            tracing::info!("No new transactions to store");
            return Ok(RunOutcome::Completed(summary));
        }

        if self.config.dry_run {
            tracing::info!(
                "Dry run: {} transaction(s) would be stored. First:\n{}",
                transactions.len(),
                serde_json::to_string_pretty(&transactions[0])?
            );
            return Ok(RunOutcome::Completed(summary));
        }

        tracing::info!("Writing {} transaction(s) to store", transactions.len());
        summary.write = Some(self.gateway.write_batch(&transactions)?);
        Ok(RunOutcome::Completed(summary))
    }

    /// The stage for `office` when it is both enabled and built, or why it is not.
    fn active_stage(&self, office: Office) -> std::result::Result<&SourceStage, &'static str> {
        let (include, stage) = match office {
            Office::House => (self.config.include_house, self.house.as_ref()),
            Office::Senate => (self.config.include_senate, self.senate.as_ref()),
        };
        match (include, stage) {
            (false, _) => {
                tracing::info!("{} processing disabled", office);
                Err("disabled")
            }
            (true, None) => {
                tracing::warn!("{} processing enabled but its collaborators are unavailable", office);
                Err("unavailable")
            }
            (true, Some(stage)) => Ok(stage),
        }
    }

    async fn scrape(&self, stage: &SourceStage) -> Vec<FilingDescriptor> {
        let office = stage.source.office();
        let request = ScrapeRequest {
            year: self.config.year,
            max_pages: self.config.max_pages,
        };

        tracing::info!("Scraping {} filings for {}", office, self.config.year);
        match stage.source.scrape(&request).await {
            Ok(filings) => {
                tracing::info!("{} scrape returned {} filing(s)", office, filings.len());
                filings
            }
            Err(e) => {
                tracing::error!("{} scrape failed, continuing without it: {}", office, e);
                Vec::new()
            }
        }
    }

    async fn process(
        &self,
        stage: &SourceStage,
        scraped: Vec<FilingDescriptor>,
        known: &HashSet<String>,
        quota: Quota,
    ) -> StageOutput {
        let office = stage.source.office();
        let new_filings = filter_new(&scraped, known, quota.as_filter_limit());

        let Some(extractor) = stage.extractor.as_deref() else {
            tracing::warn!(
                "{}: no extractor available; {} new filing(s) left for a later run",
                office,
                new_filings.len()
            );
            return StageOutput {
                report: SourceReport {
                    scraped: scraped.len(),
                    new_filings: new_filings.len(),
                    skipped: Some("extractor unavailable".to_string()),
                    ..SourceReport::default()
                },
                ..StageOutput::default()
            };
        };

        let batch = extract_all(extractor, &new_filings).await;
        let transactions = normalize(&batch.rows);

        tracing::info!(
            "{}: {} new filing(s), {} transaction(s), {} failure(s)",
            office,
            new_filings.len(),
            transactions.len(),
            batch.failures.len()
        );

        StageOutput {
            report: SourceReport {
                scraped: scraped.len(),
                new_filings: new_filings.len(),
                failed_filings: batch.failures.len(),
                transactions: transactions.len(),
                skipped: None,
            },
            transactions,
            failures: batch.failures,
        }
    }
}

fn skipped(reason: &str) -> StageOutput {
    StageOutput {
        report: SourceReport {
            skipped: Some(reason.to_string()),
            ..SourceReport::default()
        },
        ..StageOutput::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        house_filing, house_row, senate_filing, MockExtractor, MockGateway, MockSource,
    };

    fn config(limit: usize) -> PipelineConfig {
        let mut config = PipelineConfig::new(2024);
        config.limit = limit;
        config
    }

    fn house_stage(ids: &[&str], extractor: MockExtractor) -> SourceStage {
        let filings = ids.iter().map(|id| house_filing(id)).collect();
        SourceStage::new(MockSource::new(Office::House, filings), extractor)
    }

    fn senate_stage(ids: &[&str], extractor: MockExtractor) -> SourceStage {
        let filings = ids.iter().map(|id| senate_filing(id)).collect();
        SourceStage::new(MockSource::new(Office::Senate, filings), extractor)
    }

    #[tokio::test]
    async fn test_full_run_writes_once() {
        let gateway = MockGateway::new(&[]);
        let house = MockExtractor::new().with_rows("h1", vec![house_row("AAPL")]);
        let senate = MockExtractor::new().with_rows("s1", vec![house_row("MSFT")]);

        let driver = PipelineDriver::new(config(10), gateway.clone())
            .with_house(house_stage(&["h1"], house))
            .with_senate(senate_stage(&["s1"], senate));

        let outcome = driver.run().await.unwrap();
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.transactions, 2);
        assert_eq!(summary.write.as_ref().unwrap().transactions_inserted, 2);

        let writes = gateway.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0][0].doc_id, "h1");
        assert_eq!(writes[0][1].doc_id, "s1");
    }

    #[tokio::test]
    async fn test_dry_run_never_writes() {
        let gateway = MockGateway::new(&[]);
        let mut config = config(10);
        config.dry_run = true;
        let extractor = MockExtractor::new().with_rows("h1", vec![house_row("AAPL")]);

        let driver = PipelineDriver::new(config, gateway.clone()).with_house(house_stage(&["h1"], extractor));

        let outcome = driver.run().await.unwrap();
        let summary = outcome.summary().unwrap();
        assert!(summary.dry_run);
        assert_eq!(summary.transactions, 1);
        assert!(summary.write.is_none());
        assert!(gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_store_aborts_before_extraction() {
        let extractor = MockExtractor::new().with_rows("h1", vec![house_row("AAPL")]);
        let driver = PipelineDriver::new(config(10), MockGateway::unreadable())
            .with_house(house_stage(&["h1"], extractor.clone()));

        let outcome = driver.run().await.unwrap();
        assert!(matches!(outcome, RunOutcome::Aborted { .. }));
        assert!(extractor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_known_filings_are_not_extracted() {
        let gateway = MockGateway::new(&["h1"]);
        let extractor = MockExtractor::new();
        let driver = PipelineDriver::new(config(0), gateway)
            .with_house(house_stage(&["h1", "h2", "h3"], extractor.clone()));

        let outcome = driver.run().await.unwrap();
        assert_eq!(extractor.calls(), vec!["h2", "h3"]);
        assert_eq!(outcome.summary().unwrap().house.new_filings, 2);
    }

    #[tokio::test]
    async fn test_senate_receives_remaining_quota() {
        let house_ids = ["h1", "h2", "h3", "h4"];
        let senate_ids = ["s1", "s2", "s3", "s4", "s5", "s6", "s7", "s8"];
        let senate = MockExtractor::new();

        let driver = PipelineDriver::new(config(10), MockGateway::new(&[]))
            .with_house(house_stage(&house_ids, MockExtractor::new()))
            .with_senate(senate_stage(&senate_ids, senate.clone()));

        let outcome = driver.run().await.unwrap();
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.house.new_filings, 4);
        assert_eq!(summary.senate.new_filings, 6);
        assert_eq!(senate.calls().len(), 6);
    }

    #[tokio::test]
    async fn test_exhausted_quota_skips_senate_scrape() {
        let source = MockSource::new(Office::Senate, vec![senate_filing("s1")]);
        let scrapes = source.scrape_counter();

        let driver = PipelineDriver::new(config(2), MockGateway::new(&[]))
            .with_house(house_stage(&["h1", "h2", "h3"], MockExtractor::new()))
            .with_senate(SourceStage::new(source, MockExtractor::new()));

        let outcome = driver.run().await.unwrap();
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.house.new_filings, 2);
        assert!(summary.senate.skipped.is_some());
        assert_eq!(*scrapes.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_disabled_house_leaves_full_quota() {
        let mut config = config(3);
        config.include_house = false;
        let senate = MockExtractor::new();

        let driver = PipelineDriver::new(config, MockGateway::new(&[]))
            .with_house(house_stage(&["h1"], MockExtractor::new()))
            .with_senate(senate_stage(&["s1", "s2", "s3", "s4"], senate.clone()));

        let outcome = driver.run().await.unwrap();
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.house.skipped.as_deref(), Some("disabled"));
        assert_eq!(senate.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_scrape_failure_degrades_to_empty() {
        let gateway = MockGateway::new(&[]);
        let senate = MockExtractor::new().with_rows("s1", vec![house_row("NVDA")]);

        let driver = PipelineDriver::new(config(10), gateway.clone())
            .with_house(SourceStage::new(MockSource::unreachable(Office::House), MockExtractor::new()))
            .with_senate(senate_stage(&["s1"], senate));

        let outcome = driver.run().await.unwrap();
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.house.scraped, 0);
        assert_eq!(summary.senate.transactions, 1);
        assert_eq!(gateway.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_no_transactions_completes_without_write() {
        let gateway = MockGateway::new(&[]);
        let driver = PipelineDriver::new(config(10), gateway.clone())
            .with_house(house_stage(&["h1"], MockExtractor::new().failing("h1")));

        let outcome = driver.run().await.unwrap();
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.transactions, 0);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.senate.skipped.as_deref(), Some("unavailable"));
        assert!(gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn test_house_without_extractor_still_scrapes_and_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(10);
        config.save_scrape_json = true;
        config.snapshot_dir = dir.path().to_path_buf();
        let gateway = MockGateway::new(&["h1"]);
        let senate = MockExtractor::new();

        let house_source = MockSource::new(Office::House, vec![house_filing("h1"), house_filing("h2")]);
        let driver = PipelineDriver::new(config, gateway.clone())
            .with_house(SourceStage::scrape_only(house_source))
            .with_senate(senate_stage(&["s1", "s2"], senate.clone()));

        let outcome = driver.run().await.unwrap();
        let summary = outcome.summary().unwrap();
        assert!(dir.path().join("house_scraped_filings_2024.json").exists());
        assert_eq!(summary.house.scraped, 2);
        assert_eq!(summary.house.new_filings, 1);
        assert_eq!(summary.house.skipped.as_deref(), Some("extractor unavailable"));
        // unprocessed House filings do not consume the Senate budget
        assert_eq!(senate.calls(), vec!["s1", "s2"]);
        assert!(gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_saved_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(10);
        config.save_scrape_json = true;
        config.snapshot_dir = dir.path().to_path_buf();
        config.include_senate = false;

        let driver = PipelineDriver::new(config, MockGateway::unreadable())
            .with_house(house_stage(&["h1"], MockExtractor::new()));

        let outcome = driver.run().await.unwrap();
        assert!(matches!(outcome, RunOutcome::Aborted { .. }));
        assert!(dir.path().join("house_scraped_filings_2024.json").exists());
    }
}

use std::sync::Arc;

use chrono::Datelike;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use ptrsync::extract::{HousePdfExtractor, SenateReportExtractor};
use ptrsync::http::{build_client, RateLimiter};
use ptrsync::models::RunOutcome;
use ptrsync::sources::{HouseSource, SenateSession, SenateSource};
use ptrsync::{
    Config, LLMProvider, OpenRouterProvider, PipelineConfig, PipelineDriver, SourceStage, Storage,
};

#[derive(Parser, Debug)]
#[command(name = "ptrsync")]
#[command(version = "0.1.0")]
#[command(about = "Collect congressional periodic transaction reports into a local store")]
struct Args {
    /// Filing year to scrape (defaults to the current year)
    #[arg(long)]
    year: Option<i32>,

    /// Accepted for compatibility; the session is always headless
    #[arg(long, default_value = "true", action = ArgAction::Set, value_parser = parse_flag)]
    headless: bool,

    /// Maximum number of new filings to process across both chambers (0 = no limit)
    #[arg(long, default_value = "10")]
    limit: usize,

    /// Maximum number of result pages to scrape per chamber (0 = all)
    #[arg(long, default_value = "0")]
    max_pages: u32,

    /// Process filings but do not write to the store
    #[arg(long)]
    dry_run: bool,

    /// Save the raw House scrape as JSON
    #[arg(long)]
    save_scrape_json: bool,

    /// Process House filings
    #[arg(long, default_value = "true", action = ArgAction::Set, value_parser = parse_flag)]
    house: bool,

    /// Process Senate filings
    #[arg(long, default_value = "true", action = ArgAction::Set, value_parser = parse_flag)]
    senate: bool,

    /// Database path (overrides DATABASE_PATH)
    #[arg(long)]
    database: Option<String>,
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("expected 'true' or 'false', got '{}'", other)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("ptrsync=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?;

    if !args.headless {
        tracing::warn!("--headless false has no effect; disclosure portals are read over plain HTTP");
    }

    let mut pipeline_config = PipelineConfig::from(&config);
    pipeline_config.year = args.year.unwrap_or_else(|| chrono::Utc::now().year());
    pipeline_config.limit = args.limit;
    pipeline_config.max_pages = (args.max_pages > 0).then_some(args.max_pages);
    pipeline_config.dry_run = args.dry_run;
    pipeline_config.save_scrape_json = args.save_scrape_json;
    pipeline_config.include_house = args.house;
    pipeline_config.include_senate = args.senate;

    let database = args.database.unwrap_or_else(|| config.database_path.clone());
    let storage = match Storage::new(&database) {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!("Could not open store at {}: {}", database, e);
            print_outcome(&RunOutcome::Aborted {
                reason: format!("store unavailable: {}", e),
            })?;
            return Ok(());
        }
    };

    // Each collaborator that fails to initialize only disables what needs it
    let llm: Option<Arc<dyn LLMProvider>> = match &config.openrouter_api_key {
        Some(key) => match OpenRouterProvider::new(
            key.clone(),
            Some(config.llm_model.clone()),
            config.http_timeout,
        ) {
            Ok(provider) => Some(Arc::new(provider)),
            Err(e) => {
                tracing::warn!("LLM provider could not be initialized: {}", e);
                None
            }
        },
        None => {
            tracing::warn!("OPENROUTER_API_KEY not set; filings will be scraped but not transcribed");
            None
        }
    };

    let mut driver = PipelineDriver::new(pipeline_config.clone(), storage);

    if pipeline_config.include_house {
        match build_client(config.http_timeout) {
            Ok(client) => {
                let clerk_limiter = RateLimiter::house_web();
                let source = HouseSource::new(client.clone(), clerk_limiter.clone());
                let stage = match &llm {
                    Some(llm) => SourceStage::new(
                        source,
                        HousePdfExtractor::new(client, llm.clone(), clerk_limiter),
                    ),
                    None => SourceStage::scrape_only(source),
                };
                driver = driver.with_house(stage);
            }
            Err(e) => tracing::warn!("House HTTP client could not be built: {}", e),
        }
    }

    if pipeline_config.include_senate {
        match SenateSession::open(config.http_timeout).await {
            Ok(session) => {
                let session = Arc::new(session);
                let source = SenateSource::new(session.clone());
                let stage = match &llm {
                    Some(llm) => {
                        SourceStage::new(source, SenateReportExtractor::new(session, llm.clone()))
                    }
                    None => SourceStage::scrape_only(source),
                };
                driver = driver.with_senate(stage);
            }
            Err(e) => tracing::warn!("Senate session could not be opened: {}", e),
        }
    }

    tracing::info!(
        "Starting run for {} (limit {}, dry run: {})",
        pipeline_config.year,
        pipeline_config.limit,
        pipeline_config.dry_run
    );
    let outcome = driver.run().await?;
    print_outcome(&outcome)?;

    Ok(())
}

fn print_outcome(outcome: &RunOutcome) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}

use clap::Parser;
use dotenv::dotenv;
use hodlhodl_scraper::config::{Cli, RunMode, Settings};
use hodlhodl_scraper::error::Result;
use hodlhodl_scraper::forwarder::IngestionClient;
use hodlhodl_scraper::offer_fetcher::HodlHodlClient;
use hodlhodl_scraper::orchestrator::Scraper;
use hodlhodl_scraper::rate_limit::FixedDelay;
use hodlhodl_scraper::task_runner::TokioTaskRunner;
use std::process::exit;
use std::sync::Arc;
use tracing::info;

fn build_scraper(settings: &Settings) -> Result<Scraper> {
    let timeout = settings.http_timeout();
    let marketplace = HodlHodlClient::new(settings.hodlhodl_url()?, timeout, &settings.user_agent)?;
    let ingestion = IngestionClient::new(settings.api_url()?, timeout, &settings.user_agent)?;
    let throttle = FixedDelay::new(settings.rate_limit());

    Ok(Scraper::new(
        Arc::new(marketplace),
        Arc::new(ingestion),
        Arc::new(throttle),
    ))
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };

    let scraper = match build_scraper(&settings) {
        Ok(scraper) => scraper,
        Err(e) => {
            eprintln!("Failed to set up scraper: {}", e);
            exit(1);
        }
    };

    match cli.mode {
        RunMode::Sync => {
            let tally = scraper.run().await;
            info!(forwarded = tally.offers_forwarded, "Done");
        }
        RunMode::Tasks => {
            let tally = scraper.run_tasks(&TokioTaskRunner, cli.task_completion).await;
            info!(
                completed = tally.pairs_completed,
                offers = tally.offers_fetched,
                "Done"
            );
        }
        RunMode::Sample => match scraper.run_sample().await {
            Some(report) => info!(?report, "Sample done"),
            None => info!("Sample produced no offers"),
        },
    }
}

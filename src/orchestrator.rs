use crate::config::TaskCompletion;
use crate::forwarder::{Forwarder, Ingestion};
use crate::normalization::{normalize_offer, normalize_seller};
use crate::offer_fetcher::Marketplace;
use crate::rate_limit::Throttle;
use crate::shared_types::{CurrencyCode, PairReport, RawOffer, RunTally, ScraperName, TradingSide};
use crate::task_runner::TaskRunner;
use futures::FutureExt;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Drives currency discovery and the fetch → normalize → forward pipeline.
///
/// Every network failure is logged and turned into "no result" at the call
/// site; nothing is retried and nothing escapes a run.
#[derive(Clone)]
pub struct Scraper {
    name: ScraperName,
    marketplace: Arc<dyn Marketplace>,
    forwarder: Forwarder,
    throttle: Arc<dyn Throttle>,
}

impl Scraper {
    pub fn new(
        marketplace: Arc<dyn Marketplace>,
        ingestion: Arc<dyn Ingestion>,
        throttle: Arc<dyn Throttle>,
    ) -> Self {
        Self {
            name: ScraperName::HodlHodl,
            marketplace,
            forwarder: Forwarder::new(ingestion),
            throttle,
        }
    }

    /// An unreachable or malformed currency list yields no currencies.
    pub async fn list_currencies(&self) -> Vec<CurrencyCode> {
        match self.marketplace.currencies().await {
            Ok(currencies) => {
                info!(scraper = %self.name, count = currencies.len(), "Fetched currency list");
                currencies
            }
            Err(e) => {
                error!(scraper = %self.name, error = %e, "Error fetching currency list");
                Vec::new()
            }
        }
    }

    /// `None` means the request failed, as opposed to an empty page.
    pub async fn fetch_offers(&self, currency: &str, side: TradingSide) -> Option<Vec<RawOffer>> {
        match self.marketplace.offers(currency, side).await {
            Ok(offers) => Some(offers),
            Err(e) => {
                error!(%currency, %side, error = %e, "Error fetching offers");
                None
            }
        }
    }

    /// Fetches one pair and forwards each offer in response order.
    pub async fn scrape_pair(&self, currency: &str, side: TradingSide) -> Option<PairReport> {
        let offers = self.fetch_offers(currency, side).await?;

        let mut report = PairReport {
            currency: currency.to_string(),
            side,
            fetched: offers.len(),
            forwarded: 0,
            failed: 0,
        };

        for raw in &offers {
            let offer = normalize_offer(raw);
            let seller = normalize_seller(raw);
            if self.forwarder.forward(seller, offer).await {
                report.forwarded += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            %currency,
            %side,
            fetched = report.fetched,
            forwarded = report.forwarded,
            failed = report.failed,
            "Scraped offers"
        );
        Some(report)
    }

    /// Synchronous run over every currency and side, pausing once per currency.
    pub async fn run(&self) -> RunTally {
        let mut tally = RunTally::new(self.name);
        let currencies = self.list_currencies().await;
        tally.currencies = currencies.len();

        for currency in &currencies {
            for side in TradingSide::ALL {
                tally.pairs_attempted += 1;
                match self.scrape_pair(currency, side).await {
                    Some(report) => tally.record_pair(&report),
                    None => tally.record_failure(),
                }
            }
            self.throttle.pause().await;
        }

        info!(scraper = %self.name, ?tally, "Run finished");
        tally
    }

    /// Submits each pair to `runner` and awaits it before moving on.
    ///
    /// With `TaskCompletion::FirstSuccess` the run stops right after the
    /// first pair that completes, leaving the remaining pairs unscraped.
    pub async fn run_tasks(&self, runner: &dyn TaskRunner, completion: TaskCompletion) -> RunTally {
        let mut tally = RunTally::new(self.name);
        let currencies = self.list_currencies().await;
        tally.currencies = currencies.len();

        for currency in &currencies {
            for side in TradingSide::ALL {
                tally.pairs_attempted += 1;

                let task_name = format!("get {} offers {} {}", self.name, currency, side);
                let scraper = self.clone();
                let unit_currency = currency.clone();
                let unit = async move { scraper.scrape_pair(&unit_currency, side).await }.boxed();

                let handle = runner.submit(&task_name, unit);
                debug!(task = handle.name(), "Submitted task");
                let report = match handle.wait().await.into_report(&task_name) {
                    Ok(report) => report,
                    Err(e) => {
                        error!(%currency, %side, error = %e, "Task failed");
                        tally.record_failure();
                        continue;
                    }
                };

                tally.record_pair(&report);
                debug!(task = %task_name, offers = report.fetched, "Task completed");

                if completion == TaskCompletion::FirstSuccess {
                    warn!(
                        scraper = %self.name,
                        offers = tally.offers_fetched,
                        "Stopping after first completed task"
                    );
                    return tally;
                }
            }
            self.throttle.pause().await;
        }

        info!(scraper = %self.name, ?tally, "Task run finished");
        tally
    }

    /// Scrapes the sell side of one randomly chosen currency.
    pub async fn run_sample(&self) -> Option<PairReport> {
        let currencies = self.list_currencies().await;
        let currency = {
            let mut rng = rand::thread_rng();
            currencies.choose(&mut rng).cloned()
        };

        match currency {
            Some(currency) => self.scrape_pair(&currency, TradingSide::Sell).await,
            None => {
                warn!(scraper = %self.name, "No currencies to sample");
                None
            }
        }
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Fiat currency code as the marketplace reports it, e.g. "USD".
pub type CurrencyCode = String;

pub const SITE_NAME: &str = "hodlhodl";
pub const COIN_CURRENCY: &str = "bitcoin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScraperName {
    HodlHodl,
}

impl ScraperName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScraperName::HodlHodl => "hodlhodl",
        }
    }
}

impl fmt::Display for ScraperName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradingSide {
    Buy,
    Sell,
}

impl TradingSide {
    /// Every currency is scraped in this order.
    pub const ALL: [TradingSide; 2] = [TradingSide::Buy, TradingSide::Sell];

    pub fn as_str(&self) -> &'static str {
        match self {
            TradingSide::Buy => "buy",
            TradingSide::Sell => "sell",
        }
    }
}

impl fmt::Display for TradingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct RawPaymentMethod {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Any trader field may come back as `null` for thin profiles.
#[derive(Deserialize, Debug, Clone)]
pub struct RawTrader {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub trades_count: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// One listing from `GET offers`. Amounts stay as the text the API sent.
///
/// Only `id`, `side` and `trader` are required; a `null` anywhere else must
/// not reject the page the offer came in.
#[derive(Deserialize, Debug, Clone)]
pub struct RawOffer {
    #[serde(deserialize_with = "opaque_string")]
    pub id: String,
    #[serde(default)]
    pub asset_code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    pub side: String,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub payment_methods: Vec<RawPaymentMethod>,
    // description and price are not part of the ingestion schema
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default, deserialize_with = "optional_opaque_string")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "optional_opaque_string")]
    pub min_amount: Option<String>,
    #[serde(default, deserialize_with = "optional_opaque_string")]
    pub max_amount: Option<String>,
    pub trader: RawTrader,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NormalizedOffer {
    pub offer_identifier: String,
    pub trading_type_name: String,
    pub trading_type_slug: String,
    pub coin_currency: String,
    pub fiat_currency: Option<String>,
    pub currency_code: Option<String>,
    pub payment_method_name: Option<String>,
    pub payment_method_slug: Option<String>,
    pub country_code: Option<String>,
    pub min_trade_size: Option<String>,
    pub max_trade_size: Option<String>,
    pub margin_percentage: f64,
    pub site_name: String,
    pub headline: String,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeedbackType {
    Score,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NormalizedSeller {
    pub username: Option<String>,
    pub feedback_type: FeedbackType,
    pub feedback_score: f64,
    pub completed_trades: Option<u64>,
    pub seller_url: Option<String>,
    pub profile_image: String,
    pub trade_volume: u64,
}

/// Outcome of scraping a single (currency, side) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairReport {
    pub currency: CurrencyCode,
    pub side: TradingSide,
    pub fetched: usize,
    pub forwarded: usize,
    pub failed: usize,
}

/// Aggregate of one scraper run, returned instead of a process-wide counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTally {
    pub scraper: ScraperName,
    pub currencies: usize,
    pub pairs_attempted: usize,
    pub pairs_completed: usize,
    pub pairs_failed: usize,
    pub offers_fetched: usize,
    pub offers_forwarded: usize,
    pub offers_failed: usize,
}

impl RunTally {
    pub fn new(scraper: ScraperName) -> Self {
        Self {
            scraper,
            currencies: 0,
            pairs_attempted: 0,
            pairs_completed: 0,
            pairs_failed: 0,
            offers_fetched: 0,
            offers_forwarded: 0,
            offers_failed: 0,
        }
    }

    pub fn record_pair(&mut self, report: &PairReport) {
        self.pairs_completed += 1;
        self.offers_fetched += report.fetched;
        self.offers_forwarded += report.forwarded;
        self.offers_failed += report.failed;
    }

    pub fn record_failure(&mut self) {
        self.pairs_failed += 1;
    }
}

// The API is inconsistent about quoting numbers, so accept both and keep the text.
fn opaque_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_opaque_string(deserializer)?.unwrap_or_default())
}

fn optional_opaque_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    // An unreadable rating is treated as no rating.
    let rating = match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(rating)
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

use crate::error::{Result, ScraperError};
use crate::shared_types::{CurrencyCode, RawOffer, TradingSide};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_MARKETPLACE_URL: &str = "https://hodlhodl.com/api/frontend/";

// Only the first page is ever requested.
pub const OFFERS_PAGE_LIMIT: u32 = 100;
pub const OFFERS_PAGE_OFFSET: u32 = 0;

#[derive(Deserialize, Debug)]
struct ApiCurrency {
    code: CurrencyCode,
}

#[derive(Deserialize, Debug)]
struct CurrenciesResponse {
    currencies: Vec<ApiCurrency>,
}

#[derive(Deserialize, Debug)]
struct OffersResponse {
    #[serde(default)]
    offers: Option<Vec<RawOffer>>,
}

/// Read side of the P2P marketplace.
#[async_trait]
pub trait Marketplace: Send + Sync {
    /// Currency codes in the order the marketplace lists them.
    async fn currencies(&self) -> Result<Vec<CurrencyCode>>;

    /// First page of offers for one currency and side.
    async fn offers(&self, currency: &str, side: TradingSide) -> Result<Vec<RawOffer>>;
}

pub struct HodlHodlClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HodlHodlClient {
    pub fn new(base_url: Url, timeout: Duration, user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: with_trailing_slash(base_url),
        }
    }

    pub fn currencies_url(&self) -> Result<Url> {
        Ok(self.base_url.join("currencies")?)
    }

    pub fn offers_url(&self, currency: &str, side: TradingSide) -> Result<Url> {
        let mut url = self.base_url.join("offers")?;
        url.query_pairs_mut()
            .append_pair("filters[currency_code]", currency)
            .append_pair("pagination[offset]", &OFFERS_PAGE_OFFSET.to_string())
            .append_pair("filters[side]", side.as_str())
            .append_pair("facets[show_empty_rest]", "true")
            .append_pair("facets[only]", "false")
            .append_pair("pagination[limit]", &OFFERS_PAGE_LIMIT.to_string());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Status {
                status,
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Marketplace for HodlHodlClient {
    async fn currencies(&self) -> Result<Vec<CurrencyCode>> {
        let response: CurrenciesResponse = self.get_json(self.currencies_url()?).await?;
        Ok(response.currencies.into_iter().map(|c| c.code).collect())
    }

    async fn offers(&self, currency: &str, side: TradingSide) -> Result<Vec<RawOffer>> {
        let response: OffersResponse = self.get_json(self.offers_url(currency, side)?).await?;
        Ok(response.offers.unwrap_or_default())
    }
}

/// `Url::join` drops the last path segment unless the base ends in '/'.
pub fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HodlHodlClient {
        HodlHodlClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://hodlhodl.com/api/frontend").unwrap(),
        )
    }

    #[test]
    fn test_currencies_url_keeps_base_path() {
        assert_eq!(
            client().currencies_url().unwrap().as_str(),
            "https://hodlhodl.com/api/frontend/currencies"
        );
    }

    #[test]
    fn test_offers_url_requests_first_page_only() {
        let url = client().offers_url("USD", TradingSide::Buy).unwrap();
        assert_eq!(url.path(), "/api/frontend/offers");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("filters[currency_code]".to_string(), "USD".to_string()),
                ("pagination[offset]".to_string(), "0".to_string()),
                ("filters[side]".to_string(), "buy".to_string()),
                ("facets[show_empty_rest]".to_string(), "true".to_string()),
                ("facets[only]".to_string(), "false".to_string()),
                ("pagination[limit]".to_string(), "100".to_string()),
            ]
        );
    }
}

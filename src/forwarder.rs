use crate::error::{Result, ScraperError};
use crate::normalization::routing_country_code;
use crate::offer_fetcher::with_trailing_slash;
use crate::shared_types::{NormalizedOffer, NormalizedSeller};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

pub const CREATE_OFFER_ENDPOINT: &str = "local_traders/create_offer";

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CreateOfferBody {
    pub user: NormalizedSeller,
    pub offer: NormalizedOffer,
}

/// Query parameters the ingestion API routes an offer by. `None` values are left out.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RoutingParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_slug: Option<String>,
}

impl RoutingParams {
    pub fn from_offer(offer: &NormalizedOffer) -> Self {
        Self {
            country_code: offer
                .country_code
                .as_deref()
                .map(|cc| routing_country_code(cc).to_string()),
            payment_method: offer.payment_method_name.clone(),
            payment_method_slug: offer.payment_method_slug.clone(),
        }
    }
}

/// Write side: the internal ingestion API.
#[async_trait]
pub trait Ingestion: Send + Sync {
    async fn create_offer(
        &self,
        body: &CreateOfferBody,
        params: &RoutingParams,
    ) -> Result<serde_json::Value>;
}

pub struct IngestionClient {
    http: reqwest::Client,
    base_url: Url,
}

impl IngestionClient {
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

    pub fn create_offer_url(&self) -> Result<Url> {
        Ok(self.base_url.join(CREATE_OFFER_ENDPOINT)?)
    }
}

#[async_trait]
impl Ingestion for IngestionClient {
    async fn create_offer(
        &self,
        body: &CreateOfferBody,
        params: &RoutingParams,
    ) -> Result<serde_json::Value> {
        let url = self.create_offer_url()?;
        let response = self
            .http
            .post(url.clone())
            .query(params)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Status {
                status,
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Sends normalized pairs downstream, one request per offer, never retrying.
#[derive(Clone)]
pub struct Forwarder {
    ingestion: Arc<dyn Ingestion>,
}

impl Forwarder {
    pub fn new(ingestion: Arc<dyn Ingestion>) -> Self {
        Self { ingestion }
    }

    /// Returns `false` when the offer could not be delivered; the error is logged here.
    pub async fn forward(&self, seller: NormalizedSeller, offer: NormalizedOffer) -> bool {
        let params = RoutingParams::from_offer(&offer);
        let body = CreateOfferBody {
            user: seller,
            offer,
        };

        match self.ingestion.create_offer(&body, &params).await {
            Ok(response) => {
                debug!(
                    offer_id = %body.offer.offer_identifier,
                    %response,
                    "offer forwarded"
                );
                true
            }
            Err(e) => {
                error!(
                    offer_id = %body.offer.offer_identifier,
                    country_code = ?params.country_code,
                    error = %e,
                    "Error posting offer to ingestion API"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_types::FeedbackType;
    use serde_json::json;
    use std::sync::Mutex;

    fn offer(country_code: &str, payment_method: Option<&str>) -> NormalizedOffer {
        NormalizedOffer {
            offer_identifier: "42".to_string(),
            trading_type_name: "buy".to_string(),
            trading_type_slug: "buy".to_string(),
            coin_currency: "bitcoin".to_string(),
            fiat_currency: Some("BTC".to_string()),
            currency_code: Some("USD".to_string()),
            payment_method_name: payment_method.map(str::to_string),
            payment_method_slug: payment_method.map(str::to_string),
            country_code: Some(country_code.to_string()),
            min_trade_size: Some("10".to_string()),
            max_trade_size: Some("20".to_string()),
            margin_percentage: 0.0,
            site_name: "hodlhodl".to_string(),
            headline: String::new(),
        }
    }

    fn seller() -> NormalizedSeller {
        NormalizedSeller {
            username: Some("alice".to_string()),
            feedback_type: FeedbackType::Score,
            feedback_score: 0.0,
            completed_trades: Some(3),
            seller_url: Some("u".to_string()),
            profile_image: String::new(),
            trade_volume: 0,
        }
    }

    #[derive(Default)]
    struct RecordingIngestion {
        fail: bool,
        calls: Mutex<Vec<(CreateOfferBody, RoutingParams)>>,
    }

    #[async_trait]
    impl Ingestion for RecordingIngestion {
        async fn create_offer(
            &self,
            body: &CreateOfferBody,
            params: &RoutingParams,
        ) -> Result<serde_json::Value> {
            self.calls
                .lock()
                .unwrap()
                .push((body.clone(), params.clone()));
            if self.fail {
                Err(ScraperError::Task {
                    name: "post".to_string(),
                    reason: "connection refused".to_string(),
                })
            } else {
                Ok(json!({ "status": "ok" }))
            }
        }
    }

    #[test]
    fn test_routing_params_from_offer() {
        let params = RoutingParams::from_offer(&offer("Global", Some("SEPA")));
        assert_eq!(params.country_code.as_deref(), Some("GL"));
        assert_eq!(params.payment_method.as_deref(), Some("SEPA"));
        assert_eq!(params.payment_method_slug.as_deref(), Some("SEPA"));

        let params = RoutingParams::from_offer(&offer("DE", None));
        assert_eq!(params.country_code.as_deref(), Some("DE"));
        assert_eq!(params.payment_method, None);
        assert_eq!(params.payment_method_slug, None);
    }

    #[test]
    fn test_routing_params_without_country() {
        let mut offer = offer("US", None);
        offer.country_code = None;

        let params = RoutingParams::from_offer(&offer);
        assert_eq!(params.country_code, None);
    }

    #[test]
    fn test_body_serialization() {
        let body = CreateOfferBody {
            user: seller(),
            offer: offer("Global", None),
        };
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["user"]["username"], "alice");
        assert_eq!(value["user"]["feedback_type"], "SCORE");
        assert_eq!(value["user"]["feedback_score"], 0.0);
        assert_eq!(value["offer"]["offer_identifier"], "42");
        assert_eq!(value["offer"]["country_code"], "Global");
        assert!(value["offer"]["payment_method_name"].is_null());
    }

    #[tokio::test]
    async fn test_forward_success() {
        let ingestion = Arc::new(RecordingIngestion::default());
        let forwarder = Forwarder::new(ingestion.clone());

        assert!(forwarder.forward(seller(), offer("Global", None)).await);

        let calls = ingestion.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.country_code.as_deref(), Some("GL"));
        assert_eq!(calls[0].0.offer.country_code.as_deref(), Some("Global"));
    }

    #[tokio::test]
    async fn test_forward_failure_is_reported_not_raised() {
        let ingestion = Arc::new(RecordingIngestion {
            fail: true,
            ..Default::default()
        });
        let forwarder = Forwarder::new(ingestion.clone());

        assert!(!forwarder.forward(seller(), offer("US", None)).await);
        assert_eq!(ingestion.calls.lock().unwrap().len(), 1);
    }
}

use super::shared_types::{
    FeedbackType, NormalizedOffer, NormalizedSeller, RawOffer, COIN_CURRENCY, SITE_NAME,
};

/// Maps a marketplace offer onto the canonical offer record.
pub fn normalize_offer(offer: &RawOffer) -> NormalizedOffer {
    let payment_method = first_payment_method(offer);

    NormalizedOffer {
        offer_identifier: offer.id.clone(),
        trading_type_name: offer.side.clone(),
        trading_type_slug: offer.side.clone(),
        coin_currency: COIN_CURRENCY.to_string(),
        fiat_currency: offer.asset_code.clone(),
        currency_code: offer.currency_code.clone(),
        payment_method_name: payment_method.clone(),
        payment_method_slug: payment_method,
        country_code: offer.country_code.clone(),
        min_trade_size: offer.min_amount.clone(),
        max_trade_size: offer.max_amount.clone(),
        margin_percentage: 0.0,
        site_name: SITE_NAME.to_string(),
        headline: String::new(),
    }
}

/// Maps the trader embedded in an offer onto the canonical seller record.
pub fn normalize_seller(offer: &RawOffer) -> NormalizedSeller {
    let trader = &offer.trader;

    NormalizedSeller {
        username: trader.login.clone(),
        feedback_type: FeedbackType::Score,
        feedback_score: feedback_score(trader.rating),
        completed_trades: trader.trades_count,
        seller_url: trader.url.clone(),
        profile_image: String::new(),
        trade_volume: 0,
    }
}

/// The ingestion API knows worldwide offers as "GL".
pub fn routing_country_code(country_code: &str) -> &str {
    if country_code == "Global" {
        "GL"
    } else {
        country_code
    }
}

fn first_payment_method(offer: &RawOffer) -> Option<String> {
    offer.payment_methods.first().and_then(|pm| pm.kind.clone())
}

fn feedback_score(rating: Option<f64>) -> f64 {
    match rating {
        Some(r) if r.is_finite() && r > 0.0 => r,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_types::{RawPaymentMethod, RawTrader};
    use rstest::rstest;

    fn raw_offer(country_code: &str, payment_methods: Vec<&str>, rating: Option<f64>) -> RawOffer {
        RawOffer {
            id: "42".to_string(),
            asset_code: Some("BTC".to_string()),
            country_code: Some(country_code.to_string()),
            side: "sell".to_string(),
            payment_methods: payment_methods
                .into_iter()
                .map(|kind| RawPaymentMethod {
                    kind: Some(kind.to_string()),
                })
                .collect(),
            description: Some("fast release".to_string()),
            currency_code: Some("USD".to_string()),
            price: Some("61000.12".to_string()),
            min_amount: Some("100".to_string()),
            max_amount: Some("2500.50".to_string()),
            trader: RawTrader {
                login: Some("alice".to_string()),
                rating,
                trades_count: Some(3),
                url: Some("u".to_string()),
            },
        }
    }

    #[test]
    fn test_normalize_offer_fields() {
        let offer = normalize_offer(&raw_offer("US", vec!["SEPA", "Revolut"], Some(0.9)));

        assert_eq!(offer.offer_identifier, "42");
        assert_eq!(offer.trading_type_name, "sell");
        assert_eq!(offer.trading_type_slug, "sell");
        assert_eq!(offer.coin_currency, "bitcoin");
        assert_eq!(offer.fiat_currency.as_deref(), Some("BTC"));
        assert_eq!(offer.currency_code.as_deref(), Some("USD"));
        assert_eq!(offer.payment_method_name.as_deref(), Some("SEPA"));
        assert_eq!(offer.payment_method_slug.as_deref(), Some("SEPA"));
        assert_eq!(offer.country_code.as_deref(), Some("US"));
        assert_eq!(offer.min_trade_size.as_deref(), Some("100"));
        assert_eq!(offer.max_trade_size.as_deref(), Some("2500.50"));
        assert_eq!(offer.margin_percentage, 0.0);
        assert_eq!(offer.site_name, "hodlhodl");
        assert_eq!(offer.headline, "");
    }

    #[test]
    fn test_no_payment_methods_leaves_both_fields_absent() {
        let offer = normalize_offer(&raw_offer("US", vec![], None));
        assert_eq!(offer.payment_method_name, None);
        assert_eq!(offer.payment_method_slug, None);
    }

    #[test]
    fn test_global_kept_in_normalized_record() {
        let offer = normalize_offer(&raw_offer("Global", vec![], None));
        assert_eq!(offer.country_code.as_deref(), Some("Global"));
    }

    #[rstest]
    #[case(None, 0.0)]
    #[case(Some(0.0), 0.0)]
    #[case(Some(-1.0), 0.0)]
    #[case(Some(f64::NAN), 0.0)]
    #[case(Some(0.97), 0.97)]
    #[case(Some(5.0), 5.0)]
    fn test_feedback_score(#[case] rating: Option<f64>, #[case] expected: f64) {
        let seller = normalize_seller(&raw_offer("US", vec![], rating));
        assert_eq!(seller.feedback_score, expected);
    }

    #[test]
    fn test_normalize_seller_fields() {
        let seller = normalize_seller(&raw_offer("US", vec![], None));
        assert_eq!(seller.username.as_deref(), Some("alice"));
        assert_eq!(seller.completed_trades, Some(3));
        assert_eq!(seller.seller_url.as_deref(), Some("u"));
        assert_eq!(seller.profile_image, "");
        assert_eq!(seller.trade_volume, 0);
        assert_eq!(seller.feedback_type, FeedbackType::Score);
    }

    #[test]
    fn test_null_trader_fields_pass_through() {
        let mut raw = raw_offer("US", vec![], Some(0.5));
        raw.trader.trades_count = None;
        raw.trader.url = None;
        raw.country_code = None;

        let seller = normalize_seller(&raw);
        assert_eq!(seller.completed_trades, None);
        assert_eq!(seller.seller_url, None);
        assert_eq!(seller.feedback_score, 0.5);
        assert_eq!(normalize_offer(&raw).country_code, None);
    }

    #[test]
    fn test_payment_method_without_type() {
        let mut raw = raw_offer("US", vec![], None);
        raw.payment_methods = vec![RawPaymentMethod { kind: None }];

        let offer = normalize_offer(&raw);
        assert_eq!(offer.payment_method_name, None);
        assert_eq!(offer.payment_method_slug, None);
    }

    #[rstest]
    #[case("Global", "GL")]
    #[case("GL", "GL")]
    #[case("US", "US")]
    #[case("global", "global")]
    #[case("", "")]
    fn test_routing_country_code(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(routing_country_code(input), expected);
    }
}

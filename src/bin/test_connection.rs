use dotenv::dotenv;
use hodlhodl_scraper::config::Settings;
use hodlhodl_scraper::offer_fetcher::{HodlHodlClient, Marketplace};
use hodlhodl_scraper::shared_types::TradingSide;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let settings = Settings::from_env()?;

    println!("Connecting to {}...", settings.hodlhodl_url);
    let client = HodlHodlClient::new(
        settings.hodlhodl_url()?,
        settings.http_timeout(),
        &settings.user_agent,
    )?;

    let currencies = client.currencies().await?;
    println!("✅ Connection Successful. {} currencies listed.", currencies.len());

    if let Some(currency) = currencies.first() {
        for side in TradingSide::ALL {
            let offers = client.offers(currency, side).await?;
            println!("✅ {} {}: {} offers on first page", currency, side, offers.len());
        }
    }

    println!("Ingestion API: {}", settings.api_url()?);

    Ok(())
}

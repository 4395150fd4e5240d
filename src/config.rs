//! Configuration for the scraper.
//!
//! Connection details come from the environment (optionally a `.env` file),
//! run mode from the command line.

use crate::error::Result;
use crate::offer_fetcher::DEFAULT_MARKETPLACE_URL;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Environment configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Base URL of the internal ingestion API
    pub api_url: String,

    /// Base URL of the HodlHodl frontend API
    #[serde(default = "default_hodlhodl_url")]
    pub hodlhodl_url: String,

    /// Pause after each currency, in milliseconds
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,

    /// Per-request timeout for both APIs
    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_hodlhodl_url() -> String {
    DEFAULT_MARKETPLACE_URL.to_string()
}

fn default_rate_limit_ms() -> u64 {
    1000
}

fn default_http_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    "HodlHodlScraper/1.0".to_string()
}

impl Settings {
    /// Load settings from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(envy::from_env()?)
    }

    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter(vars)?)
    }

    pub fn api_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.api_url)?)
    }

    pub fn hodlhodl_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.hodlhodl_url)?)
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RunMode {
    /// Scrape every (currency, side) pair in-process
    #[default]
    Sync,
    /// Submit each pair as a task and await it
    Tasks,
    /// Scrape the sell side of one random currency
    Sample,
}

/// When a task-mode run stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TaskCompletion {
    /// Process every pair, like the synchronous mode
    #[default]
    FullSweep,
    /// Stop after the first pair that completes successfully
    FirstSuccess,
}

#[derive(Debug, Parser)]
#[command(name = "hodlhodl-scraper")]
#[command(about = "Scrapes HodlHodl P2P offers and forwards them to the ingestion API")]
pub struct Cli {
    #[arg(long, value_enum, default_value_t = RunMode::Sync)]
    pub mode: RunMode,

    #[arg(long, value_enum, default_value_t = TaskCompletion::FullSweep)]
    pub task_completion: TaskCompletion,
}

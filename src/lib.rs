pub mod config;
pub mod error;
pub mod forwarder;
pub mod normalization;
pub mod offer_fetcher;
pub mod orchestrator;
pub mod rate_limit;
pub mod shared_types;
pub mod task_runner;

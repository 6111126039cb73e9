//! Prometheus metrics for the token facade and its backend.

pub mod config;
pub mod counters;
pub mod histograms;
pub mod server;

pub use config::MetricsConfig;
pub use server::MetricsServer;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Server error: {0}")]
    Server(String),

    #[error("Recorder error: {0}")]
    Recorder(String),
}

pub type Result<T> = std::result::Result<T, MetricsError>;

/// Register metric descriptions with the installed recorder
pub fn describe() {
    counters::init();
    histograms::init();
}

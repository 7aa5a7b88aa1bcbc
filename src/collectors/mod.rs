// Listing source pipeline: URL building, transport, HTML extraction and
// the paginating fetch loop that ties them together.

pub mod linkedin;
pub mod parser;
pub mod runner;
pub mod user_agent;

use async_trait::async_trait;

use crate::error::FetchError;

/// Raw response of a single GET against the listing source.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Issues one GET request. Implementations apply their own timeout and
/// report network failures as [`FetchError`]; status codes are passed
/// through untouched for the caller to classify.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, user_agent: &str) -> Result<TransportResponse, FetchError>;
}

use async_trait::async_trait;
use cracker_core::{HarvestError, PuzzleRecord};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::{publish_url, Sink};

/// Sends the same GET the sink viewport would, without a browser window.
/// A request that outlives `timeout` is dropped and logged like any other
/// transport failure.
pub struct HttpSink {
    client: Client,
    endpoint: Url,
}

impl HttpSink {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, HarvestError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HarvestError::publish_error(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Sink for HttpSink {
    async fn publish(&mut self, record: &PuzzleRecord) -> Result<(), HarvestError> {
        let url = publish_url(&self.endpoint, record)?;
        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                log::debug!("Sink accepted puzzle {} ({})", record.game_key, response.status());
            }
            Ok(response) => {
                log::warn!("Sink answered {} for puzzle {}", response.status(), record.game_key);
            }
            Err(e) if e.is_timeout() => {
                log::warn!("Sink did not answer in time for puzzle {}: {}", record.game_key, e);
            }
            Err(e) => {
                log::warn!("Sink unreachable for puzzle {}: {}", record.game_key, e);
            }
        }
        Ok(())
    }
}

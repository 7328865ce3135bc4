use async_trait::async_trait;
use cracker_core::{HarvestError, PuzzleRecord};
use url::Url;

mod file;
mod http;
mod viewport;

pub use file::JsonFileSink;
pub use http::HttpSink;
pub use viewport::ViewportSink;

/// Where harvested records go. Delivery is fire-and-forget: implementations
/// log transport failures instead of returning them, and only return errors
/// the driver has to know about (a sink viewport that cannot be opened, a
/// record that cannot be written locally).
#[async_trait]
pub trait Sink: Send {
    async fn publish(&mut self, record: &PuzzleRecord) -> Result<(), HarvestError>;
}

#[async_trait]
impl<S: Sink + ?Sized> Sink for Box<S> {
    async fn publish(&mut self, record: &PuzzleRecord) -> Result<(), HarvestError> {
        (**self).publish(record).await
    }
}

pub fn parse_endpoint(endpoint: &str) -> Result<Url, HarvestError> {
    Url::parse(endpoint).map_err(|e| {
        HarvestError::publish_error(format!("Invalid sink endpoint '{}': {}", endpoint, e))
    })
}

/// `<endpoint>?json=<url-encoded record>`
pub fn publish_url(endpoint: &Url, record: &PuzzleRecord) -> Result<Url, HarvestError> {
    let json = record.to_json()
        .map_err(|e| HarvestError::publish_error(format!("Failed to serialize record: {}", e)))?;
    let mut url = endpoint.clone();
    url.query_pairs_mut().append_pair("json", &json);
    Ok(url)
}

use async_trait::async_trait;
use cracker_core::{HarvestError, PuzzleRecord, Viewport, ViewportHost, WindowGeometry};
use std::sync::Arc;
use url::Url;

use crate::{publish_url, Sink};

/// Delivers records by pointing one long-lived viewport at the endpoint.
/// The viewport is opened on the first record and reused afterwards.
pub struct ViewportSink<H: ViewportHost> {
    host: Arc<H>,
    endpoint: Url,
    geometry: WindowGeometry,
    viewport: Option<H::Viewport>,
}

impl<H: ViewportHost> ViewportSink<H> {
    pub fn new(host: Arc<H>, endpoint: Url) -> Self {
        Self {
            host,
            endpoint,
            geometry: WindowGeometry::sink(),
            viewport: None,
        }
    }

    pub fn viewport(&self) -> Option<&H::Viewport> {
        self.viewport.as_ref()
    }

    pub async fn close(&mut self) -> Result<(), HarvestError> {
        match self.viewport.take() {
            Some(viewport) => viewport.close().await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<H: ViewportHost> Sink for ViewportSink<H> {
    async fn publish(&mut self, record: &PuzzleRecord) -> Result<(), HarvestError> {
        let url = publish_url(&self.endpoint, record)?;

        if self.viewport.is_none() {
            let opened = self.host.open(self.geometry).await?;
            log::debug!("Opened sink viewport at {:?}", self.geometry);
            self.viewport = Some(opened);
        }

        if let Some(viewport) = &self.viewport {
            if let Err(e) = viewport.navigate(url.as_str()).await {
                log::warn!("Sink did not take puzzle {}: {}", record.game_key, e);
            }
        }
        Ok(())
    }
}

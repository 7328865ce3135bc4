use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::browser::{
    Bounds, GetWindowForTargetParams, SetWindowBoundsParams,
};
use chromiumoxide::cdp::browser_protocol::target::CreateTargetParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use cracker_core::{BrowserConfig, HarvestError, TimeoutConfig, ViewportHost, WindowGeometry};
use futures::StreamExt;
use tokio::task::JoinHandle;

use super::viewport::ChromiumViewport;

/// A launched Chromium process; every viewport is a separate window in it.
pub struct ChromiumHost {
    browser: Browser,
    handler: JoinHandle<()>,
    timeouts: TimeoutConfig,
}

impl ChromiumHost {
    pub async fn launch(
        config: &BrowserConfig,
        timeouts: TimeoutConfig,
    ) -> Result<Self, HarvestError> {
        let temp_dir = std::env::temp_dir().join(format!("chromium-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&temp_dir)
            .map_err(|e| HarvestError::browser_error(format!("Failed to create temp dir: {}", e)))?;

        let chrome_cfg = ChromeConfig::builder()
            .headless_mode(if config.headless { HeadlessMode::True } else { HeadlessMode::False })
            .user_data_dir(temp_dir)
            .request_timeout(timeouts.page_load)
            .build()
            .map_err(|e| HarvestError::browser_error(format!("Config failed: {}", e)))?;

        let (browser, mut handler) = Browser::launch(chrome_cfg).await
            .map_err(|e| HarvestError::browser_error(format!("Launch failed: {}", e)))?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });
        log::info!("Chromium launched (headless: {})", config.headless);

        Ok(Self { browser, handler, timeouts })
    }

    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            log::warn!("Chromium did not close cleanly: {}", e);
        }
        self.handler.abort();
    }
}

async fn place_window(page: &Page, geometry: WindowGeometry) -> Result<(), CdpError> {
    let window = page.execute(GetWindowForTargetParams::default()).await?;
    let bounds = Bounds::builder()
        .left(i64::from(geometry.left))
        .top(i64::from(geometry.top))
        .width(i64::from(geometry.width))
        .height(i64::from(geometry.height))
        .build();
    page.execute(SetWindowBoundsParams::new(window.result.window_id.clone(), bounds)).await?;
    Ok(())
}

#[async_trait]
impl ViewportHost for ChromiumHost {
    type Viewport = ChromiumViewport;

    async fn open(&self, geometry: WindowGeometry) -> Result<ChromiumViewport, HarvestError> {
        let params = CreateTargetParams::builder()
            .url("about:blank")
            .new_window(true)
            .build()
            .map_err(|e| HarvestError::browser_error(format!("Window params failed: {}", e)))?;

        let page = self.browser.new_page(params).await
            .map_err(|e| HarvestError::browser_error(format!("Opening window failed: {}", e)))?;

        // Placement is cosmetic; a headless browser may refuse it.
        if let Err(e) = place_window(&page, geometry).await {
            log::debug!("Could not place window at {:?}: {}", geometry, e);
        }

        Ok(ChromiumViewport::new(page, self.timeouts.clone()))
    }
}

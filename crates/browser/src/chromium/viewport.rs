use async_trait::async_trait;
use chromiumoxide::page::Page;
use cracker_core::{HarvestError, Locator, TimeoutConfig, Viewport};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::wait::WaitStrategy;
use crate::shared::{js, to_harvest_error};

/// One browser window.
pub struct ChromiumViewport {
    page: Page,
    wait_strategy: WaitStrategy,
    timeouts: TimeoutConfig,
}

impl ChromiumViewport {
    pub fn new(page: Page, timeouts: TimeoutConfig) -> Self {
        Self {
            page,
            wait_strategy: WaitStrategy::new(timeouts.clone()),
            timeouts,
        }
    }

    async fn eval<T: DeserializeOwned>(&self, js: String, action: &str) -> Result<T, HarvestError> {
        let result = self.page.evaluate(js).await
            .map_err(|e| to_harvest_error(e, action))?;
        let value = result.value().cloned().unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|e| {
                HarvestError::script_error(format!("{} returned an unexpected value: {}", action, e))
            })
    }
}

fn locator_args(locator: &Locator) -> [Value; 4] {
    let (child, child_index) = match &locator.child {
        Some((selector, index)) => (json!(selector), json!(index)),
        None => (Value::Null, json!(0)),
    };
    [json!(locator.selector), json!(locator.index), child, child_index]
}

#[async_trait]
impl Viewport for ChromiumViewport {
    async fn navigate(&self, url: &str) -> Result<(), HarvestError> {
        log::debug!("Navigating to {}", url);
        self.page.goto(url).await.map_err(|e| {
            HarvestError::navigation_error(format!("Navigation to {} failed: {}", url, e))
                .with_context(json!({ "url": url }))
        })?;
        Ok(())
    }

    async fn wait_for_load(&self) -> Result<(), HarvestError> {
        self.wait_strategy.wait_for_stable(&self.page, self.timeouts.page_load).await
    }

    async fn read_text(&self, locator: &Locator) -> Result<Option<String>, HarvestError> {
        let js = js::build_js_call(&js::element::read_text(), &locator_args(locator));
        self.eval(js, "ReadText").await
    }

    async fn read_all(&self, selector: &str) -> Result<Vec<String>, HarvestError> {
        let js = js::build_js_call(js::element::READ_ALL_TEXT, &[json!(selector)]);
        self.eval(js, "ReadAll").await
    }

    async fn activate(&self, locator: &Locator) -> Result<bool, HarvestError> {
        let js = js::build_js_call(&js::element::activate(), &locator_args(locator));
        self.eval(js, "Activate").await
    }

    async fn close(&self) -> Result<(), HarvestError> {
        self.page.clone().close().await
            .map_err(|e| HarvestError::browser_error(format!("Closing window failed: {}", e)))
    }
}

use cracker_core::{HarvestError, PuzzleSelectors, TimeoutConfig, Viewport};
use serde_json::json;
use tokio::time::{sleep, Instant};

/// Names of the required elements the document does not show yet.
pub async fn missing_elements<V: Viewport + ?Sized>(
    viewport: &V,
    selectors: &PuzzleSelectors,
) -> Result<Vec<&'static str>, HarvestError> {
    let mut missing = Vec::new();
    for (what, locator) in selectors.required() {
        if viewport.read_text(locator).await?.is_none() {
            missing.push(what);
        }
    }
    if viewport.read_all(&selectors.moves).await?.is_empty() {
        missing.push("move list");
    }
    Ok(missing)
}

/// Polls until every element the extractor needs is rendered, or fails with
/// a `Timeout` naming whatever is still missing.
pub async fn wait_until_ready<V: Viewport + ?Sized>(
    viewport: &V,
    selectors: &PuzzleSelectors,
    timeouts: &TimeoutConfig,
) -> Result<(), HarvestError> {
    let start = Instant::now();
    loop {
        let missing = missing_elements(viewport, selectors).await?;
        if missing.is_empty() {
            log::debug!("Puzzle content ready after {}ms", start.elapsed().as_millis());
            return Ok(());
        }

        if start.elapsed() >= timeouts.content_ready {
            return Err(HarvestError::timeout_error(format!(
                "Puzzle content not ready after {}ms",
                timeouts.content_ready.as_millis()
            ))
            .with_context(json!({ "missing": missing })));
        }

        sleep(timeouts.check_interval).await;
    }
}

use chromiumoxide::page::Page;
use cracker_core::{HarvestError, TimeoutConfig};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use crate::shared::{is_context_lost, js, to_harvest_error};

const REQUIRED_STABLE_CHECKS: u32 = 3;

/// What one look at the document's loading state found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadProbe {
    /// The execution context went away mid-check; the page is navigating
    ContextLost,
    State { ready: bool, active: u64 },
    Unknown,
}

pub struct WaitStrategy {
    config: TimeoutConfig,
}

impl WaitStrategy {
    pub fn new(config: TimeoutConfig) -> Self {
        Self { config }
    }

    /// Waits for `readyState == complete` with no pending resource requests.
    /// Gives up quietly after `timeout`; the harvester's own readiness check
    /// decides whether the document is usable.
    pub async fn wait_for_stable(
        &self,
        page: &Page,
        timeout: Duration,
    ) -> Result<(), HarvestError> {
        log::debug!("Waiting for page to stabilize...");
        poll_until_stable(|| probe(page), timeout, self.config.check_interval).await
    }
}

async fn probe(page: &Page) -> Result<LoadProbe, HarvestError> {
    let js = js::build_js_call(js::wait::CHECK_LOADING, &[]);
    match page.evaluate(js).await {
        Ok(result) => Ok(match result.value().and_then(|v| v.as_object()) {
            Some(obj) => LoadProbe::State {
                ready: obj.get("readyState").and_then(|v| v.as_str()) == Some("complete"),
                active: obj.get("activeRequests").and_then(|v| v.as_u64()).unwrap_or(0),
            },
            None => LoadProbe::Unknown,
        }),
        Err(e) if is_context_lost(&e.to_string()) => Ok(LoadProbe::ContextLost),
        Err(e) => Err(to_harvest_error(e, "WaitForLoad")),
    }
}

/// Probes every `interval` until the page has been idle for
/// `REQUIRED_STABLE_CHECKS` probes in a row. The deadline is checked before
/// every probe, whatever the previous probe returned.
pub(crate) async fn poll_until_stable<F, Fut>(
    mut probe: F,
    timeout: Duration,
    interval: Duration,
) -> Result<(), HarvestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<LoadProbe, HarvestError>>,
{
    let start = Instant::now();
    let mut stable_checks = 0;

    loop {
        if start.elapsed() > timeout {
            log::warn!(
                "Page load did not settle within {}ms, continuing anyway",
                timeout.as_millis()
            );
            return Ok(());
        }

        match probe().await? {
            LoadProbe::ContextLost => {
                log::debug!("Page context changed (navigating), waiting...");
                stable_checks = 0;
            }
            LoadProbe::State { ready, active } if ready && active == 0 => {
                stable_checks += 1;
                if stable_checks >= REQUIRED_STABLE_CHECKS {
                    log::debug!("Page loaded ({}ms)", start.elapsed().as_millis());
                    return Ok(());
                }
            }
            LoadProbe::State { ready, active } => {
                if stable_checks > 0 {
                    log::debug!(
                        "Page activity detected (ready:{} active:{}), resetting...",
                        ready,
                        active
                    );
                }
                stable_checks = 0;
            }
            LoadProbe::Unknown => {}
        }

        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cracker_core::ErrorCategory;
    use std::cell::Cell;

    const IDLE: LoadProbe = LoadProbe::State { ready: true, active: 0 };

    #[tokio::test(start_paused = true)]
    async fn endless_navigation_still_hits_the_deadline() {
        let probes = Cell::new(0u32);
        let start = Instant::now();

        let result = poll_until_stable(
            || {
                probes.set(probes.get() + 1);
                async { Ok(LoadProbe::ContextLost) }
            },
            Duration::from_millis(1000),
            Duration::from_millis(100),
        )
        .await;

        assert!(result.is_ok());
        assert!(start.elapsed() >= Duration::from_millis(1000));
        assert!(probes.get() <= 12, "probed {} times", probes.get());
    }

    #[tokio::test(start_paused = true)]
    async fn three_idle_probes_in_a_row_end_the_wait() {
        let busy = LoadProbe::State { ready: true, active: 2 };
        let script = [LoadProbe::ContextLost, IDLE, IDLE, busy];
        let probes = Cell::new(0usize);

        poll_until_stable(
            || {
                let n = probes.get();
                probes.set(n + 1);
                let next = script.get(n).copied().unwrap_or(IDLE);
                async move { Ok(next) }
            },
            Duration::from_secs(30),
            Duration::from_millis(100),
        )
        .await
        .unwrap();

        // Busy probe at index 3 resets the streak; indexes 4..=6 are idle.
        assert_eq!(probes.get(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn driver_errors_are_not_swallowed() {
        let err = poll_until_stable(
            || async { Err(HarvestError::browser_error("target crashed")) },
            Duration::from_secs(30),
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();

        assert_eq!(err.category, ErrorCategory::Browser);
    }
}

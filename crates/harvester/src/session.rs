use cracker_core::{
    AbortPolicy, HarvestConfig, HarvestError, PuzzleRecord, Severity, Viewport, ViewportHost,
    WindowGeometry,
};
use cracker_storage::Sink;
use std::sync::Arc;
use tokio::time::sleep;

use crate::extract::{extract, reveal_and_capture};
use crate::readiness::wait_until_ready;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Opening,
    Loading,
    Harvesting,
    Publishing,
    /// The attempt was abandoned; the puzzle viewport is still open
    Aborted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempts: u64,
    pub published: u64,
    pub aborted: u64,
    /// The run stopped on an abandoned attempt under `AbortPolicy::Halt`
    pub halted: bool,
}

fn enter(state: &mut CycleState, attempt: u64, next: CycleState) {
    log::debug!("[{}] {:?} -> {:?}", attempt, state, next);
    *state = next;
}

/// One harvesting run: a puzzle viewport that is replaced every attempt and a
/// sink that receives every record.
pub struct Session<H: ViewportHost, S: Sink> {
    host: Arc<H>,
    sink: S,
    config: HarvestConfig,
    puzzle: Option<H::Viewport>,
    attempt: u64,
    state: CycleState,
    published: u64,
    aborted: u64,
    last_abort: Option<HarvestError>,
}

impl<H: ViewportHost, S: Sink> Session<H, S> {
    pub fn new(host: Arc<H>, sink: S, config: HarvestConfig) -> Self {
        Self {
            host,
            sink,
            config,
            puzzle: None,
            attempt: 0,
            state: CycleState::Idle,
            published: 0,
            aborted: 0,
            last_abort: None,
        }
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn puzzle_viewport(&self) -> Option<&H::Viewport> {
        self.puzzle.as_ref()
    }

    /// Error that abandoned the most recent aborted attempt.
    pub fn last_abort(&self) -> Option<&HarvestError> {
        self.last_abort.as_ref()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            attempts: self.attempt,
            published: self.published,
            aborted: self.aborted,
            halted: false,
        }
    }

    fn transition(&mut self, next: CycleState) {
        enter(&mut self.state, self.attempt, next);
    }

    /// Replaces the puzzle viewport with a fresh one pointed at the puzzle
    /// page and waits for its load notification.
    pub async fn recycle(&mut self) -> Result<(), HarvestError> {
        self.transition(CycleState::Opening);

        if let Some(old) = self.puzzle.take() {
            if let Err(e) = old.close().await {
                log::warn!(
                    "[{}] Closing the previous puzzle window failed: {}",
                    self.attempt,
                    e
                );
            }
        }
        self.attempt += 1;

        // Held by the session before navigating so a failed load is closed on the next recycle.
        let viewport = self
            .puzzle
            .insert(self.host.open(WindowGeometry::puzzle(self.config.screen)).await?);
        viewport.navigate(&self.config.puzzle_url).await?;

        enter(&mut self.state, self.attempt, CycleState::Loading);
        viewport.wait_for_load().await?;
        log::info!("{} puzzle is being cracked...", self.attempt);
        Ok(())
    }

    /// Waits for the puzzle to render, reads it and reveals the solution.
    pub async fn harvest(&mut self) -> Result<PuzzleRecord, HarvestError> {
        let viewport = self
            .puzzle
            .as_ref()
            .ok_or_else(|| HarvestError::browser_error("no puzzle viewport is open"))?;
        let selectors = &self.config.selectors;
        let timeouts = &self.config.timeouts;

        wait_until_ready(viewport, selectors, timeouts).await?;
        if !timeouts.settle_delay.is_zero() {
            sleep(timeouts.settle_delay).await;
        }

        enter(&mut self.state, self.attempt, CycleState::Harvesting);
        let head = extract(viewport, selectors).await?;
        let boundary = head.boundary;
        let solution =
            reveal_and_capture(viewport, selectors, boundary, timeouts.reveal_settle).await?;
        log::debug!(
            "[{}] {} problem moves, {} solution moves",
            self.attempt,
            boundary,
            solution.len()
        );
        Ok(PuzzleRecord::assemble(head, &solution))
    }

    async fn publish(&mut self, record: PuzzleRecord) -> Result<(), HarvestError> {
        self.transition(CycleState::Publishing);
        match self.sink.publish(&record).await {
            Ok(()) => {
                self.published += 1;
                log::info!("[{}] Puzzle {} sent to the sink", self.attempt, record.game_key);
            }
            Err(e) if e.severity() == Severity::Unobserved => {
                log::warn!(
                    "[{}] Puzzle {} was not stored: {}",
                    self.attempt,
                    record.game_key,
                    e
                );
            }
            Err(e) => return Err(e),
        }
        self.transition(CycleState::Idle);
        Ok(())
    }

    /// Runs attempts back to back until `max_attempts` is reached, a fatal
    /// error occurs, or an attempt is abandoned under `AbortPolicy::Halt`.
    pub async fn run(&mut self) -> Result<RunSummary, HarvestError> {
        loop {
            if self.config.max_attempts.is_some_and(|max| self.attempt >= max) {
                break;
            }

            self.recycle().await?;
            match self.harvest().await {
                Ok(record) => self.publish(record).await?,
                Err(e) if e.severity() == Severity::Attempt => {
                    self.transition(CycleState::Aborted);
                    self.aborted += 1;
                    log::error!("[{}] Puzzle abandoned: {}", self.attempt, e);
                    self.last_abort = Some(e);

                    if self.config.abort_policy == AbortPolicy::Halt {
                        log::error!("[{}] Halting with the puzzle window left open", self.attempt);
                        return Ok(RunSummary {
                            halted: true,
                            ..self.summary()
                        });
                    }
                }
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "Run finished: {} attempts, {} published, {} abandoned",
            self.attempt,
            self.published,
            self.aborted
        );
        Ok(self.summary())
    }

    /// Closes the puzzle viewport, if any.
    pub async fn close(&mut self) -> Result<(), HarvestError> {
        self.transition(CycleState::Idle);
        match self.puzzle.take() {
            Some(viewport) => viewport.close().await,
            None => Ok(()),
        }
    }
}

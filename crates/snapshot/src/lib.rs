//! Offline viewports over saved puzzle pages.
//!
//! A [`Snapshot`] is the HTML of a puzzle page as rendered on load, plus
//! optionally the HTML after the solution was revealed. Activating any
//! element that exists in the page flips the viewport to the revealed
//! document, which is how the live site behaves for the reveal control.

use async_trait::async_trait;
use cracker_core::{HarvestError, Locator, Viewport, ViewportHost, WindowGeometry};
use scraper::{ElementRef, Html, Selector};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

const BLANK_PAGE: &str = "<html><head></head><body></body></html>";

#[derive(Debug, Clone)]
pub struct Snapshot {
    before: String,
    after: Option<String>,
    unreachable: bool,
}

impl Snapshot {
    pub fn new(before: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: None,
            unreachable: false,
        }
    }

    pub fn with_reveal(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }

    pub fn blank() -> Self {
        Self::new(BLANK_PAGE)
    }

    /// A window whose navigations all fail, like a site that is down.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::blank()
        }
    }
}

/// Observable state of one opened snapshot viewport.
#[derive(Debug)]
pub struct PageState {
    snapshot: Snapshot,
    geometry: WindowGeometry,
    revealed: AtomicBool,
    closed: AtomicBool,
    activations: AtomicUsize,
    navigations: Mutex<Vec<String>>,
}

impl PageState {
    fn new(snapshot: Snapshot, geometry: WindowGeometry) -> Self {
        Self {
            snapshot,
            geometry,
            revealed: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            activations: AtomicUsize::new(0),
            navigations: Mutex::new(Vec::new()),
        }
    }

    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed.load(Ordering::SeqCst)
    }

    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn current_html(&self) -> &str {
        match (&self.snapshot.after, self.is_revealed()) {
            (Some(after), true) => after,
            _ => &self.snapshot.before,
        }
    }

    fn ensure_open(&self) -> Result<(), HarvestError> {
        if self.is_closed() {
            return Err(HarvestError::browser_error("viewport is already closed"));
        }
        Ok(())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector)
        .map_err(|e| HarvestError::script_error(format!("Invalid selector '{}': {}", selector, e)))
}

fn resolve<'a>(doc: &'a Html, locator: &Locator) -> Result<Option<ElementRef<'a>>, HarvestError> {
    let selector = parse_selector(&locator.selector)?;
    let Some(el) = doc.select(&selector).nth(locator.index) else {
        return Ok(None);
    };
    match &locator.child {
        None => Ok(Some(el)),
        Some((child, index)) => {
            let child = parse_selector(child)?;
            Ok(el.select(&child).nth(*index))
        }
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect()
}

fn read_text(html: &str, locator: &Locator) -> Result<Option<String>, HarvestError> {
    let doc = Html::parse_document(html);
    Ok(resolve(&doc, locator)?.map(text_of))
}

fn read_all(html: &str, selector: &str) -> Result<Vec<String>, HarvestError> {
    let doc = Html::parse_document(html);
    let selector = parse_selector(selector)?;
    Ok(doc.select(&selector).map(text_of).collect())
}

fn exists(html: &str, locator: &Locator) -> Result<bool, HarvestError> {
    let doc = Html::parse_document(html);
    Ok(resolve(&doc, locator)?.is_some())
}

pub struct SnapshotViewport {
    state: Arc<PageState>,
}

impl SnapshotViewport {
    pub fn open(snapshot: Snapshot, geometry: WindowGeometry) -> Self {
        Self {
            state: Arc::new(PageState::new(snapshot, geometry)),
        }
    }

    pub fn state(&self) -> Arc<PageState> {
        Arc::clone(&self.state)
    }
}

#[async_trait]
impl Viewport for SnapshotViewport {
    async fn navigate(&self, url: &str) -> Result<(), HarvestError> {
        self.state.ensure_open()?;
        self.state
            .navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        if self.state.snapshot.unreachable {
            return Err(HarvestError::navigation_error(format!("{} is unreachable", url)));
        }
        Ok(())
    }

    async fn wait_for_load(&self) -> Result<(), HarvestError> {
        self.state.ensure_open()
    }

    async fn read_text(&self, locator: &Locator) -> Result<Option<String>, HarvestError> {
        self.state.ensure_open()?;
        read_text(self.state.current_html(), locator)
    }

    async fn read_all(&self, selector: &str) -> Result<Vec<String>, HarvestError> {
        self.state.ensure_open()?;
        read_all(self.state.current_html(), selector)
    }

    async fn activate(&self, locator: &Locator) -> Result<bool, HarvestError> {
        self.state.ensure_open()?;
        if !exists(self.state.current_html(), locator)? {
            return Ok(false);
        }
        self.state.activations.fetch_add(1, Ordering::SeqCst);
        if self.state.snapshot.after.is_some() {
            self.state.revealed.store(true, Ordering::SeqCst);
        }
        Ok(true)
    }

    async fn close(&self) -> Result<(), HarvestError> {
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out queued snapshots, one per opened viewport.
#[derive(Default)]
pub struct SnapshotHost {
    queue: Mutex<VecDeque<Snapshot>>,
    opened: Mutex<Vec<Arc<PageState>>>,
}

impl SnapshotHost {
    pub fn new(snapshots: impl IntoIterator<Item = Snapshot>) -> Self {
        Self {
            queue: Mutex::new(snapshots.into_iter().collect()),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Every viewport opened so far, oldest first.
    pub fn opened(&self) -> Vec<Arc<PageState>> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn remaining(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl ViewportHost for SnapshotHost {
    type Viewport = SnapshotViewport;

    async fn open(&self, geometry: WindowGeometry) -> Result<SnapshotViewport, HarvestError> {
        let snapshot = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| HarvestError::browser_error("no snapshot left to open"))?;

        let viewport = SnapshotViewport::open(snapshot, geometry);
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(viewport.state());
        log::debug!("Opened snapshot viewport #{}", self.opened().len());
        Ok(viewport)
    }
}

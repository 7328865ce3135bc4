use async_trait::async_trait;

pub mod config;
pub mod error;
pub mod logging;
pub mod parse;
pub mod record;

pub use config::{
    AbortPolicy, BrowserConfig, HarvestConfig, Locator, PuzzleSelectors, ScreenSize,
    TimeoutConfig, WindowGeometry, DEFAULT_PUZZLE_URL, DEFAULT_SINK_ENDPOINT,
};
pub use error::{ErrorCategory, HarvestError, Severity};
pub use record::{PuzzleHead, PuzzleRecord};

/// A document-bearing surface (a browser window, a saved page) the harvester
/// can navigate, read and poke at.
#[async_trait]
pub trait Viewport: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), HarvestError>;

    /// Resolves once the document has raised its load notification.
    async fn wait_for_load(&self) -> Result<(), HarvestError>;

    /// Text content of the located element, `None` if it does not exist.
    async fn read_text(&self, locator: &Locator) -> Result<Option<String>, HarvestError>;

    /// Text content of every element matching `selector`, in document order.
    async fn read_all(&self, selector: &str) -> Result<Vec<String>, HarvestError>;

    /// Clicks the located element. Returns `false` if it does not exist.
    async fn activate(&self, locator: &Locator) -> Result<bool, HarvestError>;

    async fn close(&self) -> Result<(), HarvestError>;
}

/// Opens viewports. Failing to open one is fatal for the run.
#[async_trait]
pub trait ViewportHost: Send + Sync {
    type Viewport: Viewport + 'static;

    async fn open(&self, geometry: WindowGeometry) -> Result<Self::Viewport, HarvestError>;
}

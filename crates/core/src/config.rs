use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_PUZZLE_URL: &str = "https://lichess.org/training/";
pub const DEFAULT_SINK_ENDPOINT: &str = "http://localhost/chesspuzz/store_puz.php";

#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Upper bound for the raw page load of a freshly navigated viewport
    pub page_load: Duration,
    /// Upper bound for the puzzle elements to render after load
    pub content_ready: Duration,
    pub check_interval: Duration,
    /// Pause after the document is ready, before extraction starts
    pub settle_delay: Duration,
    /// Pause after the reveal control is activated
    pub reveal_settle: Duration,
    /// Upper bound for one delivery to a remote sink
    pub publish: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            page_load: Duration::from_millis(30000),
            content_ready: Duration::from_millis(15000),
            check_interval: Duration::from_millis(300),
            settle_delay: Duration::from_millis(1000),
            reveal_settle: Duration::from_millis(300),
            publish: Duration::from_millis(10000),
        }
    }
}

impl TimeoutConfig {
    pub fn with_content_ready(mut self, ms: u64) -> Self {
        self.content_ready = Duration::from_millis(ms);
        self
    }

    pub fn with_settle_delay(mut self, ms: u64) -> Self {
        self.settle_delay = Duration::from_millis(ms);
        self
    }

    pub fn with_page_load(mut self, ms: u64) -> Self {
        self.page_load = Duration::from_millis(ms);
        self
    }

    pub fn with_publish(mut self, ms: u64) -> Self {
        self.publish = Duration::from_millis(ms);
        self
    }

    pub fn fast() -> Self {
        Self {
            page_load: Duration::from_millis(20000),
            content_ready: Duration::from_millis(8000),
            check_interval: Duration::from_millis(200),
            settle_delay: Duration::from_millis(500),
            reveal_settle: Duration::from_millis(200),
            publish: Duration::from_millis(5000),
        }
    }

    /// No settle pauses at all; readiness polling still applies.
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            reveal_settle: Duration::ZERO,
            ..Self::fast()
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
}

/// Screen dimensions of the operator's display, used only to park viewports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self { width: 1920, height: 1080 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl WindowGeometry {
    /// A 1x1 window tucked into the far corner of the screen.
    pub fn puzzle(screen: ScreenSize) -> Self {
        Self {
            left: screen.width,
            top: screen.height,
            width: 1,
            height: 1,
        }
    }

    pub fn sink() -> Self {
        Self {
            left: 0,
            top: 150,
            width: 720,
            height: 600,
        }
    }
}

/// The `index`-th element matching `selector`, optionally narrowed to the
/// `child_index`-th descendant matching `child`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub selector: String,
    pub index: usize,
    pub child: Option<(String, usize)>,
}

impl Locator {
    pub fn nth(selector: impl Into<String>, index: usize) -> Self {
        Self {
            selector: selector.into(),
            index,
            child: None,
        }
    }

    pub fn child(mut self, selector: impl Into<String>, index: usize) -> Self {
        self.child = Some((selector.into(), index));
        self
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.selector, self.index)?;
        if let Some((child, index)) = &self.child {
            write!(f, " > {}[{}]", child, index)?;
        }
        Ok(())
    }
}

/// Where the puzzle page keeps each piece of the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleSelectors {
    pub game_type: Locator,
    pub white: Locator,
    pub black: Locator,
    pub game_id: Locator,
    pub moves: String,
    pub reveal: Locator,
}

impl Default for PuzzleSelectors {
    fn default() -> Self {
        Self {
            game_type: Locator::nth(".infos", 1).child("span", 0),
            white: Locator::nth(".user-link", 0),
            black: Locator::nth(".user-link", 1),
            game_id: Locator::nth(".infos.puzzle", 0).child("a", 0),
            moves: "move".to_string(),
            reveal: Locator::nth(".view_solution", 0).child("*", 0),
        }
    }
}

impl PuzzleSelectors {
    /// Locators that must resolve before extraction may start.
    pub fn required(&self) -> [(&'static str, &Locator); 5] {
        [
            ("game type label", &self.game_type),
            ("white player label", &self.white),
            ("black player label", &self.black),
            ("game identifier", &self.game_id),
            ("reveal control", &self.reveal),
        ]
    }
}

/// What the driver does after an attempt is abandoned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortPolicy {
    /// Log the failure and recycle into the next attempt
    #[default]
    SkipAndContinue,
    /// Log the failure and stop, leaving the dead viewport open
    Halt,
}

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub puzzle_url: String,
    pub screen: ScreenSize,
    pub selectors: PuzzleSelectors,
    pub timeouts: TimeoutConfig,
    pub abort_policy: AbortPolicy,
    /// Stop after this many attempts; `None` runs until stopped externally
    pub max_attempts: Option<u64>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            puzzle_url: DEFAULT_PUZZLE_URL.to_string(),
            screen: ScreenSize::default(),
            selectors: PuzzleSelectors::default(),
            timeouts: TimeoutConfig::default(),
            abort_policy: AbortPolicy::default(),
            max_attempts: None,
        }
    }
}

impl HarvestConfig {
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_abort_policy(mut self, policy: AbortPolicy) -> Self {
        self.abort_policy = policy;
        self
    }

    pub fn with_max_attempts(mut self, max: u64) -> Self {
        self.max_attempts = Some(max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn puzzle_window_is_parked_in_the_screen_corner() {
        let g = WindowGeometry::puzzle(ScreenSize { width: 2560, height: 1440 });
        assert_eq!((g.left, g.top, g.width, g.height), (2560, 1440, 1, 1));
    }

    #[test]
    fn locator_display_names_both_levels() {
        let loc = Locator::nth(".infos", 1).child("span", 0);
        assert_eq!(loc.to_string(), ".infos[1] > span[0]");
        assert_eq!(Locator::nth("move", 3).to_string(), "move[3]");
    }

    #[test]
    fn immediate_timeouts_skip_settling() {
        let t = TimeoutConfig::immediate();
        assert!(t.settle_delay.is_zero());
        assert!(t.reveal_settle.is_zero());
        assert!(!t.content_ready.is_zero());
        assert!(!t.publish.is_zero());
    }
}

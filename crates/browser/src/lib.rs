pub mod chromium;
pub mod shared;

pub use chromium::{ChromiumHost, ChromiumViewport};

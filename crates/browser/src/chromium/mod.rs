mod host;
mod viewport;
mod wait;

pub use host::ChromiumHost;
pub use viewport::ChromiumViewport;
pub use wait::WaitStrategy;

//! Logger setup shared by the binary and the test suites.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination {
    Terminal,
    File,
    Both,
}

/// Installs the global logger. Returns `false` when a logger was already set
/// or the log file could not be created.
pub fn initialize(destination: LogDestination, level: LevelFilter, file: &Path) -> bool {
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if matches!(destination, LogDestination::Terminal | LogDestination::Both) {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if matches!(destination, LogDestination::File | LogDestination::Both) {
        match File::create(file) {
            Ok(f) => loggers.push(WriteLogger::new(level, config, f)),
            Err(e) => {
                eprintln!("Failed to create log file {}: {}", file.display(), e);
                if loggers.is_empty() {
                    return false;
                }
            }
        }
    }

    CombinedLogger::init(loggers).is_ok()
}

fn build_config() -> Config {
    let mut builder = ConfigBuilder::new();
    // Chromium's protocol chatter is noise at info level
    builder.add_filter_ignore_str("chromiumoxide");
    builder.add_filter_ignore_str("tungstenite");
    builder.set_target_level(LevelFilter::Off);
    builder.set_thread_level(LevelFilter::Off);
    builder.build()
}

/// Initializes a terminal logger for tests; no-ops if one is already installed.
pub fn initialize_for_tests() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

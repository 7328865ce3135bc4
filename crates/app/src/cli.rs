use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use cracker_core::logging::LogDestination;
use cracker_core::{
    AbortPolicy, BrowserConfig, HarvestConfig, ScreenSize, TimeoutConfig, DEFAULT_PUZZLE_URL,
    DEFAULT_SINK_ENDPOINT,
};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Viewport,
    Http,
    File,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub harvest: HarvestConfig,
    pub browser: BrowserConfig,
    pub sink: SinkKind,
    pub endpoint: String,
    pub out: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            harvest: HarvestConfig::default(),
            browser: BrowserConfig::default(),
            sink: SinkKind::Viewport,
            endpoint: DEFAULT_SINK_ENDPOINT.to_string(),
            out: PathBuf::from("puzzles"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub before: PathBuf,
    pub after: Option<PathBuf>,
}

pub fn command() -> Command {
    Command::new("puzzle_cracker")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Harvests chess puzzles and their solutions from a training site")
        .arg(
            Arg::new("log")
                .long("log")
                .global(true)
                .default_value("terminal")
                .value_parser(PossibleValuesParser::new(["terminal", "file", "both"]))
                .help("Where log output goes (file: ./puzzle_cracker.log)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log every state transition"),
        )
        .subcommand(
            Command::new("run")
                .about("Harvest puzzles until stopped (default)")
                .arg(
                    Arg::new("puzzle-url")
                        .long("puzzle-url")
                        .default_value(DEFAULT_PUZZLE_URL)
                        .help("Page that serves a fresh puzzle on every load"),
                )
                .arg(
                    Arg::new("sink")
                        .long("sink")
                        .default_value("viewport")
                        .value_parser(PossibleValuesParser::new(["viewport", "http", "file"]))
                        .help("How records are delivered"),
                )
                .arg(
                    Arg::new("endpoint")
                        .long("endpoint")
                        .default_value(DEFAULT_SINK_ENDPOINT)
                        .help("Storage endpoint for the viewport and http sinks"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .default_value("puzzles")
                        .value_parser(value_parser!(PathBuf))
                        .help("Folder for the file sink"),
                )
                .arg(
                    Arg::new("on-abort")
                        .long("on-abort")
                        .default_value("skip")
                        .value_parser(PossibleValuesParser::new(["skip", "halt"]))
                        .help("What to do when a puzzle cannot be read"),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(u64))
                        .help("Stop after this many attempts"),
                )
                .arg(
                    Arg::new("headless")
                        .long("headless")
                        .action(ArgAction::SetTrue)
                        .help("Run Chromium without visible windows"),
                )
                .arg(
                    Arg::new("screen-width")
                        .long("screen-width")
                        .default_value("1920")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("screen-height")
                        .long("screen-height")
                        .default_value("1080")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("ready-timeout-ms")
                        .long("ready-timeout-ms")
                        .default_value("15000")
                        .value_parser(value_parser!(u64))
                        .help("How long to wait for the puzzle to render"),
                )
                .arg(
                    Arg::new("settle-ms")
                        .long("settle-ms")
                        .default_value("1000")
                        .value_parser(value_parser!(u64))
                        .help("Pause between the puzzle rendering and reading it"),
                )
                .arg(
                    Arg::new("page-load-ms")
                        .long("page-load-ms")
                        .default_value("30000")
                        .value_parser(value_parser!(u64))
                        .help("How long to wait for a window's page to stop loading"),
                )
                .arg(
                    Arg::new("publish-timeout-ms")
                        .long("publish-timeout-ms")
                        .default_value("10000")
                        .value_parser(value_parser!(u64))
                        .help("How long the http sink waits for the endpoint"),
                ),
        )
        .subcommand(
            Command::new("replay")
                .about("Read one puzzle from saved pages and print its record")
                .arg(
                    Arg::new("before")
                        .long("before")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("HTML of the puzzle page as loaded"),
                )
                .arg(
                    Arg::new("after")
                        .long("after")
                        .value_parser(value_parser!(PathBuf))
                        .help("HTML of the same page after the solution was revealed"),
                ),
        )
}

/// Global flags are visible on the innermost subcommand's matches.
fn innermost(matches: &ArgMatches) -> &ArgMatches {
    match matches.subcommand() {
        Some((_, sub)) => innermost(sub),
        None => matches,
    }
}

pub fn log_destination(matches: &ArgMatches) -> LogDestination {
    match innermost(matches).get_one::<String>("log").map(String::as_str) {
        Some("file") => LogDestination::File,
        Some("both") => LogDestination::Both,
        _ => LogDestination::Terminal,
    }
}

pub fn verbose(matches: &ArgMatches) -> bool {
    innermost(matches).get_flag("verbose")
}

pub fn run_options(matches: &ArgMatches) -> RunOptions {
    let defaults = RunOptions::default();

    let sink = match matches.get_one::<String>("sink").map(String::as_str) {
        Some("http") => SinkKind::Http,
        Some("file") => SinkKind::File,
        _ => SinkKind::Viewport,
    };
    let abort_policy = match matches.get_one::<String>("on-abort").map(String::as_str) {
        Some("halt") => AbortPolicy::Halt,
        _ => AbortPolicy::SkipAndContinue,
    };

    let mut timeouts = TimeoutConfig::default();
    if let Some(ms) = matches.get_one::<u64>("ready-timeout-ms") {
        timeouts = timeouts.with_content_ready(*ms);
    }
    if let Some(ms) = matches.get_one::<u64>("settle-ms") {
        timeouts = timeouts.with_settle_delay(*ms);
    }
    if let Some(ms) = matches.get_one::<u64>("page-load-ms") {
        timeouts = timeouts.with_page_load(*ms);
    }
    if let Some(ms) = matches.get_one::<u64>("publish-timeout-ms") {
        timeouts = timeouts.with_publish(*ms);
    }

    let default_screen = defaults.harvest.screen;
    let screen = ScreenSize {
        width: matches
            .get_one::<u32>("screen-width")
            .copied()
            .unwrap_or(default_screen.width),
        height: matches
            .get_one::<u32>("screen-height")
            .copied()
            .unwrap_or(default_screen.height),
    };

    let harvest = HarvestConfig {
        puzzle_url: matches
            .get_one::<String>("puzzle-url")
            .cloned()
            .unwrap_or(defaults.harvest.puzzle_url),
        screen,
        selectors: defaults.harvest.selectors,
        timeouts,
        abort_policy,
        max_attempts: matches.get_one::<u64>("limit").copied(),
    };

    RunOptions {
        harvest,
        browser: BrowserConfig {
            headless: matches.get_flag("headless"),
        },
        sink,
        endpoint: matches.get_one::<String>("endpoint").cloned().unwrap_or(defaults.endpoint),
        out: matches.get_one::<PathBuf>("out").cloned().unwrap_or(defaults.out),
    }
}

pub fn replay_options(matches: &ArgMatches) -> Option<ReplayOptions> {
    Some(ReplayOptions {
        before: matches.get_one::<PathBuf>("before")?.clone(),
        after: matches.get_one::<PathBuf>("after").cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn run_matches(args: &[&str]) -> RunOptions {
        let matches = command().try_get_matches_from(args).unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "run");
        run_options(sub)
    }

    #[test]
    fn command_definition_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn run_defaults_match_library_defaults() {
        let options = run_matches(&["puzzle_cracker", "run"]);
        assert_eq!(options.sink, SinkKind::Viewport);
        assert_eq!(options.endpoint, DEFAULT_SINK_ENDPOINT);
        assert_eq!(options.harvest.puzzle_url, DEFAULT_PUZZLE_URL);
        assert_eq!(options.harvest.abort_policy, AbortPolicy::SkipAndContinue);
        assert_eq!(options.harvest.max_attempts, None);
        assert!(!options.browser.headless);
    }

    #[test]
    fn run_flags_reach_the_config() {
        let options = run_matches(&[
            "puzzle_cracker",
            "run",
            "--sink",
            "file",
            "--out",
            "/tmp/p",
            "--on-abort",
            "halt",
            "--limit",
            "5",
            "--headless",
            "--screen-width",
            "800",
            "--settle-ms",
            "0",
            "--page-load-ms",
            "4000",
            "--publish-timeout-ms",
            "2500",
        ]);
        assert_eq!(options.sink, SinkKind::File);
        assert_eq!(options.out, PathBuf::from("/tmp/p"));
        assert_eq!(options.harvest.abort_policy, AbortPolicy::Halt);
        assert_eq!(options.harvest.max_attempts, Some(5));
        assert_eq!(options.harvest.screen.width, 800);
        assert_eq!(options.harvest.screen.height, 1080);
        assert!(options.harvest.timeouts.settle_delay.is_zero());
        assert_eq!(options.harvest.timeouts.page_load, Duration::from_millis(4000));
        assert_eq!(options.harvest.timeouts.publish, Duration::from_millis(2500));
        assert!(options.browser.headless);
    }

    #[test]
    fn global_log_flags_work_after_the_subcommand() {
        let matches = command()
            .try_get_matches_from(["puzzle_cracker", "run", "--log", "both", "-v"])
            .unwrap();
        assert_eq!(log_destination(&matches), LogDestination::Both);
        assert!(verbose(&matches));
    }

    #[test]
    fn replay_requires_before_page() {
        assert!(command()
            .try_get_matches_from(["puzzle_cracker", "replay"])
            .is_err());
        let matches = command()
            .try_get_matches_from(["puzzle_cracker", "replay", "--before", "a.html"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let options = replay_options(sub).unwrap();
        assert_eq!(options.before, PathBuf::from("a.html"));
        assert!(options.after.is_none());
    }
}

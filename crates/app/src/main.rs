use anyhow::{Context, Result};
use browser::ChromiumHost;
use cracker_core::logging;
use cracker_harvester::Session;
use cracker_storage::{parse_endpoint, HttpSink, JsonFileSink, Sink, ViewportSink};
use log::LevelFilter;
use std::path::Path;
use std::sync::Arc;

mod cli;
mod replay;

use cli::{RunOptions, SinkKind};

const LOG_FILE: &str = "puzzle_cracker.log";

async fn tear_down(mut session: Session<ChromiumHost, Box<dyn Sink>>, host: Arc<ChromiumHost>) {
    if let Err(e) = session.close().await {
        log::warn!("Closing the puzzle window failed: {}", e);
    }
    drop(session);
    if let Ok(host) = Arc::try_unwrap(host) {
        host.shutdown().await;
    }
}

async fn harvest(options: RunOptions) -> Result<()> {
    let host = Arc::new(
        ChromiumHost::launch(&options.browser, options.harvest.timeouts.clone()).await?,
    );

    let sink: Box<dyn Sink> = match options.sink {
        SinkKind::Viewport => {
            let endpoint = parse_endpoint(&options.endpoint)?;
            Box::new(ViewportSink::new(Arc::clone(&host), endpoint))
        }
        SinkKind::Http => {
            let endpoint = parse_endpoint(&options.endpoint)?;
            Box::new(HttpSink::new(endpoint, options.harvest.timeouts.publish)?)
        }
        SinkKind::File => Box::new(JsonFileSink::new(&options.out)),
    };

    let mut session = Session::new(Arc::clone(&host), sink, options.harvest);
    let outcome = tokio::select! {
        result = session.run() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let summary = match outcome {
        Some(Ok(summary)) => summary,
        Some(Err(e)) => {
            log::error!("Run stopped: {}", e);
            tear_down(session, host).await;
            return Err(e.into());
        }
        None => {
            log::warn!("Interrupted");
            session.summary()
        }
    };

    if summary.halted {
        log::error!("Stalled on puzzle {}; press Ctrl-C to exit", summary.attempts);
        tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    }

    log::info!(
        "{} attempts, {} puzzles sent, {} abandoned",
        summary.attempts,
        summary.published,
        summary.aborted
    );

    tear_down(session, host).await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::command().get_matches();

    let level = if cli::verbose(&matches) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(cli::log_destination(&matches), level, Path::new(LOG_FILE));

    match matches.subcommand() {
        Some(("replay", sub)) => {
            let options = cli::replay_options(sub).context("--before is required")?;
            let record = replay::replay(&options).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Some(("run", sub)) => harvest(cli::run_options(sub)).await,
        _ => harvest(RunOptions::default()).await,
    }
}

use anyhow::{Context, Result};
use cracker_core::{PuzzleRecord, PuzzleSelectors, WindowGeometry};
use cracker_harvester::{extract, reveal_and_capture};
use cracker_snapshot::{Snapshot, SnapshotViewport};
use std::time::Duration;

use crate::cli::ReplayOptions;

/// Runs the extractor and the revealer against saved pages.
pub async fn replay(options: &ReplayOptions) -> Result<PuzzleRecord> {
    let before = std::fs::read_to_string(&options.before)
        .with_context(|| format!("reading {}", options.before.display()))?;
    let mut snapshot = Snapshot::new(before);
    if let Some(after) = &options.after {
        let after = std::fs::read_to_string(after)
            .with_context(|| format!("reading {}", after.display()))?;
        snapshot = snapshot.with_reveal(after);
    }

    let viewport = SnapshotViewport::open(snapshot, WindowGeometry::sink());
    let selectors = PuzzleSelectors::default();
    let head = extract(&viewport, &selectors).await?;
    let solution = reveal_and_capture(&viewport, &selectors, head.boundary, Duration::ZERO).await?;
    Ok(PuzzleRecord::assemble(head, &solution))
}

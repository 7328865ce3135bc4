//! The puzzle harvesting cycle: open a puzzle window, wait for it to render,
//! read the puzzle, reveal the solution, hand the record to a sink, repeat.

pub mod extract;
pub mod readiness;
pub mod session;

pub use extract::{extract, reveal_and_capture, solution_moves};
pub use readiness::{missing_elements, wait_until_ready};
pub use session::{CycleState, RunSummary, Session};

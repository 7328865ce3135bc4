#![allow(dead_code)]

use async_trait::async_trait;
use cracker_core::{HarvestConfig, HarvestError, PuzzleRecord, TimeoutConfig};
use cracker_snapshot::Snapshot;
use cracker_storage::Sink;
use std::sync::{Arc, Mutex};

pub struct Page<'a> {
    pub key: &'a str,
    pub game_type: &'a str,
    pub white: &'a str,
    pub black: &'a str,
    pub moves: &'a [&'a str],
    pub reveal_control: bool,
}

impl Default for Page<'_> {
    fn default() -> Self {
        Self {
            key: "abcde12345",
            game_type: "1200 • Rated",
            white: "magnus(2800)",
            black: "hikaru(2750)",
            moves: &["e4", "e5", "Nf3", "Nc6"],
            reveal_control: true,
        }
    }
}

impl Page<'_> {
    pub fn html(&self) -> String {
        let moves: String = self
            .moves
            .iter()
            .map(|m| format!("<move>{}</move>", m))
            .collect();
        let reveal = if self.reveal_control {
            r#"<div class="view_solution"><a class="button">View the solution</a></div>"#
        } else {
            ""
        };
        format!(
            r#"<html><body>
<div class="infos puzzle"><p>Puzzle</p><a href="/training/{key}">#{key}</a></div>
<div class="infos"><span>{game_type}</span></div>
<div class="players"><a class="user-link">{white}</a><a class="user-link">{black}</a></div>
<div class="moves">{moves}</div>
{reveal}
</body></html>"#,
            key = self.key,
            game_type = self.game_type,
            white = self.white,
            black = self.black,
            moves = moves,
            reveal = reveal,
        )
    }

    /// This page before the reveal, and the same page with `solution` appended after it.
    pub fn snapshot(&self, solution: &[&str]) -> Snapshot {
        let all: Vec<&str> = self.moves.iter().chain(solution).copied().collect();
        let after = Page { moves: &all, ..*self };
        Snapshot::new(self.html()).with_reveal(after.html())
    }
}

pub fn good_puzzle() -> Snapshot {
    Page::default().snapshot(&["Bb5\n✓", "a6"])
}

pub fn unrated_puzzle() -> Snapshot {
    Page { white: "magnus", ..Page::default() }.snapshot(&["Bb5\n✓", "a6"])
}

pub fn expected_record() -> PuzzleRecord {
    PuzzleRecord {
        game_type: "Rated".into(),
        white_name: "magnus".into(),
        white_elo: "2800".into(),
        black_name: "hikaru".into(),
        black_elo: "2750".into(),
        game_key: "abcde12345".into(),
        problem: "e4,e5,Nf3,Nc6".into(),
        solution: "Bb5,a6".into(),
    }
}

pub fn config() -> HarvestConfig {
    HarvestConfig::default().with_timeouts(TimeoutConfig::immediate())
}

#[derive(Default, Clone)]
pub struct CollectingSink {
    records: Arc<Mutex<Vec<PuzzleRecord>>>,
}

impl CollectingSink {
    pub fn records(&self) -> Vec<PuzzleRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sink for CollectingSink {
    async fn publish(&mut self, record: &PuzzleRecord) -> Result<(), HarvestError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub struct FailingSink(pub HarvestError);

#[async_trait]
impl Sink for FailingSink {
    async fn publish(&mut self, _record: &PuzzleRecord) -> Result<(), HarvestError> {
        Err(self.0.clone())
    }
}

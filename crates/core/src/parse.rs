//! Label cleanup for the text scraped off a puzzle page.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static GAME_TYPE_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d+•\s]").expect("valid pattern"));
static LEADING_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w*").expect("valid pattern"));
static RATING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\)").expect("valid pattern"));
static MOVE_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+|✓").expect("valid pattern"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("player label {0:?} has no parenthesized rating")]
    MissingRating(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerLabel {
    pub name: String,
    pub elo: String,
}

/// `"1200 • Rated"` becomes `"Rated"`.
pub fn game_type(label: &str) -> String {
    GAME_TYPE_NOISE.replace_all(label, "").into_owned()
}

/// Splits `NAME(ELO)` into its name token and rating digits.
pub fn player(label: &str) -> Result<PlayerLabel, LabelError> {
    let label = label.trim();
    let elo = RATING
        .captures(label)
        .and_then(|c| c.get(1))
        .ok_or_else(|| LabelError::MissingRating(label.to_string()))?
        .as_str()
        .to_string();
    let name = LEADING_WORD
        .find(label)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    Ok(PlayerLabel { name, elo })
}

/// Drops the single-character prefix (`#`) in front of the game identifier.
pub fn game_key(label: &str) -> String {
    label.trim().chars().skip(1).collect()
}

/// Strips line breaks and the confirmation glyph the site appends to solved moves.
pub fn clean_move(text: &str) -> String {
    MOVE_NOISE.replace_all(text, "").trim().to_string()
}

pub fn join_moves<S: AsRef<str>>(moves: &[S]) -> String {
    moves
        .iter()
        .map(|m| m.as_ref())
        .collect::<Vec<_>>()
        .join(",")
}

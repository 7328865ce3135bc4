use serde::{Deserialize, Serialize};

use crate::parse::join_moves;

/// Everything read off the puzzle page before the solution is revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleHead {
    pub game_type: String,
    pub white_name: String,
    pub white_elo: String,
    pub black_name: String,
    pub black_elo: String,
    pub game_key: String,
    pub problem: Vec<String>,
    /// Number of move elements rendered before the reveal action
    pub boundary: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleRecord {
    pub game_type: String,
    pub white_name: String,
    pub white_elo: String,
    pub black_name: String,
    pub black_elo: String,
    pub game_key: String,
    pub problem: String,
    pub solution: String,
}

impl PuzzleRecord {
    pub fn assemble(head: PuzzleHead, solution: &[String]) -> Self {
        Self {
            game_type: head.game_type,
            white_name: head.white_name,
            white_elo: head.white_elo,
            black_name: head.black_name,
            black_elo: head.black_elo,
            game_key: head.game_key,
            problem: join_moves(&head.problem),
            solution: join_moves(solution),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn head() -> PuzzleHead {
        PuzzleHead {
            game_type: "Rated".into(),
            white_name: "magnus".into(),
            white_elo: "2800".into(),
            black_name: "hikaru".into(),
            black_elo: "2750".into(),
            game_key: "abcde12345".into(),
            problem: vec!["e4".into(), "e5".into()],
            boundary: 2,
        }
    }

    #[test]
    fn json_keeps_field_order() {
        let record = PuzzleRecord::assemble(head(), &["Nf3".to_string()]);
        assert_eq!(
            record.to_json().unwrap(),
            r#"{"game_type":"Rated","white_name":"magnus","white_elo":"2800","black_name":"hikaru","black_elo":"2750","game_key":"abcde12345","problem":"e4,e5","solution":"Nf3"}"#
        );
    }

    #[test]
    fn empty_solution_serializes_as_empty_string() {
        let record = PuzzleRecord::assemble(head(), &[]);
        assert_eq!(record.solution, "");
        assert_eq!(record.problem, "e4,e5");
    }
}

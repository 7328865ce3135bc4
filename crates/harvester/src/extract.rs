use cracker_core::parse::{self, PlayerLabel};
use cracker_core::{HarvestError, Locator, PuzzleHead, PuzzleSelectors, Viewport};
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;

async fn required_text<V: Viewport + ?Sized>(
    viewport: &V,
    what: &str,
    locator: &Locator,
) -> Result<String, HarvestError> {
    viewport
        .read_text(locator)
        .await?
        .ok_or_else(|| HarvestError::missing_element(what, locator.to_string()))
}

async fn player<V: Viewport + ?Sized>(
    viewport: &V,
    what: &str,
    locator: &Locator,
) -> Result<PlayerLabel, HarvestError> {
    let label = required_text(viewport, what, locator).await?;
    parse::player(&label).map_err(|e| {
        HarvestError::mismatch(e.to_string())
            .with_context(json!({ "element": what, "label": label }))
    })
}

/// Reads the puzzle metadata and the moves rendered so far. The number of
/// moves becomes the boundary between problem and solution.
pub async fn extract<V: Viewport + ?Sized>(
    viewport: &V,
    selectors: &PuzzleSelectors,
) -> Result<PuzzleHead, HarvestError> {
    let game_type_label = required_text(viewport, "game type label", &selectors.game_type).await?;
    let game_type = parse::game_type(&game_type_label);
    let white = player(viewport, "white player label", &selectors.white).await?;
    let black = player(viewport, "black player label", &selectors.black).await?;
    let game_id_label = required_text(viewport, "game identifier", &selectors.game_id).await?;
    let game_key = parse::game_key(&game_id_label);

    let problem: Vec<String> = viewport
        .read_all(&selectors.moves)
        .await?
        .iter()
        .map(|m| m.trim().to_string())
        .collect();
    let boundary = problem.len();

    Ok(PuzzleHead {
        game_type,
        white_name: white.name,
        white_elo: white.elo,
        black_name: black.name,
        black_elo: black.elo,
        game_key,
        problem,
        boundary,
    })
}

/// Clicks the reveal control once and returns the moves it added.
pub async fn reveal_and_capture<V: Viewport + ?Sized>(
    viewport: &V,
    selectors: &PuzzleSelectors,
    boundary: usize,
    settle: Duration,
) -> Result<Vec<String>, HarvestError> {
    if !viewport.activate(&selectors.reveal).await? {
        return Err(HarvestError::missing_element(
            "reveal control",
            selectors.reveal.to_string(),
        ));
    }
    if !settle.is_zero() {
        sleep(settle).await;
    }
    let moves = viewport.read_all(&selectors.moves).await?;
    solution_moves(&moves, boundary)
}

/// Everything at or past `boundary`, cleaned.
pub fn solution_moves(moves: &[String], boundary: usize) -> Result<Vec<String>, HarvestError> {
    let revealed = moves.get(boundary..).ok_or_else(|| {
        HarvestError::mismatch(format!(
            "move list shrank from {} to {} after the reveal",
            boundary,
            moves.len()
        ))
    })?;
    Ok(revealed.iter().map(|m| parse::clean_move(m)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cracker_core::ErrorCategory;

    fn moves(list: &[&str]) -> Vec<String> {
        list.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn solution_is_everything_past_the_boundary() {
        let all = moves(&["e4", "e5", "Nf3", "Nc6", "Bb5\n✓", "a6"]);
        assert_eq!(solution_moves(&all, 4).unwrap(), vec!["Bb5", "a6"]);
    }

    #[test]
    fn split_is_strict_and_non_overlapping() {
        let all = moves(&["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]);
        for boundary in 0..=all.len() {
            let solution = solution_moves(&all, boundary).unwrap();
            let problem = &all[..boundary];
            assert_eq!(problem.len() + solution.len(), all.len());
            let mut rejoined = problem.to_vec();
            rejoined.extend(solution);
            assert_eq!(rejoined, all);
        }
    }

    #[test]
    fn unchanged_list_gives_empty_solution() {
        let all = moves(&["e4", "e5"]);
        assert!(solution_moves(&all, 2).unwrap().is_empty());
    }

    #[test]
    fn shrunken_list_is_a_mismatch() {
        let err = solution_moves(&moves(&["e4"]), 2).unwrap_err();
        assert_eq!(err.category, ErrorCategory::StructuralMismatch);
    }
}

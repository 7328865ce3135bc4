mod common;

use std::time::Duration;

use common::{good_puzzle, Page};
use cracker_core::{ErrorCategory, PuzzleRecord, PuzzleSelectors, Viewport, WindowGeometry};
use cracker_harvester::{extract, missing_elements, reveal_and_capture};
use cracker_snapshot::{Snapshot, SnapshotViewport};
use pretty_assertions::assert_eq;

fn open(snapshot: Snapshot) -> SnapshotViewport {
    SnapshotViewport::open(snapshot, WindowGeometry::sink())
}

#[tokio::test]
async fn head_holds_metadata_and_pre_reveal_moves() {
    let vp = open(good_puzzle());
    let head = extract(&vp, &PuzzleSelectors::default()).await.unwrap();

    assert_eq!(head.game_type, "Rated");
    assert_eq!((head.white_name.as_str(), head.white_elo.as_str()), ("magnus", "2800"));
    assert_eq!((head.black_name.as_str(), head.black_elo.as_str()), ("hikaru", "2750"));
    assert_eq!(head.game_key, "abcde12345");
    assert_eq!(head.problem, vec!["e4", "e5", "Nf3", "Nc6"]);
    assert_eq!(head.boundary, 4);
    assert!(!vp.state().is_revealed());
}

#[tokio::test]
async fn reveal_returns_only_the_new_moves() {
    let vp = open(good_puzzle());
    let selectors = PuzzleSelectors::default();
    let head = extract(&vp, &selectors).await.unwrap();
    let solution = reveal_and_capture(&vp, &selectors, head.boundary, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(solution, vec!["Bb5", "a6"]);
    let record = PuzzleRecord::assemble(head, &solution);
    assert_eq!(record.problem, "e4,e5,Nf3,Nc6");
    assert_eq!(record.solution, "Bb5,a6");
}

#[tokio::test]
async fn black_label_without_rating_is_a_mismatch() {
    let vp = open(Page { black: "hikaru", ..Page::default() }.snapshot(&[]));
    let err = extract(&vp, &PuzzleSelectors::default()).await.unwrap_err();

    assert_eq!(err.category, ErrorCategory::StructuralMismatch);
    assert_eq!(err.context["element"], "black player label");
    assert_eq!(err.context["label"], "hikaru");
}

#[tokio::test]
async fn missing_player_element_is_a_mismatch() {
    let html = Page::default().html().replace(r#"<a class="user-link">hikaru(2750)</a>"#, "");
    let vp = open(Snapshot::new(html));
    let err = extract(&vp, &PuzzleSelectors::default()).await.unwrap_err();

    assert_eq!(err.category, ErrorCategory::StructuralMismatch);
    assert_eq!(err.context["selector"], ".user-link[1]");
}

#[tokio::test]
async fn reveal_without_control_is_a_mismatch() {
    let vp = open(Snapshot::new(Page { reveal_control: false, ..Page::default() }.html()));
    let err = reveal_and_capture(&vp, &PuzzleSelectors::default(), 4, Duration::ZERO)
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::StructuralMismatch);
}

#[tokio::test]
async fn readiness_lists_every_missing_element() {
    let vp = open(Snapshot::blank());
    let missing = missing_elements(&vp, &PuzzleSelectors::default()).await.unwrap();
    assert_eq!(
        missing,
        vec![
            "game type label",
            "white player label",
            "black player label",
            "game identifier",
            "reveal control",
            "move list",
        ]
    );

    let ready = open(good_puzzle());
    assert!(missing_elements(&ready, &PuzzleSelectors::default())
        .await
        .unwrap()
        .is_empty());
    ready.close().await.unwrap();
}

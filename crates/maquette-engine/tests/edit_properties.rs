//! Property and table tests for the edit engine's core invariants.

use maquette_engine::{ErrorKind, VirtualFs};
use maquette_engine::tools::EditEngine;
use maquette_types::LineRange;
use proptest::prelude::*;
use rstest::rstest;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime")
        .block_on(future)
}

// ============================================================================
// Property: create then view returns exactly the written content
// ============================================================================

proptest! {
    #[test]
    fn prop_create_view_round_trips(content in ".*") {
        block_on(async {
            let vfs = VirtualFs::new();
            let engine = EditEngine::new();
            engine.create(&vfs, "/App.jsx", &content).await.unwrap();
            let viewed = engine.view(&vfs, "/App.jsx", None).await.unwrap();
            prop_assert_eq!(viewed, content);
            Ok(())
        })?;
    }

    // ========================================================================
    // Property: replace succeeds iff the match occurs exactly once, and
    // substitutes only that occurrence
    // ========================================================================

    #[test]
    fn prop_replace_unique_occurrence(
        prefix in "[a-z \n]{0,40}",
        suffix in "[a-z \n]{0,40}",
        replacement in "[a-z]{0,10}",
    ) {
        // The needle's alphabet is disjoint from prefix/suffix, so it
        // occurs exactly once by construction.
        let needle = "NEEDLE";
        let content = format!("{prefix}{needle}{suffix}");
        block_on(async {
            let vfs = VirtualFs::new();
            let engine = EditEngine::new();
            engine.create(&vfs, "/a.jsx", &content).await.unwrap();
            engine.replace(&vfs, "/a.jsx", needle, &replacement).await.unwrap();
            let got = vfs.read("/a.jsx").await.unwrap();
            prop_assert_eq!(got, format!("{prefix}{replacement}{suffix}"));
            Ok(())
        })?;
    }

    #[test]
    fn prop_replace_absent_match_changes_nothing(content in "[a-z \n]{0,60}") {
        block_on(async {
            let vfs = VirtualFs::new();
            let engine = EditEngine::new();
            engine.create(&vfs, "/a.jsx", &content).await.unwrap();
            let err = engine.replace(&vfs, "/a.jsx", "NEEDLE", "x").await.unwrap_err();
            prop_assert_eq!(err.kind, ErrorKind::NotFound);
            let content_after = vfs.read("/a.jsx").await.unwrap();
            prop_assert_eq!(content_after, content);
            Ok(())
        })?;
    }

    // ========================================================================
    // Property: undo immediately after any successful mutating command
    // restores the exact prior content
    // ========================================================================

    #[test]
    fn prop_undo_restores_prior_content(
        original in ".{0,60}",
        mutated in ".{0,60}",
        line in 0u32..10,
    ) {
        block_on(async {
            let vfs = VirtualFs::new();
            let engine = EditEngine::new();

            // create-over-existing
            engine.create(&vfs, "/a.jsx", &original).await.unwrap();
            engine.create(&vfs, "/a.jsx", &mutated).await.unwrap();
            engine.undo_edit(&vfs, "/a.jsx").await.unwrap();
            prop_assert_eq!(vfs.read("/a.jsx").await.unwrap(), original.as_str());

            // insert
            engine.insert(&vfs, "/a.jsx", line, &mutated).await.unwrap();
            engine.undo_edit(&vfs, "/a.jsx").await.unwrap();
            prop_assert_eq!(vfs.read("/a.jsx").await.unwrap(), original.as_str());
            Ok(())
        })?;
    }
}

// ============================================================================
// Insert position grid: 0 prepends, past-EOF appends, middle splices
// ============================================================================

#[rstest]
#[case::prepend(0, "x\na\nb\nc")]
#[case::after_first(1, "a\nx\nb\nc")]
#[case::after_second(2, "a\nb\nx\nc")]
#[case::at_eof(3, "a\nb\nc\nx")]
#[case::past_eof(99, "a\nb\nc\nx")]
#[tokio::test]
async fn test_insert_positions(#[case] after_line: u32, #[case] expected: &str) {
    let vfs = VirtualFs::new();
    let engine = EditEngine::new();
    engine.create(&vfs, "/a.jsx", "a\nb\nc").await.unwrap();
    engine.insert(&vfs, "/a.jsx", after_line, "x").await.unwrap();
    assert_eq!(vfs.read("/a.jsx").await.unwrap(), expected);
}

// ============================================================================
// View range grid: 1-indexed, inclusive, clamped at both ends
// ============================================================================

#[rstest]
#[case::single_line(2, Some(2), "two")]
#[case::middle_slice(2, Some(3), "two\nthree")]
#[case::start_clamped_up(0, Some(1), "one")]
#[case::end_clamped_down(3, Some(99), "three\nfour")]
#[case::to_eof(2, None, "two\nthree\nfour")]
#[case::inverted_selects_nothing(4, Some(2), "")]
#[tokio::test]
async fn test_view_ranges(
    #[case] start: u32,
    #[case] end: Option<u32>,
    #[case] expected: &str,
) {
    let vfs = VirtualFs::new();
    let engine = EditEngine::new();
    engine
        .create(&vfs, "/a.jsx", "one\ntwo\nthree\nfour")
        .await
        .unwrap();
    let viewed = engine
        .view(&vfs, "/a.jsx", Some(LineRange { start, end }))
        .await
        .unwrap();
    assert_eq!(viewed, expected);
}

//! Tests of the maintenance operations against the in-memory backend.

use placar_ingest::cleanup::{CleanupRunner, RESET_TABLE_ORDER};
use placar_ingest::testing_utils::InMemoryBackend;
use std::sync::Arc;

fn runner_for(backend: &Arc<InMemoryBackend>) -> CleanupRunner {
    CleanupRunner::new(backend.clone(), backend.clone())
}

#[tokio::test]
async fn test_duplicate_removal_keeps_the_earliest_row() {
    let backend = Arc::new(InMemoryBackend::new());
    let original = backend.seed_match(1, 2, "SUB-13", "2025-03-09", 3, 1);
    let duplicate = backend.seed_match(1, 2, "SUB-13", "2025-03-09", 3, 1);
    let unrelated = backend.seed_match(2, 1, "SUB-13", "2025-03-09", 0, 0);

    let report = runner_for(&backend).remove_duplicate_matches().await;
    assert!(report.success());

    let remaining: Vec<_> = backend.matches().iter().map(|m| m.id).collect();
    assert!(remaining.contains(&original));
    assert!(!remaining.contains(&duplicate));
    assert!(remaining.contains(&unrelated));
    assert_eq!(remaining.len(), 2);

    // Deleting rows dirties the standings, so one recalculation runs
    assert_eq!(backend.recalc_count(), 1);
}

#[tokio::test]
async fn test_duplicate_removal_is_idempotent() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.seed_match(1, 2, "SUB-11", "2025-02-22", 2, 2);
    backend.seed_match(1, 2, "SUB-11", "2025-02-22", 2, 2);

    let runner = runner_for(&backend);
    let first = runner.remove_duplicate_matches().await;
    assert!(first.success());
    assert_eq!(backend.matches().len(), 1);
    assert_eq!(backend.recalc_count(), 1);

    // Second run finds nothing to do and triggers no recalculation
    let second = runner.remove_duplicate_matches().await;
    assert!(second.success());
    assert_eq!(backend.matches().len(), 1);
    assert_eq!(backend.recalc_count(), 1);
}

#[tokio::test]
async fn test_same_teams_on_another_date_is_not_a_duplicate() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.seed_match(1, 2, "SUB-13", "2025-02-22", 1, 0);
    backend.seed_match(1, 2, "SUB-13", "2025-03-09", 2, 0);
    // Same pairing, different category
    backend.seed_match(1, 2, "SUB-11", "2025-02-22", 0, 0);

    let report = runner_for(&backend).remove_duplicate_matches().await;
    assert!(report.success());
    assert_eq!(backend.matches().len(), 3);
}

#[tokio::test]
async fn test_fix_legacy_dates_moves_each_row_exactly_once() {
    let backend = Arc::new(InMemoryBackend::new());
    let from_feb_21 = backend.seed_match(1, 2, "SUB-11", "2025-02-21", 1, 0);
    let from_feb_22 = backend.seed_match(3, 4, "SUB-11", "2025-02-22", 2, 0);
    let from_mar_07 = backend.seed_match(1, 2, "SUB-13", "2025-03-07", 0, 0);
    let from_mar_08 = backend.seed_match(3, 4, "SUB-13", "2025-03-08", 1, 1);
    let untouched = backend.seed_match(1, 4, "SUB-13", "2025-03-09", 5, 0);

    let report = runner_for(&backend).fix_legacy_dates().await;
    assert!(report.success());

    let date_of = |id| {
        backend
            .matches()
            .iter()
            .find(|m| m.id == id)
            .unwrap()
            .key
            .date
            .to_string()
    };
    // 02-21 lands on 02-22 and must NOT cascade onward to 02-23
    assert_eq!(date_of(from_feb_21), "2025-02-22");
    assert_eq!(date_of(from_feb_22), "2025-02-23");
    assert_eq!(date_of(from_mar_07), "2025-03-08");
    assert_eq!(date_of(from_mar_08), "2025-03-09");
    assert_eq!(date_of(untouched), "2025-03-09");
}

#[tokio::test]
async fn test_fix_legacy_dates_with_nothing_to_do_reports_per_date() {
    let backend = Arc::new(InMemoryBackend::new());
    let report = runner_for(&backend).fix_legacy_dates().await;
    assert!(report.success());
    // One step per override entry
    assert_eq!(report.steps.len(), 4);
    assert!(report.steps.iter().all(|s| s.detail.contains("no matches")));
}

#[tokio::test]
async fn test_ghost_match_removal_targets_only_the_bad_dates_and_categories() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.seed_match(1, 2, "SUB-11", "2025-02-22", 1, 0);
    backend.seed_match(3, 4, "SUB-13", "2025-02-23", 2, 2);
    backend.seed_match(1, 4, "SUB-11", "2025-03-08", 0, 1);
    // Outside the bad dates
    let survivor_date = backend.seed_match(1, 2, "SUB-13", "2025-03-09", 3, 0);
    // On a bad date but not an affected category
    let survivor_category = backend.seed_match(3, 2, "SUB-15", "2025-02-22", 1, 1);

    let report = runner_for(&backend).remove_ghost_matches().await;
    assert!(report.success());

    let remaining: Vec<_> = backend.matches().iter().map(|m| m.id).collect();
    assert_eq!(remaining, vec![survivor_date, survivor_category]);
    assert_eq!(backend.recalc_count(), 1);
}

#[tokio::test]
async fn test_ghost_match_removal_is_idempotent() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.seed_match(1, 2, "SUB-11", "2025-02-22", 1, 0);

    let runner = runner_for(&backend);
    runner.remove_ghost_matches().await;
    let second = runner.remove_ghost_matches().await;
    assert!(second.success());
    assert!(backend.matches().is_empty());
    // No rows removed on the second pass, so no further recalculation
    assert_eq!(backend.recalc_count(), 1);
}

#[tokio::test]
async fn test_full_reset_clears_tables_in_dependency_order() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.seed_match(1, 2, "SUB-11", "2025-02-22", 1, 0);

    let report = runner_for(&backend).full_reset().await;
    assert!(report.success());
    assert_eq!(backend.cleared_tables(), RESET_TABLE_ORDER.to_vec());
    assert!(backend.matches().is_empty());
}

#[tokio::test]
async fn test_full_reset_continues_past_a_failing_table() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.seed_match(1, 2, "SUB-11", "2025-02-22", 1, 0);
    backend.fail_table_clear("standings");

    let report = runner_for(&backend).full_reset().await;
    assert!(!report.success());

    // Every table still gets its own step, and the tables after the failing
    // one were still cleared
    assert_eq!(report.steps.len(), RESET_TABLE_ORDER.len());
    let failed: Vec<_> = report
        .steps
        .iter()
        .filter(|s| !s.success)
        .map(|s| s.label.as_str())
        .collect();
    assert_eq!(failed, vec!["standings"]);
    assert!(backend.matches().is_empty());
}

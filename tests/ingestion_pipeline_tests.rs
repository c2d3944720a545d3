//! End-to-end tests of the parse → normalize → upsert pipeline against the
//! in-memory backend.

use placar_ingest::ingest::models::{MatchStatus, UpsertAction};
use placar_ingest::ingest::parse_round_listing;
use placar_ingest::ingest::upsert::UpsertEngine;
use placar_ingest::testing_utils::{InMemoryBackend, TestDataBuilder};
use std::sync::Arc;

fn engine_for(backend: &Arc<InMemoryBackend>) -> UpsertEngine {
    UpsertEngine::new(backend.clone(), backend.clone())
}

fn seeded_backend() -> Arc<InMemoryBackend> {
    Arc::new(InMemoryBackend::with_teams(&[
        ("Federal", 1),
        ("Estrela Vermelha", 2),
        ("Unidos da Vila", 3),
    ]))
}

#[tokio::test]
async fn test_full_pipeline_from_text_to_persisted_matches() {
    let backend = seeded_backend();
    let engine = engine_for(&backend);

    let listing = parse_round_listing(
        "RODADA 3 08/03/2025\n\
         Federal 3x1 Estrela Vermelha - SUB-13\n\
         Unidos da Vila 0x2 Federal - SUB-11\n",
    );
    assert_eq!(listing.drafts.len(), 2);

    let report = engine.ingest_batch(&listing.drafts).await;
    assert!(report.success());
    assert_eq!(report.attempted(), 2);
    assert!(report.outcomes.iter().all(|o| o.action == Some(UpsertAction::Inserted)));

    let matches = backend.matches();
    assert_eq!(matches.len(), 2);

    let first = &matches[0];
    assert_eq!(first.key.home_team_id, 1);
    assert_eq!(first.key.away_team_id, 2);
    assert_eq!(first.key.category, "SUB-13");
    // The 08/03 header date is one of the known miscoded dates
    assert_eq!(first.key.date, "2025-03-09".parse().unwrap());
    assert_eq!((first.home_score, first.away_score), (3, 1));
    assert_eq!(first.status, MatchStatus::Completed);
    assert_eq!(first.round.as_deref(), Some("Rodada 3"));

    // One recalculation per completed write plus the unconditional
    // end-of-batch one
    assert_eq!(backend.recalc_count(), 3);
}

#[tokio::test]
async fn test_reingesting_the_same_listing_updates_instead_of_duplicating() {
    let backend = seeded_backend();
    let engine = engine_for(&backend);

    let text = "RODADA 3 08/03/2025\nFederal 3x1 Estrela Vermelha - SUB-13\n";
    let first = engine.ingest_batch(&parse_round_listing(text).drafts).await;
    assert!(first.success());
    assert_eq!(first.outcomes[0].action, Some(UpsertAction::Inserted));

    let second = engine.ingest_batch(&parse_round_listing(text).drafts).await;
    assert!(second.success());
    assert_eq!(second.outcomes[0].action, Some(UpsertAction::Updated));

    let matches = backend.matches();
    assert_eq!(matches.len(), 1);
    assert_eq!((matches[0].home_score, matches[0].away_score), (3, 1));
}

#[tokio::test]
async fn test_reingesting_with_corrected_score_overwrites() {
    let backend = seeded_backend();
    let engine = engine_for(&backend);

    let drafts = vec![TestDataBuilder::create_completed_draft(
        "Federal",
        "Estrela Vermelha",
        3,
        1,
        "SUB-13",
        "2025-03-09",
    )];
    engine.ingest_batch(&drafts).await;

    let corrected = vec![TestDataBuilder::create_completed_draft(
        "Federal",
        "Estrela Vermelha",
        4,
        1,
        "SUB-13",
        "2025-03-09",
    )];
    let report = engine.ingest_batch(&corrected).await;
    assert!(report.success());

    let matches = backend.matches();
    assert_eq!(matches.len(), 1);
    assert_eq!((matches[0].home_score, matches[0].away_score), (4, 1));
}

#[tokio::test]
async fn test_unknown_team_fails_only_its_own_draft() {
    let backend = seeded_backend();
    let engine = engine_for(&backend);

    let drafts = vec![
        TestDataBuilder::create_completed_draft(
            "Federal",
            "Estrela Vermelha",
            2,
            0,
            "SUB-11",
            "2025-03-09",
        ),
        TestDataBuilder::create_completed_draft(
            "Federal",
            "Time Fantasma",
            1,
            1,
            "SUB-11",
            "2025-03-09",
        ),
        TestDataBuilder::create_completed_draft(
            "Unidos da Vila",
            "Federal",
            0,
            3,
            "SUB-13",
            "2025-03-09",
        ),
    ];

    let report = engine.ingest_batch(&drafts).await;
    assert!(!report.success());
    assert_eq!(report.attempted(), 3);
    assert_eq!(report.failed(), 1);

    let failed = report.outcomes.iter().find(|o| !o.success).unwrap();
    assert!(failed.message.contains("team not found: Time Fantasma"));
    assert!(failed.action.is_none());

    // The other two drafts persisted independently
    assert_eq!(backend.matches().len(), 2);
    // Two successful completed writes plus the final recalculation
    assert_eq!(backend.recalc_count(), 3);
}

#[tokio::test]
async fn test_empty_batch_still_runs_the_final_recalculation() {
    let backend = seeded_backend();
    let engine = engine_for(&backend);

    let report = engine.ingest_batch(&[]).await;
    assert!(report.success());
    assert_eq!(report.attempted(), 0);
    assert_eq!(backend.recalc_count(), 1);
}

#[tokio::test]
async fn test_recalculation_failure_is_a_warning_not_a_write_failure() {
    let backend = seeded_backend();
    backend.fail_recalculations();
    let engine = engine_for(&backend);

    let drafts = vec![TestDataBuilder::create_completed_draft(
        "Federal",
        "Estrela Vermelha",
        1,
        0,
        "SUB-11",
        "2025-03-09",
    )];
    let report = engine.ingest_batch(&drafts).await;

    // The write stands; the recalculation failure surfaces as warnings
    assert!(report.success());
    assert!(report.outcomes[0].recalc_warning.is_some());
    assert!(report.final_recalc_warning.is_some());
    assert_eq!(backend.matches().len(), 1);
}

#[tokio::test]
async fn test_garbage_input_produces_no_drafts_and_no_writes() {
    let backend = seeded_backend();
    let engine = engine_for(&backend);

    let listing = parse_round_listing("nothing to see here\njust prose\n");
    assert!(listing.drafts.is_empty());
    assert_eq!(listing.skipped_lines, 2);

    let report = engine.ingest_batch(&listing.drafts).await;
    assert!(report.success());
    assert!(backend.matches().is_empty());
}

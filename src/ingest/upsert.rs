//! Idempotent match upsert engine.
//!
//! Drafts are processed strictly one at a time, in source order, so the
//! standings recalculation side effect never races with a concurrent write.
//! Identity is the natural key (home team, away team, category, date):
//! re-ingesting the same listing rewrites scores on the existing rows instead
//! of duplicating them.

use crate::backend::{MatchStore, MatchUpdate, NaturalKey, NewMatch, StandingsRecalculator};
use crate::ingest::models::{BatchReport, DraftOutcome, MatchDraft, MatchStatus, UpsertAction};
use std::sync::Arc;
use tracing::{info, warn};

pub struct UpsertEngine {
    store: Arc<dyn MatchStore>,
    standings: Arc<dyn StandingsRecalculator>,
}

impl UpsertEngine {
    pub fn new(store: Arc<dyn MatchStore>, standings: Arc<dyn StandingsRecalculator>) -> Self {
        UpsertEngine { store, standings }
    }

    /// Persists a batch of drafts sequentially and aggregates per-draft
    /// outcomes.
    ///
    /// A failed draft never aborts the batch. After the last draft the
    /// standings are recalculated once more unconditionally, so the tables
    /// end up consistent even if individual per-write triggers failed.
    pub async fn ingest_batch(&self, drafts: &[MatchDraft]) -> BatchReport {
        let mut outcomes = Vec::with_capacity(drafts.len());
        for draft in drafts {
            outcomes.push(self.upsert_draft(draft).await);
        }

        let final_recalc_warning = match self.standings.recalculate().await {
            Ok(()) => None,
            Err(e) => {
                warn!("end-of-batch standings recalculation failed: {e}");
                Some(format!("standings recalculation failed: {e}"))
            }
        };

        let report = BatchReport {
            outcomes,
            final_recalc_warning,
        };
        info!(
            "batch finished: {} attempted, {} failed",
            report.attempted(),
            report.failed()
        );
        report
    }

    /// Resolves teams, decides insert vs. update by natural key, persists,
    /// and triggers the standings recalculation for completed results.
    async fn upsert_draft(&self, draft: &MatchDraft) -> DraftOutcome {
        let fixture = draft.fixture_label();

        let home_id = match self.store.lookup_team_by_name(&draft.home_team).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                return DraftOutcome::failure(
                    fixture,
                    format!("team not found: {}", draft.home_team),
                );
            }
            Err(e) => {
                return DraftOutcome::failure(
                    fixture,
                    format!("team lookup failed for '{}': {e}", draft.home_team),
                );
            }
        };
        let away_id = match self.store.lookup_team_by_name(&draft.away_team).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                return DraftOutcome::failure(
                    fixture,
                    format!("team not found: {}", draft.away_team),
                );
            }
            Err(e) => {
                return DraftOutcome::failure(
                    fixture,
                    format!("team lookup failed for '{}': {e}", draft.away_team),
                );
            }
        };

        let key = NaturalKey {
            home_team_id: home_id,
            away_team_id: away_id,
            category: draft.category.clone(),
            date: draft.date,
        };

        let existing = match self.store.find_match(&key).await {
            Ok(existing) => existing,
            Err(e) => {
                return DraftOutcome::failure(fixture, format!("match lookup failed: {e}"));
            }
        };

        let action = match existing {
            Some(id) => {
                let update = MatchUpdate {
                    home_score: draft.home_score,
                    away_score: draft.away_score,
                    status: draft.status,
                    round: draft.round.clone(),
                };
                if let Err(e) = self.store.update_match(id, &update).await {
                    return DraftOutcome::failure(fixture, format!("update failed: {e}"));
                }
                info!("updated existing match {id}: {fixture}");
                UpsertAction::Updated
            }
            None => {
                let new_match = NewMatch {
                    home_team_id: home_id,
                    away_team_id: away_id,
                    category: draft.category.clone(),
                    date: draft.date,
                    home_score: draft.home_score,
                    away_score: draft.away_score,
                    status: draft.status,
                    round: draft.round.clone(),
                    time: draft.time.clone(),
                    location: draft.location.clone(),
                };
                match self.store.insert_match(&new_match).await {
                    Ok(id) => {
                        info!("inserted match {id}: {fixture}");
                        UpsertAction::Inserted
                    }
                    Err(e) => {
                        return DraftOutcome::failure(fixture, format!("insert failed: {e}"));
                    }
                }
            }
        };

        // The write stands even when the recalculation fails; the failure is
        // surfaced as a warning on the outcome
        let recalc_warning = if draft.status == MatchStatus::Completed {
            match self.standings.recalculate().await {
                Ok(()) => None,
                Err(e) => {
                    warn!("standings recalculation failed after {fixture}: {e}");
                    Some(format!("standings recalculation failed: {e}"))
                }
            }
        } else {
            None
        };

        DraftOutcome {
            fixture,
            success: true,
            action: Some(action),
            message: action.to_string(),
            recalc_warning,
        }
    }
}

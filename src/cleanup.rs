//! Maintenance operations over persisted match data.
//!
//! Four independent, user-triggered operations: duplicate removal, bulk
//! legacy date correction, removal of the ghost matches left by a known bad
//! ingestion, and a full competition reset. All of them are idempotent and
//! best-effort: a failed step is recorded and the remaining steps still run;
//! nothing is rolled back.

use crate::backend::{MatchFilter, MatchStore, StandingsRecalculator, StoredMatch};
use crate::ingest::dates::legacy_date_pairs;
use chrono::NaiveDate;
use futures::future::join_all;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Tables cleared by the full reset, in dependency order. Teams and
/// championships are preserved so the competition can be re-seeded.
pub const RESET_TABLE_ORDER: [&str; 7] = [
    "goals",
    "match_events",
    "match_statistics",
    "top_scorers",
    "yellow_card_leaders",
    "standings",
    "matches",
];

/// The dates written by the bad ingestion event this rollback targets.
static GHOST_MATCH_DATES: Lazy<Vec<NaiveDate>> = Lazy::new(|| {
    ["2025-02-22", "2025-02-23", "2025-03-08"]
        .iter()
        .map(|s| s.parse().expect("valid literal date"))
        .collect()
});

/// Categories affected by the bad ingestion event.
pub const GHOST_MATCH_CATEGORIES: [&str; 2] = ["SUB-11", "SUB-13"];

/// Result of one step within a cleanup operation.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub label: String,
    pub success: bool,
    pub detail: String,
}

impl StepOutcome {
    fn ok(label: impl Into<String>, detail: impl Into<String>) -> Self {
        StepOutcome {
            label: label.into(),
            success: true,
            detail: detail.into(),
        }
    }

    fn failed(label: impl Into<String>, detail: impl Into<String>) -> Self {
        StepOutcome {
            label: label.into(),
            success: false,
            detail: detail.into(),
        }
    }
}

/// Per-step report of one cleanup operation.
#[derive(Debug, Clone)]
pub struct CleanupReport {
    pub operation: &'static str,
    pub steps: Vec<StepOutcome>,
}

impl CleanupReport {
    fn new(operation: &'static str) -> Self {
        CleanupReport {
            operation,
            steps: Vec::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.steps.iter().all(|step| step.success)
    }
}

pub struct CleanupRunner {
    store: Arc<dyn MatchStore>,
    standings: Arc<dyn StandingsRecalculator>,
}

impl CleanupRunner {
    pub fn new(store: Arc<dyn MatchStore>, standings: Arc<dyn StandingsRecalculator>) -> Self {
        CleanupRunner { store, standings }
    }

    /// Deletes all but the original row per natural key.
    ///
    /// The survivor is the earliest `created_at` (lowest id as tie-break);
    /// everything else in the group is removed. Safe to re-run: with no
    /// duplicate groups left it reports and changes nothing.
    pub async fn remove_duplicate_matches(&self) -> CleanupReport {
        let mut report = CleanupReport::new("remove duplicate matches");

        let matches = match self.store.list_matches().await {
            Ok(matches) => matches,
            Err(e) => {
                report
                    .steps
                    .push(StepOutcome::failed("list matches", e.to_string()));
                return report;
            }
        };

        let mut groups: HashMap<_, Vec<StoredMatch>> = HashMap::new();
        for m in matches {
            groups.entry(m.key.clone()).or_default().push(m);
        }

        let mut duplicate_groups: Vec<Vec<StoredMatch>> = groups
            .into_values()
            .filter(|group| group.len() > 1)
            .collect();
        for group in &mut duplicate_groups {
            group.sort_by(|a, b| (a.created_at.as_str(), a.id).cmp(&(b.created_at.as_str(), b.id)));
        }
        // Stable report order regardless of map iteration
        duplicate_groups.sort_by_key(|group| group[0].id);

        if duplicate_groups.is_empty() {
            report
                .steps
                .push(StepOutcome::ok("scan", "no duplicate matches found"));
            return report;
        }

        let mut removed = 0u64;
        for group in &duplicate_groups {
            let keeper = &group[0];
            let label = format!(
                "{} vs {} ({}, {})",
                keeper.key.home_team_id, keeper.key.away_team_id, keeper.key.category,
                keeper.key.date
            );
            let mut group_removed = 0usize;
            let mut group_error = None;
            for duplicate in &group[1..] {
                match self.store.delete_match(duplicate.id).await {
                    Ok(()) => {
                        removed += 1;
                        group_removed += 1;
                    }
                    Err(e) => {
                        warn!("failed to delete duplicate match {}: {e}", duplicate.id);
                        group_error = Some(e.to_string());
                    }
                }
            }
            match group_error {
                None => report.steps.push(StepOutcome::ok(
                    label,
                    format!("kept match {}, removed {group_removed}", keeper.id),
                )),
                Some(e) => report.steps.push(StepOutcome::failed(
                    label,
                    format!("removed {group_removed}, then: {e}"),
                )),
            }
        }

        info!(
            "duplicate removal: {} groups, {removed} rows removed",
            duplicate_groups.len()
        );

        if removed > 0 {
            report.steps.push(self.recalculate_step().await);
        }
        report
    }

    /// Re-applies the literal date override table against persisted matches.
    ///
    /// Only the four known miscoded source dates are touched; matches already
    /// on their corrected dates are left alone, so the pass is idempotent.
    pub async fn fix_legacy_dates(&self) -> CleanupReport {
        let mut report = CleanupReport::new("fix legacy dates");

        // Snapshot the affected rows for all four source dates before
        // rewriting any of them: the targets overlap the sources (02-22 is
        // both), and a row must only ever move once. The reads are
        // independent, so they run concurrently; the writes below stay
        // sequential.
        let snapshots = join_all(legacy_date_pairs().iter().map(|(source, target)| async move {
            (
                format!("{source} -> {target}"),
                *target,
                self.store.matches_on_date(*source).await,
            )
        }))
        .await;

        let mut pending = Vec::new();
        for (label, target, result) in snapshots {
            match result {
                Ok(matches) => pending.push((label, target, matches)),
                Err(e) => report.steps.push(StepOutcome::failed(label, e.to_string())),
            }
        }

        for (label, target, matches) in pending {
            if matches.is_empty() {
                report
                    .steps
                    .push(StepOutcome::ok(label, "no matches stored on this date"));
                continue;
            }

            let mut moved = 0usize;
            let mut step_error = None;
            for m in &matches {
                match self.store.set_match_date(m.id, target).await {
                    Ok(()) => moved += 1,
                    Err(e) => {
                        warn!("failed to move match {} to {target}: {e}", m.id);
                        step_error = Some(e.to_string());
                    }
                }
            }
            match step_error {
                None => report
                    .steps
                    .push(StepOutcome::ok(label, format!("{moved} matches moved"))),
                Some(e) => report.steps.push(StepOutcome::failed(
                    label,
                    format!("{moved} matches moved, then: {e}"),
                )),
            }
        }

        report
    }

    /// Deletes every match written by the known bad ingestion event: the
    /// three affected dates across both categories.
    pub async fn remove_ghost_matches(&self) -> CleanupReport {
        let mut report = CleanupReport::new("remove ghost matches");

        let filter = MatchFilter {
            dates: GHOST_MATCH_DATES.clone(),
            categories: GHOST_MATCH_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        };
        match self.store.delete_matches(&filter).await {
            Ok(removed) => {
                info!("ghost match removal: {removed} rows removed");
                report.steps.push(StepOutcome::ok(
                    "delete ghost matches",
                    format!("{removed} matches removed"),
                ));
                if removed > 0 {
                    report.steps.push(self.recalculate_step().await);
                }
            }
            Err(e) => {
                report
                    .steps
                    .push(StepOutcome::failed("delete ghost matches", e.to_string()));
            }
        }
        report
    }

    /// Clears all dependent tables in strict dependency order, preserving
    /// teams and championships. A failed table is recorded and the sequence
    /// continues.
    pub async fn full_reset(&self) -> CleanupReport {
        let mut report = CleanupReport::new("full reset");

        for table in RESET_TABLE_ORDER {
            match self.store.clear_table(table).await {
                Ok(removed) => report
                    .steps
                    .push(StepOutcome::ok(table, format!("{removed} rows removed"))),
                Err(e) => {
                    warn!("failed to clear table {table}: {e}");
                    report.steps.push(StepOutcome::failed(table, e.to_string()));
                }
            }
        }

        report
    }

    async fn recalculate_step(&self) -> StepOutcome {
        match self.standings.recalculate().await {
            Ok(()) => StepOutcome::ok("recalculate standings", "standings rebuilt"),
            Err(e) => {
                warn!("standings recalculation failed after cleanup: {e}");
                StepOutcome::failed("recalculate standings", e.to_string())
            }
        }
    }
}

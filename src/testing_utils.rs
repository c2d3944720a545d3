//! Test utilities: draft builders and an in-memory backend fake.
//!
//! The in-memory backend implements both backend traits so the upsert engine
//! and the cleanup runner can be exercised without a live database. It also
//! records standings recalculation invocations and cleared tables so tests
//! can assert on side effects.

use crate::backend::{
    MatchFilter, MatchId, MatchStore, MatchUpdate, NaturalKey, NewMatch, StandingsRecalculator,
    StoredMatch, TeamId,
};
use crate::error::AppError;
use crate::ingest::models::{MatchDraft, MatchStatus};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Builders for common test fixtures
pub struct TestDataBuilder;

impl TestDataBuilder {
    /// Creates a completed-result draft the way the parser would emit it
    pub fn create_completed_draft(
        home_team: &str,
        away_team: &str,
        home_score: u32,
        away_score: u32,
        category: &str,
        date: &str,
    ) -> MatchDraft {
        MatchDraft {
            date: date.parse().expect("valid test date"),
            round: Some("Rodada 1".to_string()),
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            home_score,
            away_score,
            category: category.to_string(),
            status: MatchStatus::Completed,
            time: crate::constants::DEFAULT_KICKOFF_TIME.to_string(),
            location: crate::constants::DEFAULT_VENUE.to_string(),
        }
    }
}

#[derive(Default)]
struct BackendState {
    teams: HashMap<String, TeamId>,
    matches: Vec<StoredMatch>,
    next_match_id: MatchId,
    created_seq: u64,
    cleared_tables: Vec<String>,
    failing_tables: HashSet<String>,
    recalc_count: u64,
    fail_recalculations: bool,
}

/// In-memory stand-in for the hosted backend.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<BackendState>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with the given team directory.
    pub fn with_teams(teams: &[(&str, TeamId)]) -> Self {
        let backend = Self::new();
        {
            let mut state = backend.lock();
            for (name, id) in teams {
                state.teams.insert(name.to_string(), *id);
            }
        }
        backend
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().expect("backend state poisoned")
    }

    /// Inserts a match row directly, bypassing the upsert engine.
    pub fn seed_match(
        &self,
        home_team_id: TeamId,
        away_team_id: TeamId,
        category: &str,
        date: &str,
        home_score: u32,
        away_score: u32,
    ) -> MatchId {
        let mut state = self.lock();
        state.next_match_id += 1;
        state.created_seq += 1;
        let id = state.next_match_id;
        let created_at = format!("2025-01-01T00:00:00.{:06}Z", state.created_seq);
        state.matches.push(StoredMatch {
            id,
            key: NaturalKey {
                home_team_id,
                away_team_id,
                category: category.to_string(),
                date: date.parse().expect("valid test date"),
            },
            home_score,
            away_score,
            status: MatchStatus::Completed,
            round: None,
            created_at,
        });
        id
    }

    /// Snapshot of the stored matches.
    pub fn matches(&self) -> Vec<StoredMatch> {
        self.lock().matches.clone()
    }

    /// How many times the standings RPC was invoked.
    pub fn recalc_count(&self) -> u64 {
        self.lock().recalc_count
    }

    /// Makes every subsequent recalculation fail.
    pub fn fail_recalculations(&self) {
        self.lock().fail_recalculations = true;
    }

    /// Makes `clear_table` fail for the named table.
    pub fn fail_table_clear(&self, table: &str) {
        self.lock().failing_tables.insert(table.to_string());
    }

    /// Tables cleared so far, in call order.
    pub fn cleared_tables(&self) -> Vec<String> {
        self.lock().cleared_tables.clone()
    }
}

#[async_trait]
impl MatchStore for InMemoryBackend {
    async fn lookup_team_by_name(&self, name: &str) -> Result<Option<TeamId>, AppError> {
        Ok(self.lock().teams.get(name).copied())
    }

    async fn find_match(&self, key: &NaturalKey) -> Result<Option<MatchId>, AppError> {
        Ok(self
            .lock()
            .matches
            .iter()
            .find(|m| m.key == *key)
            .map(|m| m.id))
    }

    async fn insert_match(&self, new_match: &NewMatch) -> Result<MatchId, AppError> {
        let mut state = self.lock();
        state.next_match_id += 1;
        state.created_seq += 1;
        let id = state.next_match_id;
        let created_at = format!("2025-01-01T00:00:00.{:06}Z", state.created_seq);
        state.matches.push(StoredMatch {
            id,
            key: new_match.natural_key(),
            home_score: new_match.home_score,
            away_score: new_match.away_score,
            status: new_match.status,
            round: new_match.round.clone(),
            created_at,
        });
        Ok(id)
    }

    async fn update_match(&self, id: MatchId, update: &MatchUpdate) -> Result<(), AppError> {
        let mut state = self.lock();
        match state.matches.iter_mut().find(|m| m.id == id) {
            Some(stored) => {
                stored.home_score = update.home_score;
                stored.away_score = update.away_score;
                stored.status = update.status;
                stored.round = update.round.clone();
                Ok(())
            }
            None => Err(AppError::api_no_data(
                format!("match {id} not found"),
                "in-memory",
            )),
        }
    }

    async fn list_matches(&self) -> Result<Vec<StoredMatch>, AppError> {
        Ok(self.lock().matches.clone())
    }

    async fn matches_on_date(&self, date: NaiveDate) -> Result<Vec<StoredMatch>, AppError> {
        Ok(self
            .lock()
            .matches
            .iter()
            .filter(|m| m.key.date == date)
            .cloned()
            .collect())
    }

    async fn set_match_date(&self, id: MatchId, date: NaiveDate) -> Result<(), AppError> {
        let mut state = self.lock();
        match state.matches.iter_mut().find(|m| m.id == id) {
            Some(stored) => {
                stored.key.date = date;
                Ok(())
            }
            None => Err(AppError::api_no_data(
                format!("match {id} not found"),
                "in-memory",
            )),
        }
    }

    async fn delete_match(&self, id: MatchId) -> Result<(), AppError> {
        self.lock().matches.retain(|m| m.id != id);
        Ok(())
    }

    async fn delete_matches(&self, filter: &MatchFilter) -> Result<u64, AppError> {
        let mut state = self.lock();
        let before = state.matches.len();
        state.matches.retain(|m| {
            let date_selected = filter.dates.is_empty() || filter.dates.contains(&m.key.date);
            let category_selected =
                filter.categories.is_empty() || filter.categories.contains(&m.key.category);
            !(date_selected && category_selected)
        });
        Ok((before - state.matches.len()) as u64)
    }

    async fn clear_table(&self, table: &str) -> Result<u64, AppError> {
        let mut state = self.lock();
        if state.failing_tables.contains(table) {
            return Err(AppError::api_server_error(
                500,
                "table is locked",
                format!("in-memory/{table}"),
            ));
        }
        state.cleared_tables.push(table.to_string());
        let removed = if table == "matches" {
            let count = state.matches.len();
            state.matches.clear();
            count as u64
        } else {
            0
        };
        Ok(removed)
    }
}

#[async_trait]
impl StandingsRecalculator for InMemoryBackend {
    async fn recalculate(&self) -> Result<(), AppError> {
        let mut state = self.lock();
        state.recalc_count += 1;
        if state.fail_recalculations {
            return Err(AppError::api_server_error(
                500,
                "recalculation procedure failed",
                "in-memory/rpc/recalculate_standings",
            ));
        }
        Ok(())
    }
}

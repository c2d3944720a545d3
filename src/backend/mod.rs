//! Backend boundary for the hosted championship store.
//!
//! The ingestion engine and the cleanup subsystem only ever talk to the two
//! traits below, so both can run against the real REST backend or the
//! in-memory fake used in tests.

pub mod api;
pub mod models;

pub use api::ApiClient;

use crate::error::AppError;
use crate::ingest::models::MatchStatus;
use async_trait::async_trait;
use chrono::NaiveDate;

pub type TeamId = i64;
pub type MatchId = i64;

/// The tuple the upsert engine uses to decide insert vs. update.
///
/// Distinct from the backend's generated primary key: re-ingesting the same
/// fixture must land on the same persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub category: String,
    pub date: NaiveDate,
}

/// Fields written when a new match row is created.
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub category: String,
    pub date: NaiveDate,
    pub home_score: u32,
    pub away_score: u32,
    pub status: MatchStatus,
    pub round: Option<String>,
    pub time: String,
    pub location: String,
}

impl NewMatch {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            home_team_id: self.home_team_id,
            away_team_id: self.away_team_id,
            category: self.category.clone(),
            date: self.date,
        }
    }
}

/// Fields rewritten when re-ingesting an existing fixture.
#[derive(Debug, Clone)]
pub struct MatchUpdate {
    pub home_score: u32,
    pub away_score: u32,
    pub status: MatchStatus,
    pub round: Option<String>,
}

/// A persisted match as the maintenance operations see it.
#[derive(Debug, Clone)]
pub struct StoredMatch {
    pub id: MatchId,
    pub key: NaturalKey,
    pub home_score: u32,
    pub away_score: u32,
    pub status: MatchStatus,
    pub round: Option<String>,
    /// RFC 3339 creation timestamp from the backend; lexicographic order is
    /// chronological order, which duplicate removal relies on.
    pub created_at: String,
}

/// Row filter for bulk deletes. Empty lists match everything on that axis.
#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub dates: Vec<NaiveDate>,
    pub categories: Vec<String>,
}

/// Team directory and match persistence operations of the hosted backend.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Resolves a team by exact name. `Ok(None)` means the team does not
    /// exist, which fails a single draft rather than the batch.
    async fn lookup_team_by_name(&self, name: &str) -> Result<Option<TeamId>, AppError>;

    /// Finds a persisted match by natural key.
    async fn find_match(&self, key: &NaturalKey) -> Result<Option<MatchId>, AppError>;

    async fn insert_match(&self, new_match: &NewMatch) -> Result<MatchId, AppError>;

    async fn update_match(&self, id: MatchId, update: &MatchUpdate) -> Result<(), AppError>;

    async fn list_matches(&self) -> Result<Vec<StoredMatch>, AppError>;

    async fn matches_on_date(&self, date: NaiveDate) -> Result<Vec<StoredMatch>, AppError>;

    async fn set_match_date(&self, id: MatchId, date: NaiveDate) -> Result<(), AppError>;

    async fn delete_match(&self, id: MatchId) -> Result<(), AppError>;

    /// Deletes every match the filter selects, returning the removed count.
    async fn delete_matches(&self, filter: &MatchFilter) -> Result<u64, AppError>;

    /// Clears an entire backend table, returning the removed count. Used by
    /// the full competition reset.
    async fn clear_table(&self, table: &str) -> Result<u64, AppError>;
}

/// The backend-side procedure that rebuilds league tables from completed
/// matches. Opaque to this tool; failures are reported as warnings, never
/// rolled into write failures.
#[async_trait]
pub trait StandingsRecalculator: Send + Sync {
    async fn recalculate(&self) -> Result<(), AppError>;
}

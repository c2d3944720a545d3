//! Wire models for the hosted backend's REST surface.
//!
//! Column names follow the backend schema, so no field renames are needed;
//! optional columns default so older rows keep deserializing.

use crate::backend::{NaturalKey, NewMatch, StoredMatch};
use crate::error::AppError;
use crate::ingest::models::MatchStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTeam {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMatch {
    pub id: i64,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub category: String,
    pub match_date: String,
    #[serde(default)]
    pub home_score: u32,
    #[serde(default)]
    pub away_score: u32,
    pub status: MatchStatus,
    #[serde(default)]
    pub round: Option<String>,
    #[serde(default)]
    pub match_time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl ApiMatch {
    /// Converts a wire row into the domain view used by the maintenance
    /// operations. Fails when the backend hands back an unparseable date.
    pub fn into_stored(self) -> Result<StoredMatch, AppError> {
        let date = self.match_date.parse::<NaiveDate>().map_err(|e| {
            AppError::date_parse_error(format!(
                "match {} has invalid match_date '{}': {e}",
                self.id, self.match_date
            ))
        })?;
        Ok(StoredMatch {
            id: self.id,
            key: NaturalKey {
                home_team_id: self.home_team_id,
                away_team_id: self.away_team_id,
                category: self.category,
                date,
            },
            home_score: self.home_score,
            away_score: self.away_score,
            status: self.status,
            round: self.round,
            created_at: self.created_at,
        })
    }
}

/// Insert payload for a new match row.
#[derive(Debug, Clone, Serialize)]
pub struct NewMatchRow<'a> {
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub category: &'a str,
    pub match_date: String,
    pub home_score: u32,
    pub away_score: u32,
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<&'a str>,
    pub match_time: &'a str,
    pub location: &'a str,
}

impl<'a> NewMatchRow<'a> {
    pub fn from_new_match(new_match: &'a NewMatch) -> Self {
        NewMatchRow {
            home_team_id: new_match.home_team_id,
            away_team_id: new_match.away_team_id,
            category: &new_match.category,
            match_date: new_match.date.to_string(),
            home_score: new_match.home_score,
            away_score: new_match.away_score,
            status: new_match.status,
            round: new_match.round.as_deref(),
            match_time: &new_match.time,
            location: &new_match.location,
        }
    }
}

/// Minimal row used when only the generated id is selected.
#[derive(Debug, Clone, Deserialize)]
pub struct IdRow {
    pub id: i64,
}

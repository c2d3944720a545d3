use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a match on the backend.
///
/// Ingested historical results are always `Completed`; the other states exist
/// because the admin panel schedules fixtures ahead of time and the cleanup
/// subsystem reads whatever is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Completed,
    #[serde(other)]
    Unknown,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Completed => "completed",
            MatchStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed, not-yet-persisted match record produced by the round listing
/// parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDraft {
    /// Fixture date, already normalized onto its intended weekend date.
    pub date: NaiveDate,
    /// Round label carried over from the most recent header line.
    pub round: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    /// Normalized to `SUB-<n>`.
    pub category: String,
    pub status: MatchStatus,
    pub time: String,
    pub location: String,
}

impl MatchDraft {
    /// Short human-readable identifier used in batch reports and logs.
    pub fn fixture_label(&self) -> String {
        format!(
            "{} {}x{} {} ({}, {})",
            self.home_team, self.home_score, self.away_score, self.away_team, self.category,
            self.date
        )
    }
}

/// What the upsert engine did with a draft that reached the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Inserted,
    Updated,
}

impl fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertAction::Inserted => f.write_str("inserted"),
            UpsertAction::Updated => f.write_str("updated"),
        }
    }
}

/// Outcome of a single draft within a batch.
#[derive(Debug, Clone)]
pub struct DraftOutcome {
    /// Fixture label of the draft this outcome belongs to.
    pub fixture: String,
    pub success: bool,
    /// Action applied on success, `None` when the draft failed.
    pub action: Option<UpsertAction>,
    /// Success message or error description.
    pub message: String,
    /// Set when the write succeeded but the standings recalculation did not.
    pub recalc_warning: Option<String>,
}

impl DraftOutcome {
    pub fn failure(fixture: String, message: String) -> Self {
        DraftOutcome {
            fixture,
            success: false,
            action: None,
            message,
            recalc_warning: None,
        }
    }
}

/// Aggregate result of one ingestion batch.
///
/// `success()` is true only when every draft succeeded; callers are expected
/// to walk `outcomes` even on aggregate failure because partial success is
/// the common case.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub outcomes: Vec<DraftOutcome>,
    /// Set when the unconditional end-of-batch recalculation failed.
    pub final_recalc_warning: Option<String>,
}

impl BatchReport {
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.success)
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(success: bool) -> DraftOutcome {
        DraftOutcome {
            fixture: "Federal 3x1 Estrela Vermelha (SUB-13, 2025-03-09)".to_string(),
            success,
            action: success.then_some(UpsertAction::Inserted),
            message: String::new(),
            recalc_warning: None,
        }
    }

    #[test]
    fn test_match_status_serde_roundtrip() {
        let json = serde_json::to_string(&MatchStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let status: MatchStatus = serde_json::from_str("\"scheduled\"").unwrap();
        assert_eq!(status, MatchStatus::Scheduled);
    }

    #[test]
    fn test_match_status_unknown_values_deserialize() {
        // The admin panel has historically written other status strings;
        // they must not break deserialization of stored matches
        let status: MatchStatus = serde_json::from_str("\"postponed\"").unwrap();
        assert_eq!(status, MatchStatus::Unknown);
    }

    #[test]
    fn test_fixture_label() {
        let draft = MatchDraft {
            date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            round: Some("Rodada 3".to_string()),
            home_team: "Federal".to_string(),
            away_team: "Estrela Vermelha".to_string(),
            home_score: 3,
            away_score: 1,
            category: "SUB-13".to_string(),
            status: MatchStatus::Completed,
            time: "09:00".to_string(),
            location: "Campo do Instituto".to_string(),
        };
        assert_eq!(
            draft.fixture_label(),
            "Federal 3x1 Estrela Vermelha (SUB-13, 2025-03-09)"
        );
    }

    #[test]
    fn test_batch_report_success_requires_all_outcomes() {
        let report = BatchReport {
            outcomes: vec![outcome(true), outcome(false), outcome(true)],
            final_recalc_warning: None,
        };
        assert!(!report.success());
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.failed(), 1);

        let report = BatchReport {
            outcomes: vec![outcome(true), outcome(true)],
            final_recalc_warning: None,
        };
        assert!(report.success());
        assert_eq!(report.failed(), 0);
    }
}

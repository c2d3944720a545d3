pub mod dates;
pub mod models;
pub mod parser;
pub mod upsert;

pub use dates::{legacy_date_pairs, legacy_date_target, normalize_fixture_date};
pub use models::{BatchReport, DraftOutcome, MatchDraft, MatchStatus, UpsertAction};
pub use parser::{ParsedListing, parse_round_listing};
pub use upsert::UpsertEngine;

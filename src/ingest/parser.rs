//! Free-text round listing parser.
//!
//! Converts the listings administrators paste into the ingest tool into
//! structured [`MatchDraft`] records. The expected shape is a header line
//! carrying a `DD/MM/YYYY` date (and usually a round label) followed by one
//! match line per fixture:
//!
//! ```text
//! RODADA 3 08/03/2025
//! Federal 3x1 Estrela Vermelha - SUB-13
//! Unidos da Vila 0x0 Federal - SUB-11
//! ```
//!
//! Lines matching neither grammar are skipped, not fatal; the skip count is
//! reported back so callers can surface it.

use crate::constants::{DEFAULT_KICKOFF_TIME, DEFAULT_VENUE};
use crate::ingest::dates::normalize_fixture_date;
use crate::ingest::models::{MatchDraft, MatchStatus};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static DATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{2})/(\d{2})/(\d{4})\b").expect("valid date regex"));

static ROUND_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:RODADA|ROUND)\s*(\d+)\b").expect("valid round regex"));

static ROUND_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:RODADA|ROUND)\b").expect("valid round word regex"));

// Home and away are non-greedy so the score and category anchors win; the
// category digits are extracted regardless of spacing or trailing punctuation
// around SUB.
static MATCH_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<home>.+?)\s+(?P<home_score>\d+)\s*x\s*(?P<away_score>\d+)\s+(?P<away>.+?)\s*-?\s*SUB[\s-]*(?P<category>\d+)",
    )
    .expect("valid match line regex")
});

/// Result of scanning one listing.
#[derive(Debug, Clone, Default)]
pub struct ParsedListing {
    pub drafts: Vec<MatchDraft>,
    /// Non-blank lines that were neither headers nor valid match lines.
    pub skipped_lines: usize,
}

/// Header context accumulated while scanning lines top to bottom.
///
/// Both fields persist until a later header line replaces them, which is how
/// several match lines share one date/round header.
#[derive(Debug, Clone, Default)]
struct ScanContext {
    date: Option<NaiveDate>,
    round: Option<String>,
}

/// Parses a multi-line round listing into match drafts.
///
/// Header lines (those carrying a `DD/MM/YYYY` token) update the current
/// date and round and never emit drafts themselves; the date is passed
/// through [`normalize_fixture_date`] as it is read. Every other non-blank
/// line either matches the match-line grammar and emits one draft with the
/// current context, or is counted as skipped. Match lines seen before any
/// header are skipped too, since there is no date to attach.
pub fn parse_round_listing(text: &str) -> ParsedListing {
    let mut context = ScanContext::default();
    let mut listing = ParsedListing::default();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = DATE_TOKEN.captures(line) {
            apply_header_line(line, &caps, &mut context);
            continue;
        }

        match (MATCH_LINE.captures(line), context.date) {
            (Some(caps), Some(date)) => {
                if let Some(draft) = build_draft(&caps, date, context.round.clone()) {
                    listing.drafts.push(draft);
                } else {
                    listing.skipped_lines += 1;
                }
            }
            (Some(_), None) => {
                debug!("match line before any date header, skipping: {line}");
                listing.skipped_lines += 1;
            }
            (None, _) => {
                debug!("line does not match round grammar, skipping: {line}");
                listing.skipped_lines += 1;
            }
        }
    }

    listing
}

/// Updates the scan context from a header line.
fn apply_header_line(line: &str, date_caps: &regex::Captures<'_>, context: &mut ScanContext) {
    let parsed = (
        date_caps[3].parse::<i32>(),
        date_caps[2].parse::<u32>(),
        date_caps[1].parse::<u32>(),
    );
    match parsed {
        (Ok(year), Ok(month), Ok(day)) => match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) => {
                let normalized = normalize_fixture_date(date);
                if normalized != date {
                    debug!("header date {date} normalized to {normalized}");
                }
                context.date = Some(normalized);
            }
            None => debug!("header carries an impossible calendar date, ignoring: {line}"),
        },
        _ => debug!("header date out of range, ignoring: {line}"),
    }

    if let Some(round_caps) = ROUND_TOKEN.captures(line) {
        context.round = Some(format!("Rodada {}", &round_caps[1]));
    } else if ROUND_WORD.is_match(line) {
        // A round label without a number: keep the header text minus the
        // date token
        let label = DATE_TOKEN.replace(line, "");
        let label = label.trim();
        if !label.is_empty() {
            context.round = Some(label.to_string());
        }
    }
    // No round token at all leaves the previous round in effect
}

/// Builds a draft from a captured match line; `None` when the scores overflow.
fn build_draft(
    caps: &regex::Captures<'_>,
    date: NaiveDate,
    round: Option<String>,
) -> Option<MatchDraft> {
    let home_score = caps["home_score"].parse::<u32>().ok()?;
    let away_score = caps["away_score"].parse::<u32>().ok()?;

    Some(MatchDraft {
        date,
        round,
        home_team: caps["home"].trim().to_string(),
        away_team: caps["away"].trim().to_string(),
        home_score,
        away_score,
        category: format!("SUB-{}", &caps["category"]),
        status: MatchStatus::Completed,
        time: DEFAULT_KICKOFF_TIME.to_string(),
        location: DEFAULT_VENUE.to_string(),
    })
}

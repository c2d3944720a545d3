//! One handler per CLI operation, plus report rendering.
//!
//! Handlers return `Ok(true)` when the operation fully succeeded and
//! `Ok(false)` when it completed with per-item failures; hard errors (config,
//! I/O, client construction) propagate as `AppError`.

use crate::backend::{ApiClient, MatchStore, StandingsRecalculator};
use crate::cleanup::{CleanupReport, CleanupRunner};
use crate::cli::Args;
use crate::config::Config;
use crate::config::user_prompts::{
    confirm_destructive_operation, prompt_for_api_domain, prompt_for_api_key,
};
use crate::error::AppError;
use crate::ingest::models::BatchReport;
use crate::ingest::parser::{ParsedListing, parse_round_listing};
use crate::ingest::upsert::UpsertEngine;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;

/// Validates command line argument combinations.
///
/// Exactly one primary operation must be requested per invocation; the two
/// config-update flags count as one operation so domain and key can be set
/// together.
pub fn validate_args(args: &Args) -> Result<(), AppError> {
    let config_update = args.new_api_domain.is_some() || args.new_api_key.is_some();
    let operations = [
        args.file.is_some(),
        args.dedupe,
        args.fix_dates,
        args.purge_bad_rounds,
        args.reset,
        config_update,
        args.list_config,
    ];
    let requested = operations.iter().filter(|&&flag| flag).count();

    if requested == 0 {
        return Err(AppError::config_error(
            "No operation requested. Pass --file <PATH> to ingest a listing, or one of the maintenance flags (see --help).",
        ));
    }
    if requested > 1 {
        return Err(AppError::config_error(
            "Pass exactly one operation per invocation",
        ));
    }
    if args.dry_run && args.file.is_none() {
        return Err(AppError::config_error("--dry-run requires --file"));
    }
    Ok(())
}

/// Handles the --list-config command.
pub async fn handle_list_config_command() -> Result<(), AppError> {
    Config::display().await?;
    Ok(())
}

/// Handles configuration update commands (--config, --set-api-key).
///
/// Empty flag values fall back to an interactive prompt, so `--config` alone
/// asks for the new domain.
pub async fn handle_config_update_command(args: &Args) -> Result<(), AppError> {
    let mut config = Config::load_if_exists().await.unwrap_or_default();

    if let Some(new_domain) = &args.new_api_domain {
        config.api_domain = if new_domain.is_empty() {
            prompt_for_api_domain().await?
        } else {
            new_domain.clone()
        };
    }

    if let Some(new_key) = &args.new_api_key {
        config.api_key = if new_key.is_empty() {
            prompt_for_api_key().await?
        } else {
            new_key.clone()
        };
    }

    config.save().await?;
    println!("Config updated successfully!");

    Ok(())
}

/// Handles ingestion (--file, optionally --dry-run).
///
/// Returns whether every parsed draft was persisted; an input yielding zero
/// drafts counts as failure so scripts notice garbage input.
pub async fn handle_ingest_command(
    args: &Args,
    path: &str,
    config: &Config,
) -> Result<bool, AppError> {
    let text = read_listing(path).await?;
    let listing = parse_round_listing(&text);
    info!(
        "parsed {} drafts from {path} ({} lines skipped)",
        listing.drafts.len(),
        listing.skipped_lines
    );

    if args.dry_run {
        render_dry_run(&listing);
        return Ok(true);
    }

    if listing.drafts.is_empty() {
        println!("No matches found in the input text.");
        if listing.skipped_lines > 0 {
            println!("({} lines did not match the expected format)", listing.skipped_lines);
        }
        return Ok(false);
    }

    let (store, standings) = backend_handles(config)?;
    let engine = UpsertEngine::new(store, standings);
    let report = engine.ingest_batch(&listing.drafts).await;
    render_batch_report(&report, listing.skipped_lines);
    Ok(report.success())
}

/// Handles --dedupe.
pub async fn handle_dedupe_command(args: &Args, config: &Config) -> Result<bool, AppError> {
    if !confirm_unless_yes(args, "About to remove duplicate matches, keeping the original row per fixture.").await? {
        println!("Aborted.");
        return Ok(true);
    }
    let report = cleanup_runner(config)?.remove_duplicate_matches().await;
    render_cleanup_report(&report);
    Ok(report.success())
}

/// Handles --fix-dates. A pure correction, so no confirmation is required.
pub async fn handle_fix_dates_command(config: &Config) -> Result<bool, AppError> {
    let report = cleanup_runner(config)?.fix_legacy_dates().await;
    render_cleanup_report(&report);
    Ok(report.success())
}

/// Handles --purge-bad-rounds.
pub async fn handle_purge_command(args: &Args, config: &Config) -> Result<bool, AppError> {
    if !confirm_unless_yes(
        args,
        "About to delete every match stored on the bad-ingestion dates (2025-02-22, 2025-02-23, 2025-03-08) for SUB-11 and SUB-13.",
    )
    .await?
    {
        println!("Aborted.");
        return Ok(true);
    }
    let report = cleanup_runner(config)?.remove_ghost_matches().await;
    render_cleanup_report(&report);
    Ok(report.success())
}

/// Handles --reset.
pub async fn handle_reset_command(args: &Args, config: &Config) -> Result<bool, AppError> {
    if !confirm_unless_yes(
        args,
        "About to delete ALL match data, statistics and standings. Teams and championships are preserved.",
    )
    .await?
    {
        println!("Aborted.");
        return Ok(true);
    }
    let report = cleanup_runner(config)?.full_reset().await;
    render_cleanup_report(&report);
    Ok(report.success())
}

/// Reads the round listing from a file, or from stdin when the path is `-`.
async fn read_listing(path: &str) -> Result<String, AppError> {
    if path == "-" {
        let mut buffer = String::new();
        tokio::io::stdin().read_to_string(&mut buffer).await?;
        Ok(buffer)
    } else {
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

fn backend_handles(
    config: &Config,
) -> Result<(Arc<dyn MatchStore>, Arc<dyn StandingsRecalculator>), AppError> {
    let api = Arc::new(ApiClient::new(config)?);
    let store: Arc<dyn MatchStore> = api.clone();
    let standings: Arc<dyn StandingsRecalculator> = api;
    Ok((store, standings))
}

fn cleanup_runner(config: &Config) -> Result<CleanupRunner, AppError> {
    let (store, standings) = backend_handles(config)?;
    Ok(CleanupRunner::new(store, standings))
}

async fn confirm_unless_yes(args: &Args, description: &str) -> Result<bool, AppError> {
    if args.yes {
        return Ok(true);
    }
    confirm_destructive_operation(description).await
}

fn render_dry_run(listing: &ParsedListing) {
    println!(
        "Parsed {} matches ({} lines skipped):",
        listing.drafts.len(),
        listing.skipped_lines
    );
    for draft in &listing.drafts {
        println!(
            "  {} [{}]",
            draft.fixture_label(),
            draft.round.as_deref().unwrap_or("no round")
        );
    }
}

fn render_batch_report(report: &BatchReport, skipped_lines: usize) {
    let persisted = report.attempted() - report.failed();
    println!(
        "Ingested {persisted} of {} matches ({} failed, {skipped_lines} lines skipped)",
        report.attempted(),
        report.failed()
    );
    for outcome in &report.outcomes {
        let status = if outcome.success { "ok" } else { "FAILED" };
        println!("  [{status}] {} - {}", outcome.fixture, outcome.message);
        if let Some(warning) = &outcome.recalc_warning {
            println!("         warning: {warning}");
        }
    }
    if let Some(warning) = &report.final_recalc_warning {
        println!("warning: {warning}");
    }
}

fn render_cleanup_report(report: &CleanupReport) {
    let overall = if report.success() { "done" } else { "completed with errors" };
    println!("{}: {overall}", report.operation);
    for step in &report.steps {
        let status = if step.success { "ok" } else { "FAILED" };
        println!("  [{status}] {} - {}", step.label, step.detail);
    }
}

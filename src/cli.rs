use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Championship result ingestion and data maintenance
///
/// Parses pasted round listings (dates, round labels and `TeamA 3x1 TeamB -
/// SUB-13` lines), normalizes the habitually miscoded fixture dates, and
/// upserts the results into the hosted championship backend, recalculating
/// the standings as it goes. Also bundles the maintenance operations used to
/// repair persisted data.
///
/// Exactly one operation per invocation. Ingestion reads from a file or from
/// stdin (`--file -`); destructive maintenance asks for confirmation unless
/// `--yes` is passed.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(styles = get_styles())]
pub struct Args {
    /// Ingest a round listing from the given file. Pass `-` to read the
    /// listing from stdin instead.
    #[arg(short = 'f', long = "file", value_name = "PATH", help_heading = "Ingestion")]
    pub file: Option<String>,

    /// Parse and normalize only: print the drafts that would be persisted
    /// and touch nothing. Requires --file.
    #[arg(long = "dry-run", help_heading = "Ingestion")]
    pub dry_run: bool,

    /// Remove duplicate matches, keeping the original row per fixture.
    #[arg(long = "dedupe", help_heading = "Maintenance")]
    pub dedupe: bool,

    /// Rewrite matches stored on the known miscoded dates onto their
    /// corrected weekend dates.
    #[arg(long = "fix-dates", help_heading = "Maintenance")]
    pub fix_dates: bool,

    /// Remove the matches written by the known bad round ingestion.
    #[arg(long = "purge-bad-rounds", help_heading = "Maintenance")]
    pub purge_bad_rounds: bool,

    /// Delete all match data, statistics and standings, preserving teams and
    /// championships.
    #[arg(long = "reset", help_heading = "Maintenance")]
    pub reset: bool,

    /// Skip the confirmation prompt on destructive maintenance operations.
    #[arg(short = 'y', long = "yes", help_heading = "Maintenance")]
    pub yes: bool,

    /// Update the backend API domain in config. Prompts for the new domain
    /// if not provided.
    #[arg(
        long = "config",
        help_heading = "Configuration",
        value_name = "API_DOMAIN",
        num_args = 0..=1,
        default_missing_value = ""
    )]
    pub new_api_domain: Option<String>,

    /// Update the backend API key in config. Prompts for the new key if not
    /// provided.
    #[arg(
        long = "set-api-key",
        help_heading = "Configuration",
        value_name = "API_KEY",
        num_args = 0..=1,
        default_missing_value = ""
    )]
    pub new_api_key: Option<String>,

    /// List current configuration settings
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Specify a custom log file path. If not provided, logs will be written
    /// to the default location.
    #[arg(long = "log-file", help_heading = "Debug")]
    pub log_file: Option<String>,

    /// Enable debug logging and mirror logs to stdout in addition to the log
    /// file.
    #[arg(long = "debug", help_heading = "Debug")]
    pub debug: bool,
}

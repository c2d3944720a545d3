//! Championship Result Ingestion Library
//!
//! Batch match-result ingestion and data maintenance for the institute
//! championship backend. Administrators paste a loosely structured round
//! listing; this library parses it into match drafts, normalizes the
//! habitually miscoded fixture dates onto their intended weekend dates, and
//! upserts the results idempotently into the hosted backend, triggering
//! league-standings recalculation after every completed write.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use placar_ingest::backend::ApiClient;
//! use placar_ingest::config::Config;
//! use placar_ingest::error::AppError;
//! use placar_ingest::ingest::{UpsertEngine, parse_round_listing};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::load().await?;
//!     let api = Arc::new(ApiClient::new(&config)?);
//!
//!     let listing = parse_round_listing(
//!         "RODADA 3 08/03/2025\nFederal 3x1 Estrela Vermelha - SUB-13\n",
//!     );
//!
//!     let engine = UpsertEngine::new(api.clone(), api);
//!     let report = engine.ingest_batch(&listing.drafts).await;
//!     println!("{} attempted, {} failed", report.attempted(), report.failed());
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cleanup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod testing_utils;

// Re-export commonly used types for convenience
pub use backend::{ApiClient, MatchStore, StandingsRecalculator};
pub use cleanup::{CleanupReport, CleanupRunner};
pub use config::Config;
pub use error::AppError;
pub use ingest::{
    BatchReport, MatchDraft, UpsertEngine, normalize_fixture_date, parse_round_listing,
};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

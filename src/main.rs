use clap::Parser;
use placar_ingest::cli::Args;
use placar_ingest::commands;
use placar_ingest::config::Config;
use placar_ingest::error::AppError;
use placar_ingest::logging::setup_logging;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    commands::validate_args(&args)?;

    // The guard must be kept alive for the duration of the program to ensure
    // logs are flushed properly
    let (log_file_path, _guard) = setup_logging(&args).await?;
    info!("logging to {log_file_path}");

    // Configuration operations run without touching the backend
    if args.list_config {
        commands::handle_list_config_command().await?;
        return Ok(());
    }
    if args.new_api_domain.is_some() || args.new_api_key.is_some() {
        commands::handle_config_update_command(&args).await?;
        return Ok(());
    }

    let config = Config::load().await?;

    let fully_succeeded = if let Some(path) = args.file.clone() {
        commands::handle_ingest_command(&args, &path, &config).await?
    } else if args.dedupe {
        commands::handle_dedupe_command(&args, &config).await?
    } else if args.fix_dates {
        commands::handle_fix_dates_command(&config).await?
    } else if args.purge_bad_rounds {
        commands::handle_purge_command(&args, &config).await?
    } else if args.reset {
        commands::handle_reset_command(&args, &config).await?
    } else {
        // validate_args guarantees exactly one operation was requested
        true
    };

    if !fully_succeeded {
        // Partial failures were already reported per item; reflect them in
        // the exit code for scripted callers. The guard is dropped first so
        // buffered log lines reach the file.
        drop(_guard);
        std::process::exit(1);
    }
    Ok(())
}

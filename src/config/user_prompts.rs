//! User interaction and prompts for configuration setup and destructive
//! maintenance operations.

use crate::error::AppError;
use tokio::io::{self, AsyncBufReadExt};

async fn read_trimmed_line() -> Result<String, AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin);
    reader.read_line(&mut input).await?;
    Ok(input.trim().to_string())
}

/// Prompts the user for the backend API domain and returns the trimmed input.
pub async fn prompt_for_api_domain() -> Result<String, AppError> {
    println!("Please enter your backend API domain: ");
    read_trimmed_line().await
}

/// Prompts the user for the backend API key and returns the trimmed input.
pub async fn prompt_for_api_key() -> Result<String, AppError> {
    println!("Please enter your backend API key: ");
    read_trimmed_line().await
}

/// Asks for confirmation before a destructive maintenance operation.
///
/// Returns `Ok(true)` only when the user answers `y` or `yes`
/// (case-insensitive). Any other answer, including an empty line, declines.
pub async fn confirm_destructive_operation(description: &str) -> Result<bool, AppError> {
    println!("{description}");
    println!("This cannot be undone. Continue? [y/N] ");
    let answer = read_trimmed_line().await?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

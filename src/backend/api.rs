//! REST client for the hosted backend.
//!
//! The backend exposes a PostgREST-style surface: table access under
//! `/rest/v1/<table>` with `col=op.value` query filters, and stored
//! procedures under `/rest/v1/rpc/<function>`. Writes that need the affected
//! rows back send `Prefer: return=representation`.

use crate::backend::models::{ApiMatch, ApiTeam, IdRow, NewMatchRow};
use crate::backend::{
    MatchFilter, MatchId, MatchStore, MatchUpdate, NaturalKey, NewMatch, StandingsRecalculator,
    StoredMatch, TeamId,
};
use crate::config::Config;
use crate::constants;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    /// Creates a client with connection pooling and the configured timeout.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .pool_max_idle_per_host(constants::HTTP_POOL_MAX_IDLE_PER_HOST)
            .build()?;
        Ok(ApiClient {
            client,
            base_url: config.api_domain.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{function}", self.base_url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Sends a request with retries and exponential backoff for transient
    /// failures (429, 5xx, timeouts, connection errors), then maps any
    /// remaining failure status onto a specific error variant.
    async fn execute<F>(&self, url: &str, build: F) -> Result<Response, AppError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0u32;
        let mut backoff = Duration::from_millis(constants::retry::BASE_DELAY_MS);
        let response = loop {
            match self.authed(build()).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if (status.as_u16() == 429 || status.is_server_error())
                        && attempt < constants::retry::MAX_ATTEMPTS
                    {
                        // Respect Retry-After if provided
                        let retry_after = resp
                            .headers()
                            .get(reqwest::header::RETRY_AFTER)
                            .and_then(|h| h.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .map(Duration::from_secs);
                        let wait = retry_after.unwrap_or(backoff);
                        warn!(
                            "Transient {} from {}. Retrying in {:?} (attempt {}/{})",
                            status,
                            url,
                            wait,
                            attempt + 1,
                            constants::retry::MAX_ATTEMPTS
                        );
                        tokio::time::sleep(wait).await;
                        attempt += 1;
                        backoff = backoff.saturating_mul(2);
                        continue;
                    }
                    break resp;
                }
                Err(e) => {
                    if (e.is_timeout() || e.is_connect()) && attempt < constants::retry::MAX_ATTEMPTS
                    {
                        warn!(
                            "Request error {} for {}. Retrying in {:?} (attempt {}/{})",
                            e,
                            url,
                            backoff,
                            attempt + 1,
                            constants::retry::MAX_ATTEMPTS
                        );
                        tokio::time::sleep(backoff).await;
                        attempt += 1;
                        backoff = backoff.saturating_mul(2);
                        continue;
                    }
                    error!("Request failed for URL {}: {}", url, e);
                    return if e.is_timeout() {
                        Err(AppError::network_timeout(url))
                    } else if e.is_connect() {
                        Err(AppError::network_connection(url, e.to_string()))
                    } else {
                        Err(AppError::ApiFetch(e))
                    };
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let reason = status.canonical_reason().unwrap_or("Unknown error");
            error!("HTTP {} - {} (URL: {})", status_code, reason, url);
            return Err(match status_code {
                404 => AppError::api_not_found(url),
                429 => AppError::api_rate_limit(reason, url),
                400..=499 => AppError::api_client_error(status_code, reason, url),
                _ => AppError::api_server_error(status_code, reason, url),
            });
        }
        Ok(response)
    }

    /// Fetches and deserializes the row array a table query returns.
    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        url: String,
        query: Vec<(&'static str, String)>,
    ) -> Result<Vec<T>, AppError> {
        debug!("GET {url} {query:?}");
        let response = self
            .execute(&url, || self.client.get(&url).query(&query))
            .await?;
        let text = response.text().await.map_err(AppError::ApiFetch)?;
        if text.trim().is_empty() {
            return Err(AppError::api_no_data("response body is empty", &url));
        }
        serde_json::from_str(&text).map_err(AppError::ApiParse)
    }

    /// Deletes rows selected by the query, returning how many were removed.
    async fn delete_returning_count(
        &self,
        url: String,
        query: Vec<(&'static str, String)>,
    ) -> Result<u64, AppError> {
        debug!("DELETE {url} {query:?}");
        let response = self
            .execute(&url, || {
                self.client
                    .delete(&url)
                    .query(&query)
                    .header("Prefer", "return=representation")
            })
            .await?;
        let removed: Vec<serde_json::Value> = response.json().await.map_err(AppError::ApiFetch)?;
        Ok(removed.len() as u64)
    }
}

#[async_trait]
impl MatchStore for ApiClient {
    async fn lookup_team_by_name(&self, name: &str) -> Result<Option<TeamId>, AppError> {
        let rows: Vec<ApiTeam> = self
            .fetch_rows(
                self.table_url("teams"),
                vec![
                    ("select", "id,name".to_string()),
                    ("name", format!("eq.{name}")),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(|team| team.id))
    }

    async fn find_match(&self, key: &NaturalKey) -> Result<Option<MatchId>, AppError> {
        let rows: Vec<IdRow> = self
            .fetch_rows(
                self.table_url("matches"),
                vec![
                    ("select", "id".to_string()),
                    ("home_team_id", format!("eq.{}", key.home_team_id)),
                    ("away_team_id", format!("eq.{}", key.away_team_id)),
                    ("category", format!("eq.{}", key.category)),
                    ("match_date", format!("eq.{}", key.date)),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(|row| row.id))
    }

    async fn insert_match(&self, new_match: &NewMatch) -> Result<MatchId, AppError> {
        let url = self.table_url("matches");
        let row = NewMatchRow::from_new_match(new_match);
        let response = self
            .execute(&url, || {
                self.client
                    .post(&url)
                    .header("Prefer", "return=representation")
                    .json(&row)
            })
            .await?;
        let inserted: Vec<IdRow> = response.json().await.map_err(AppError::ApiFetch)?;
        inserted
            .into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| AppError::api_no_data("insert returned no representation", &url))
    }

    async fn update_match(&self, id: MatchId, update: &MatchUpdate) -> Result<(), AppError> {
        let url = self.table_url("matches");
        let body = serde_json::json!({
            "home_score": update.home_score,
            "away_score": update.away_score,
            "status": update.status,
            "round": update.round,
        });
        self.execute(&url, || {
            self.client
                .patch(&url)
                .query(&[("id", format!("eq.{id}"))])
                .json(&body)
        })
        .await?;
        Ok(())
    }

    async fn list_matches(&self) -> Result<Vec<StoredMatch>, AppError> {
        let rows: Vec<ApiMatch> = self
            .fetch_rows(
                self.table_url("matches"),
                vec![("select", "*".to_string()), ("order", "id".to_string())],
            )
            .await?;
        rows.into_iter().map(ApiMatch::into_stored).collect()
    }

    async fn matches_on_date(&self, date: NaiveDate) -> Result<Vec<StoredMatch>, AppError> {
        let rows: Vec<ApiMatch> = self
            .fetch_rows(
                self.table_url("matches"),
                vec![
                    ("select", "*".to_string()),
                    ("match_date", format!("eq.{date}")),
                ],
            )
            .await?;
        rows.into_iter().map(ApiMatch::into_stored).collect()
    }

    async fn set_match_date(&self, id: MatchId, date: NaiveDate) -> Result<(), AppError> {
        let url = self.table_url("matches");
        let body = serde_json::json!({ "match_date": date.to_string() });
        self.execute(&url, || {
            self.client
                .patch(&url)
                .query(&[("id", format!("eq.{id}"))])
                .json(&body)
        })
        .await?;
        Ok(())
    }

    async fn delete_match(&self, id: MatchId) -> Result<(), AppError> {
        let url = self.table_url("matches");
        self.execute(&url, || {
            self.client.delete(&url).query(&[("id", format!("eq.{id}"))])
        })
        .await?;
        Ok(())
    }

    async fn delete_matches(&self, filter: &MatchFilter) -> Result<u64, AppError> {
        let mut query: Vec<(&'static str, String)> = Vec::new();
        if !filter.dates.is_empty() {
            let dates = filter
                .dates
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(",");
            query.push(("match_date", format!("in.({dates})")));
        }
        if !filter.categories.is_empty() {
            query.push(("category", format!("in.({})", filter.categories.join(","))));
        }
        if query.is_empty() {
            // An unfiltered delete still needs a predicate on this backend
            query.push(("id", "gt.0".to_string()));
        }
        self.delete_returning_count(self.table_url("matches"), query)
            .await
    }

    async fn clear_table(&self, table: &str) -> Result<u64, AppError> {
        let removed = self
            .delete_returning_count(self.table_url(table), vec![("id", "gt.0".to_string())])
            .await?;
        info!("cleared table {table}: {removed} rows removed");
        Ok(removed)
    }
}

#[async_trait]
impl StandingsRecalculator for ApiClient {
    async fn recalculate(&self) -> Result<(), AppError> {
        let url = self.rpc_url(constants::STANDINGS_RPC);
        debug!("POST {url}");
        self.execute(&url, || {
            self.client.post(&url).json(&serde_json::json!({}))
        })
        .await?;
        Ok(())
    }
}

// ABOUTME: Strava API integration: OAuth exchanges and activity fetching
// ABOUTME: Converts Strava wire DTOs into normalized remote activity records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::{RemoteActivity, RemoteActivityType, SyncProvider, TokenExchange};
use crate::config::{HttpConfig, OAuthProviderConfig};
use crate::constants::physiology::MAX_NORMAL_HR;
use crate::constants::sync::{FETCH_PAGE_SIZE, MAX_FETCH_PAGES};
use crate::errors::{EngineError, EngineResult};
use crate::models::Platform;
use crate::utils::http_client;

/// Strava OAuth and activity client
pub struct StravaClient {
    http: Client,
    oauth_http: Client,
    config: OAuthProviderConfig,
}

impl StravaClient {
    /// Client over the configured Strava application
    #[must_use]
    pub fn new(config: OAuthProviderConfig, http: &HttpConfig) -> Self {
        Self {
            http: http_client::api_client(http),
            oauth_http: http_client::oauth_client(http),
            config,
        }
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> EngineResult<TokenExchange> {
        let response = self
            .oauth_http
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(EngineError::auth(
                Platform::Strava,
                format!("{status}: {body}"),
            ));
        }

        let token: StravaTokenResponse = serde_json::from_str(&body).map_err(|e| {
            EngineError::auth(Platform::Strava, format!("token response parse error: {e}"))
        })?;

        let expires_at = DateTime::<Utc>::from_timestamp(token.expires_at, 0)
            .unwrap_or_else(|| Utc::now() + chrono::Duration::hours(6));
        let refresh_token = token.refresh_token.unwrap_or_else(|| {
            warn!("no refresh token provided by strava");
            String::new()
        });

        Ok(TokenExchange {
            access_token: token.access_token,
            refresh_token,
            expires_at,
            scopes: token.scope,
        })
    }
}

#[async_trait]
impl SyncProvider for StravaClient {
    fn platform(&self) -> Platform {
        Platform::Strava
    }

    fn authorization_url(&self, redirect_uri: &str, state: &str) -> EngineResult<String> {
        let (client_id, _) = self.config.credentials()?;
        let mut url = url::Url::parse(&self.config.auth_url)
            .map_err(|e| EngineError::Config(format!("bad strava auth url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes)
            .append_pair("state", state);
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> EngineResult<TokenExchange> {
        let (client_id, client_secret) = self.config.credentials()?;
        let token = self
            .token_request(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .await?;
        info!("strava authorization code exchanged");
        Ok(token)
    }

    async fn refresh_token(&self, refresh_token: &str) -> EngineResult<TokenExchange> {
        let (client_id, client_secret) = self.config.credentials()?;
        let token = self
            .token_request(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .await?;
        info!("strava token refreshed");
        Ok(token)
    }

    async fn revoke_token(&self, access_token: &str) -> EngineResult<()> {
        let response = self
            .oauth_http
            .post(&self.config.revoke_url)
            .form(&[("access_token", access_token)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::sync_failure(
                Platform::Strava,
                status.as_u16(),
                body,
            ));
        }
        Ok(())
    }

    async fn fetch_activities(
        &self,
        access_token: &str,
        since: DateTime<Utc>,
    ) -> EngineResult<Vec<RemoteActivity>> {
        let url = format!("{}/athlete/activities", self.config.api_base);
        let mut activities = Vec::new();

        for page in 1..=MAX_FETCH_PAGES {
            let query = [
                ("after", since.timestamp().to_string()),
                ("per_page", FETCH_PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ];
            let response = self
                .http
                .get(&url)
                .bearer_auth(access_token)
                .query(&query)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_else(|e| {
                    warn!("failed to read error response body: {e}");
                    "unable to read error response".into()
                });
                error!("strava activity fetch failed: {status} - {body}");
                return Err(EngineError::sync_failure(
                    Platform::Strava,
                    status.as_u16(),
                    body,
                ));
            }

            let batch: Vec<StravaActivity> = response.json().await?;
            let fetched = batch.len();
            activities.extend(batch.into_iter().map(RemoteActivity::from));
            if fetched < FETCH_PAGE_SIZE {
                return Ok(activities);
            }
        }

        warn!(
            "strava fetch stopped at the {MAX_FETCH_PAGES}-page cap; \
             remaining activities will arrive on the next sync"
        );
        Ok(activities)
    }
}

#[derive(Debug, Deserialize)]
struct StravaTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: i64,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StravaActivity {
    id: u64,
    name: String,
    #[serde(rename = "type")]
    activity_type: String,
    start_date: DateTime<Utc>,
    elapsed_time: u64,
    distance: Option<f64>,
    calories: Option<f64>,
    average_heartrate: Option<f32>,
    max_heartrate: Option<f32>,
}

impl From<StravaActivity> for RemoteActivity {
    fn from(strava: StravaActivity) -> Self {
        let end_at = i64::try_from(strava.elapsed_time)
            .ok()
            .map(|secs| strava.start_date + chrono::Duration::seconds(secs));
        Self {
            external_id: Some(strava.id.to_string()),
            activity_type: RemoteActivityType::Named(strava.activity_type),
            title: Some(strava.name),
            start_at: Some(strava.start_date),
            end_at,
            duration_seconds: Some(strava.elapsed_time),
            distance_meters: strava.distance,
            calories: strava.calories,
            heart_rate_avg: sanitize_heart_rate(strava.average_heartrate),
            heart_rate_max: sanitize_heart_rate(strava.max_heartrate),
            heart_rate_min: None,
        }
    }
}

/// Strava reports fractional heart rates; round and drop readings outside
/// the physiological range.
fn sanitize_heart_rate(raw: Option<f32>) -> Option<u16> {
    raw.and_then(|value| {
        if value.is_finite() && (0.0..=f32::from(MAX_NORMAL_HR)).contains(&value) {
            let rounded = value.round() as i64;
            u16::try_from(rounded).ok()
        } else {
            None
        }
    })
}

// ABOUTME: Google Fit API integration: OAuth exchanges and session fetching
// ABOUTME: Converts Google Fit session DTOs into normalized remote activity records
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
use crate::errors::{EngineError, EngineResult};
use crate::models::Platform;
use crate::utils::http_client;

/// Google Fit OAuth and session client
pub struct GoogleFitClient {
    http: Client,
    oauth_http: Client,
    config: OAuthProviderConfig,
}

impl GoogleFitClient {
    /// Client over the configured Google application
    #[must_use]
    pub fn new(config: OAuthProviderConfig, http: &HttpConfig) -> Self {
        Self {
            http: http_client::api_client(http),
            oauth_http: http_client::oauth_client(http),
            config,
        }
    }

    async fn token_request(
        &self,
        params: &[(&str, &str)],
        previous_refresh: Option<&str>,
    ) -> EngineResult<TokenExchange> {
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
                Platform::GoogleFit,
                format!("{status}: {body}"),
            ));
        }

        let token: GoogleTokenResponse = serde_json::from_str(&body).map_err(|e| {
            EngineError::auth(
                Platform::GoogleFit,
                format!("token response parse error: {e}"),
            )
        })?;

        // Google omits the refresh token on refresh grants; keep the one we have
        let refresh_token = token
            .refresh_token
            .or_else(|| previous_refresh.map(str::to_owned))
            .unwrap_or_else(|| {
                warn!("no refresh token provided by google");
                String::new()
            });

        Ok(TokenExchange {
            access_token: token.access_token,
            refresh_token,
            expires_at: Utc::now() + chrono::Duration::seconds(token.expires_in),
            scopes: token.scope,
        })
    }
}

#[async_trait]
impl SyncProvider for GoogleFitClient {
    fn platform(&self) -> Platform {
        Platform::GoogleFit
    }

    fn authorization_url(&self, redirect_uri: &str, state: &str) -> EngineResult<String> {
        let (client_id, _) = self.config.credentials()?;
        let mut url = url::Url::parse(&self.config.auth_url)
            .map_err(|e| EngineError::Config(format!("bad google auth url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", state);
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> EngineResult<TokenExchange> {
        let (client_id, client_secret) = self.config.credentials()?;
        let redirect_uri = self.config.redirect_uri.clone().unwrap_or_default();
        let token = self
            .token_request(
                &[
                    ("client_id", client_id),
                    ("client_secret", client_secret),
                    ("code", code),
                    ("redirect_uri", redirect_uri.as_str()),
                    ("grant_type", "authorization_code"),
                ],
                None,
            )
            .await?;
        info!("google fit authorization code exchanged");
        Ok(token)
    }

    async fn refresh_token(&self, refresh_token: &str) -> EngineResult<TokenExchange> {
        let (client_id, client_secret) = self.config.credentials()?;
        let token = self
            .token_request(
                &[
                    ("client_id", client_id),
                    ("client_secret", client_secret),
                    ("refresh_token", refresh_token),
                    ("grant_type", "refresh_token"),
                ],
                Some(refresh_token),
            )
            .await?;
        info!("google fit token refreshed");
        Ok(token)
    }

    async fn revoke_token(&self, access_token: &str) -> EngineResult<()> {
        let response = self
            .oauth_http
            .post(&self.config.revoke_url)
            .form(&[("token", access_token)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::sync_failure(
                Platform::GoogleFit,
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
        let url = format!("{}/users/me/sessions", self.config.api_base);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("startTime", since.to_rfc3339())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                warn!("failed to read error response body: {e}");
                "unable to read error response".into()
            });
            error!("google fit session fetch failed: {status} - {body}");
            return Err(EngineError::sync_failure(
                Platform::GoogleFit,
                status.as_u16(),
                body,
            ));
        }

        let sessions: SessionListResponse = response.json().await?;
        Ok(sessions
            .session
            .into_iter()
            .map(RemoteActivity::from)
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionListResponse {
    #[serde(default)]
    session: Vec<GoogleFitSession>,
}

/// Google Fit serializes millisecond timestamps as strings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleFitSession {
    id: String,
    name: Option<String>,
    start_time_millis: Option<String>,
    end_time_millis: Option<String>,
    activity_type: Option<u32>,
}

impl From<GoogleFitSession> for RemoteActivity {
    fn from(session: GoogleFitSession) -> Self {
        let start_at = parse_millis(session.start_time_millis.as_deref());
        let end_at = parse_millis(session.end_time_millis.as_deref());
        let duration_seconds = match (start_at, end_at) {
            (Some(start), Some(end)) if end > start => {
                u64::try_from((end - start).num_seconds()).ok()
            }
            _ => None,
        };
        Self {
            external_id: Some(session.id),
            activity_type: RemoteActivityType::Coded(session.activity_type.unwrap_or(u32::MAX)),
            title: session.name,
            start_at,
            end_at,
            duration_seconds,
            distance_meters: None,
            calories: None,
            heart_rate_avg: None,
            heart_rate_max: None,
            heart_rate_min: None,
        }
    }
}

fn parse_millis(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|value| value.parse::<i64>().ok())
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

//! Bakaláři API client
//!
//! Thin typed wrapper over [`HttpClient`]. Implements the refresh transport
//! port (one call = one wire request; the retry protocol lives with the
//! session manager) and the bearer-authenticated timetable/homework fetches.

use async_trait::async_trait;
use bakasync_core::{RefreshReply, RefreshTransport, TokenGrant};
use bakasync_domain::constants::{
    API_CLIENT_ID, API_HOMEWORKS_PATH, API_LOGIN_PATH, API_TIMETABLE_PATH,
};
use bakasync_domain::{BakasyncError, HttpSettings, Result};
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use reqwest::Method;
use tracing::debug;

use super::types::{HomeworksResponse, LoginBody, TimetableResponse};
use crate::http::HttpClient;

/// Typed client for the Bakaláři v3 endpoints.
#[derive(Clone)]
pub struct BakalariClient {
    http: HttpClient,
}

impl BakalariClient {
    /// Build a client from the application's HTTP settings.
    ///
    /// Every request carries the browser-like header set the school servers
    /// are known to accept, on both refresh attempts alike.
    ///
    /// # Errors
    /// Returns `Config` if the transport cannot be constructed.
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_seconds))
            .user_agent(settings.user_agent.clone())
            .default_headers(default_header_set())
            .build()?;
        Ok(Self { http })
    }

    /// Wrap an already-configured transport (used by tests).
    #[must_use]
    pub fn with_http(http: HttpClient) -> Self {
        Self { http }
    }

    /// `GET /api/3/timetable/actual?date=YYYY-MM-DD`, bearer-authenticated.
    ///
    /// # Errors
    /// Returns `Network` for transport failures and `FetchFailure` for error
    /// statuses or undecodable bodies.
    pub async fn fetch_timetable(
        &self,
        endpoint_url: &str,
        access_token: &str,
        date: NaiveDate,
    ) -> Result<TimetableResponse> {
        let url = join_url(endpoint_url, API_TIMETABLE_PATH);
        debug!(%date, "fetching timetable");

        let response = self
            .http
            .send(
                self.http
                    .request(Method::GET, url)
                    .query(&[("date", date.format("%Y-%m-%d").to_string())])
                    .bearer_auth(access_token),
            )
            .await?;

        if !response.status().is_success() {
            return Err(BakasyncError::FetchFailure(format!(
                "timetable request failed with status {}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| crate::errors::InfraError::from(e).into())
    }

    /// `GET /api/3/homeworks?from=...&to=...`, bearer-authenticated.
    ///
    /// # Errors
    /// Returns `Network` for transport failures and `FetchFailure` for error
    /// statuses or undecodable bodies.
    pub async fn fetch_homeworks(
        &self,
        endpoint_url: &str,
        access_token: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HomeworksResponse> {
        let url = join_url(endpoint_url, API_HOMEWORKS_PATH);
        debug!(%from, %to, "fetching homeworks");

        let response = self
            .http
            .send(
                self.http
                    .request(Method::GET, url)
                    .query(&[
                        ("from", from.format("%Y-%m-%d").to_string()),
                        ("to", to.format("%Y-%m-%d").to_string()),
                    ])
                    .bearer_auth(access_token),
            )
            .await?;

        if !response.status().is_success() {
            return Err(BakasyncError::FetchFailure(format!(
                "homeworks request failed with status {}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| crate::errors::InfraError::from(e).into())
    }
}

#[async_trait]
impl RefreshTransport for BakalariClient {
    async fn request_refresh(
        &self,
        endpoint_url: &str,
        refresh_token: &str,
    ) -> Result<RefreshReply> {
        let url = join_url(endpoint_url, API_LOGIN_PATH);

        let response = self
            .http
            .send(self.http.request(Method::POST, url).form(&[
                ("client_id", API_CLIENT_ID),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ]))
            .await?;

        let status = response.status().as_u16();
        // Error pages are not always JSON; an undecodable body just means no
        // token fields and no description.
        let body: LoginBody = response.json().await.unwrap_or_default();

        let grant = match (body.access_token, body.refresh_token, body.expires_in) {
            (Some(access_token), Some(refresh_token), Some(expires_in)) => {
                Some(TokenGrant { access_token, refresh_token, expires_in })
            }
            _ => None,
        };

        Ok(RefreshReply {
            status,
            grant,
            error: body.error,
            error_description: body.error_description,
        })
    }
}

/// Join an endpoint base with an API path, tolerating a trailing slash.
fn join_url(endpoint_url: &str, path: &str) -> String {
    format!("{}{}", endpoint_url.trim_end_matches('/'), path)
}

/// Header set the original mobile/web clients send; kept identical on every
/// request, including both attempts of the refresh protocol.
fn default_header_set() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.7,cs;q=0.3"),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}

//! HTTP client for the search-interest web endpoints.
//!
//! Fetching one keyword takes two calls: `explore` returns widget descriptors,
//! and the `TIMESERIES` widget's token and request are replayed against
//! `widgetdata/multiline` to get the interest-over-time samples.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::{header::RETRY_AFTER, Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::TrendsError;
use crate::normalize::normalize_timeline;
use crate::retry::retry_with_backoff;
use crate::series::{TimeSeriesResponse, TimeWindow};
use crate::types::{strip_json_guard, ExploreResponse, MultilineResponse};

const HOST_LANGUAGE: &str = "en-US";
/// Timezone offset in minutes, as the web UI sends it.
const TZ_OFFSET_MINUTES: i32 = 360;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

/// Client for the search-interest endpoints.
///
/// The base URL is configurable so tests can point it at a mock server.
#[derive(Debug)]
pub struct TrendsClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
    session_primed: AtomicBool,
}

impl TrendsClient {
    /// Creates a new client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`TrendsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`TrendsError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        max_retries: u32,
    ) -> Result<Self, TrendsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("trendwatch/0.1 (interest-refresh)")
            .cookie_store(true)
            .build()?;

        // Exactly one trailing slash so endpoint paths append instead of replacing.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| TrendsError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
            max_retries,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            session_primed: AtomicBool::new(false),
        })
    }

    /// Overrides the base delay of the transient-error back-off.
    #[must_use]
    pub fn with_backoff_base_ms(mut self, backoff_base_ms: u64) -> Self {
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Fetches the interest-over-time series for one keyword.
    ///
    /// # Errors
    ///
    /// - [`TrendsError::RateLimited`] on HTTP 429 (never retried here).
    /// - [`TrendsError::UnexpectedStatus`] on any other non-2xx status after retries.
    /// - [`TrendsError::Http`] on network failure after retries.
    /// - [`TrendsError::Deserialize`] if a body does not match the expected shape.
    /// - [`TrendsError::MissingWidget`] if `explore` returns no `TIMESERIES` widget.
    pub async fn fetch_interest_series(
        &self,
        keyword: &str,
        window: TimeWindow,
    ) -> Result<TimeSeriesResponse, TrendsError> {
        self.prime_session().await;

        let explore_url = self.explore_url(keyword, window);
        let explore: ExploreResponse = self
            .request_json(&explore_url, &format!("explore(keyword={keyword})"))
            .await?;

        let (token, request) =
            explore
                .timeseries_widget()
                .ok_or_else(|| TrendsError::MissingWidget {
                    keyword: keyword.to_owned(),
                })?;

        let multiline_url = self.multiline_url(token, request);
        let multiline: MultilineResponse = self
            .request_json(&multiline_url, &format!("multiline(keyword={keyword})"))
            .await?;

        let series = normalize_timeline(&[keyword], &multiline);
        tracing::debug!(keyword, rows = series.rows.len(), "fetched interest series");
        Ok(series)
    }

    /// Visits the landing page once so the cookie store holds a session cookie.
    ///
    /// Failures are ignored; the data endpoints are tried regardless.
    async fn prime_session(&self) {
        if self.session_primed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("geo", "US");
        match self.client.get(url).send().await {
            Ok(response) => {
                tracing::debug!(status = %response.status(), "primed provider session");
            }
            Err(e) => {
                tracing::debug!(error = %e, "provider session priming failed");
            }
        }
    }

    fn explore_url(&self, keyword: &str, window: TimeWindow) -> Url {
        let req = serde_json::json!({
            "comparisonItem": [
                { "keyword": keyword, "geo": "", "time": window.as_timeframe() }
            ],
            "category": 0,
            "property": "",
        });
        self.build_url("trends/api/explore", &[("req", &req.to_string())])
    }

    fn multiline_url(&self, token: &str, request: &serde_json::Value) -> Url {
        self.build_url(
            "trends/api/widgetdata/multiline",
            &[("req", &request.to_string()), ("token", token)],
        )
    }

    /// Builds an endpoint URL with percent-encoded query parameters.
    fn build_url(&self, path: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{path}", self.base_url.path()));
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("hl", HOST_LANGUAGE);
            pairs.append_pair("tz", &TZ_OFFSET_MINUTES.to_string());
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// GETs `url` with retry on transient errors and parses the guarded JSON body.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, TrendsError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_text(url)
        })
        .await?;

        serde_json::from_str(strip_json_guard(&body)).map_err(|e| TrendsError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    async fn request_text(&self, url: &Url) -> Result<String, TrendsError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Err(TrendsError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(TrendsError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.path().to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}

//! Resilient single-call HTTP execution
//!
//! One bounded attempt loop per call, with outcome-specific policy:
//!
//! | Outcome | Action |
//! |---|---|
//! | under pacing interval | sleep the remainder before sending |
//! | 429 | honor `Retry-After` up to a max-wait ceiling, else fail fast |
//! | 401 | re-authenticate once inline without consuming a retry slot |
//! | 5xx | exponential backoff (`2^attempt` seconds) up to the budget |
//! | other 4xx | fail immediately |
//! | connection/timeout | backoff like 5xx, wrapped as status 0 when exhausted |
//! | 2xx | parse JSON; parse failure is non-recoverable |
//!
//! Every attempt's request and response are recorded on a per-call
//! diagnostic record so a failure can be inspected without re-issuing the
//! call. The clock (and therefore every sleep) is injectable so tests run
//! without wall-clock delays.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use prospectarc_common::{Clock, Pacer, RetryStrategy};
use prospectarc_domain::constants::DEFAULT_RATE_LIMIT_FALLBACK_SECS;
use prospectarc_domain::{ProspectError, ProviderConfig, Result};
use reqwest::header::RETRY_AFTER;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::auth::AccessTokenProvider;

const BODY_SNIPPET_LIMIT: usize = 300;

/// Diagnostic record of the most recent exchange on this executor
#[derive(Debug, Clone)]
pub struct ExchangeRecord {
    pub method: String,
    pub url: String,
    pub request_body: Option<Value>,
    pub status: Option<u16>,
    pub response_body: Option<String>,
    /// 0-based attempt number that produced this exchange
    pub attempt: u32,
}

/// Issues single provider calls with pacing, retries, and diagnostics
pub struct RequestExecutor {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<dyn AccessTokenProvider>,
    clock: Arc<dyn Clock>,
    pacer: Pacer,
    retry: RetryStrategy,
    rate_limit_max_wait: Duration,
    last_exchange: Mutex<Option<ExchangeRecord>>,
}

impl RequestExecutor {
    /// # Errors
    /// Returns a `Config` error if the HTTP client cannot be constructed.
    pub fn new(
        config: &ProviderConfig,
        auth: Arc<dyn AccessTokenProvider>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ProspectError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            auth,
            clock,
            pacer: Pacer::new(config.pacing_interval()),
            retry: RetryStrategy::new().with_max_attempts(config.retry_budget),
            rate_limit_max_wait: config.rate_limit_max_wait(),
            last_exchange: Mutex::new(None),
        })
    }

    /// The recorded request/response of the most recent attempt
    pub fn last_exchange(&self) -> Option<ExchangeRecord> {
        self.last_exchange.lock().clone()
    }

    /// Execute one provider call and parse its JSON body.
    ///
    /// # Errors
    /// Classified per the policy table in the module docs.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt: u32 = 0;
        let mut reauthenticated = false;

        loop {
            self.pacer.pace(self.clock.as_ref()).await;

            // Auth errors here are non-recoverable and abort immediately
            let token = self.auth.access_token().await?;

            let mut request = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(&token)
                .header("Content-Type", "application/json");
            if let Some(body) = body {
                request = request.json(body);
            }

            debug!(%method, %url, attempt, "sending provider request");
            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    self.record(&method, &url, body, None, None, attempt);
                    if self.retry.should_retry(attempt) {
                        let delay = self.retry.delay_for(attempt);
                        warn!(error = %err, delay_secs = delay.as_secs(), "connection error; backing off");
                        self.clock.sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(ProspectError::Api {
                        status: 0,
                        message: format!(
                            "connection error after {} attempts: {err}",
                            attempt + 1
                        ),
                    });
                }
            };

            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get(RETRY_AFTER));
            let text = response.text().await.unwrap_or_default();
            self.record(&method, &url, body, Some(status.as_u16()), Some(&text), attempt);

            if status.is_success() {
                return serde_json::from_str(&text)
                    .map_err(|e| ProspectError::Parse(format!("invalid JSON response: {e}")));
            }

            if status == StatusCode::UNAUTHORIZED {
                if reauthenticated {
                    return Err(ProspectError::Auth(
                        "still unauthorized after inline token refresh".into(),
                    ));
                }
                debug!("401 received; re-authenticating inline");
                // Does not consume a retry slot
                self.auth.refresh_token().await?;
                reauthenticated = true;
                continue;
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait_secs = retry_after.unwrap_or(DEFAULT_RATE_LIMIT_FALLBACK_SECS);
                if Duration::from_secs(wait_secs) > self.rate_limit_max_wait {
                    return Err(ProspectError::RateLimit {
                        retry_after_secs: wait_secs,
                        message: "advertised wait exceeds the max-wait ceiling".into(),
                    });
                }
                if self.retry.should_retry(attempt) {
                    warn!(wait_secs, "rate limited; honoring Retry-After");
                    self.clock.sleep(Duration::from_secs(wait_secs)).await;
                    attempt += 1;
                    continue;
                }
                return Err(ProspectError::RateLimit {
                    retry_after_secs: wait_secs,
                    message: "retry budget exhausted".into(),
                });
            }

            if status.is_server_error() {
                if self.retry.should_retry(attempt) {
                    let delay = self.retry.delay_for(attempt);
                    warn!(status = status.as_u16(), delay_secs = delay.as_secs(), "server error; backing off");
                    self.clock.sleep(delay).await;
                    attempt += 1;
                    continue;
                }
                return Err(ProspectError::Api {
                    status: status.as_u16(),
                    message: snippet(&text),
                });
            }

            // Remaining 4xx are caller mistakes; retrying cannot help
            return Err(ProspectError::Api { status: status.as_u16(), message: snippet(&text) });
        }
    }

    fn record(
        &self,
        method: &Method,
        url: &str,
        request_body: Option<&Value>,
        status: Option<u16>,
        response_body: Option<&str>,
        attempt: u32,
    ) {
        *self.last_exchange.lock() = Some(ExchangeRecord {
            method: method.to_string(),
            url: url.to_string(),
            request_body: request_body.cloned(),
            status,
            response_body: response_body.map(ToString::to_string),
            attempt,
        });
    }
}

fn parse_retry_after(header: Option<&reqwest::header::HeaderValue>) -> Option<u64> {
    header.and_then(|v| v.to_str().ok()).and_then(|v| v.trim().parse::<u64>().ok())
}

fn snippet(body: &str) -> String {
    if body.len() <= BODY_SNIPPET_LIMIT {
        body.to_string()
    } else {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i < BODY_SNIPPET_LIMIT)
            .last()
            .map_or(0, |(i, c)| i + c.len_utf8());
        format!("{}...", &body[..cut])
    }
}

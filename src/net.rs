use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::errors::GdtError;

/// Upstream endpoint a request is made against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Standings,
    TeamSummary,
    ClubStats,
    Schedule,
    ClubSchedule,
    LineCombinations,
}

impl Source {
    pub fn display_name(&self) -> &'static str {
        match self {
            Source::Standings => "standings",
            Source::TeamSummary => "team summary",
            Source::ClubStats => "club stats",
            Source::Schedule => "schedule",
            Source::ClubSchedule => "club schedule",
            Source::LineCombinations => "line combinations",
        }
    }

    /// Required sources abort the run when they fail; the rest degrade.
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Source::Standings | Source::TeamSummary | Source::ClubStats
        )
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Everything the pipeline needs from the network.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn get_text(&self, source: Source, url: &str) -> Result<String, GdtError>;
}

/// GET `url` and decode the body as JSON.
pub async fn get_json<F, T>(fetcher: &F, source: Source, url: &str) -> Result<T, GdtError>
where
    F: Fetcher + ?Sized,
    T: DeserializeOwned,
{
    let body = fetcher.get_text(source, url).await?;
    serde_json::from_str(&body)
        .map_err(|e| GdtError::data_source(source, url, format!("invalid JSON: {}", e)))
}

enum Failure {
    Transient(String),
    Fatal(String),
}

/// reqwest-backed fetcher with a per-request timeout and a bounded retry.
pub struct HttpFetcher {
    client: Client,
    retries: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent(config.user_agent.clone())
                .timeout(config.timeout())
                .build()
                .unwrap_or_default(),
            retries: config.retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    async fn attempt(&self, url: &str) -> Result<String, Failure> {
        let resp = self.client.get(url).send().await.map_err(classify)?;
        let status = resp.status();
        if !status.is_success() {
            let msg = format!("HTTP {}", status.as_u16());
            return if is_transient_status(status) {
                Err(Failure::Transient(msg))
            } else {
                Err(Failure::Fatal(msg))
            };
        }
        resp.text()
            .await
            .map_err(|e| Failure::Transient(format!("reading body: {}", e)))
    }
}

impl Fetcher for HttpFetcher {
    async fn get_text(&self, source: Source, url: &str) -> Result<String, GdtError> {
        let mut attempt = 0;
        loop {
            debug!(%source, url, attempt, "GET");
            match self.attempt(url).await {
                Ok(body) => return Ok(body),
                Err(Failure::Transient(msg)) if attempt < self.retries => {
                    attempt += 1;
                    warn!(%source, url, "{}; retrying ({}/{})", msg, attempt, self.retries);
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(Failure::Transient(msg)) | Err(Failure::Fatal(msg)) => {
                    return Err(GdtError::data_source(source, url, msg));
                }
            }
        }
    }
}

fn classify(e: reqwest::Error) -> Failure {
    if e.is_timeout() {
        Failure::Transient("request timed out".to_string())
    } else if e.is_connect() || e.is_request() {
        Failure::Transient(format!("connection failed: {}", e))
    } else {
        Failure::Fatal(e.to_string())
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

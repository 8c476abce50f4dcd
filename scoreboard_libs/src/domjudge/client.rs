use crate::domjudge::config::{ApiConfig, Credentials};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client, StatusCode,
};
use serde_json::Value;
use thiserror::Error;
use tokio::time::Duration;
use url::Url;

type Result<T> = std::result::Result<T, FetchError>;

pub const CONTESTS_TIMEOUT: Duration = Duration::from_secs(5);
pub const PROBLEMS_TIMEOUT: Duration = Duration::from_secs(5);
pub const ORGANIZATIONS_TIMEOUT: Duration = Duration::from_secs(5);
pub const TEAMS_TIMEOUT: Duration = Duration::from_secs(10);
pub const SCOREBOARD_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("contest-scoreboard/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: Url },
    #[error("contest API returned {status} for {url}")]
    Status { status: StatusCode, url: Url },
    #[error("failed to request to contest API")]
    Request(#[source] reqwest::Error),
    #[error("failed to deserialize JSON data")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid contest API url given")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    fn from_reqwest(error: reqwest::Error, url: &Url) -> Self {
        if error.is_timeout() {
            FetchError::Timeout { url: url.clone() }
        } else {
            FetchError::Request(error)
        }
    }

    /// HTTP status of the upstream response, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Request(e) => e.status(),
            _ => None,
        }
    }
}

/// Read-only view of the contest API used by the aggregator.
#[async_trait]
pub trait ContestApi: Send + Sync {
    /// Base url that relative references in payloads (e.g. logo hrefs) are resolved against.
    fn base_url(&self) -> &Url;
    async fn contests(&self) -> Result<Value>;
    async fn problems(&self, contest_id: &str) -> Result<Value>;
    async fn teams(&self, contest_id: &str) -> Result<Value>;
    async fn organizations(&self, contest_id: &str) -> Result<Value>;
    async fn scoreboard(&self, contest_id: &str) -> Result<Value>;
}

pub struct DomjudgeClient {
    base_url: Url,
    credentials: Option<Credentials>,
    client: Client,
}

impl DomjudgeClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Request)?;

        Ok(DomjudgeClient {
            base_url: config.base_url,
            credentials: config.credentials,
            client,
        })
    }

    /// Build the url of an endpoint below the base url, percent-encoding each segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Send a single GET request bounded by `timeout` and decode the body as JSON.
    ///
    /// There is no retry. Timeouts, non-2xx statuses and undecodable bodies are returned as
    /// [`FetchError`].
    pub async fn fetch_json(&self, url: Url, timeout: Duration) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url.clone()).timeout(timeout);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let res = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, &url))?;

        if let Err(e) = res.error_for_status_ref() {
            tracing::debug!("error response returned from contest API: {:?}", e);
            return Err(FetchError::Status {
                status: res.status(),
                url,
            });
        }

        let body = res
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(e, &url))?;
        let value: Value = serde_json::from_slice(&body)?;

        Ok(value)
    }
}

#[async_trait]
impl ContestApi for DomjudgeClient {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn contests(&self) -> Result<Value> {
        let url = self.endpoint(&["contests"])?;
        self.fetch_json(url, CONTESTS_TIMEOUT).await
    }

    async fn problems(&self, contest_id: &str) -> Result<Value> {
        let url = self.endpoint(&["contests", contest_id, "problems"])?;
        self.fetch_json(url, PROBLEMS_TIMEOUT).await
    }

    async fn teams(&self, contest_id: &str) -> Result<Value> {
        let url = self.endpoint(&["contests", contest_id, "teams"])?;
        self.fetch_json(url, TEAMS_TIMEOUT).await
    }

    async fn organizations(&self, contest_id: &str) -> Result<Value> {
        let url = self.endpoint(&["contests", contest_id, "organizations"])?;
        self.fetch_json(url, ORGANIZATIONS_TIMEOUT).await
    }

    async fn scoreboard(&self, contest_id: &str) -> Result<Value> {
        let mut url = self.endpoint(&["contests", contest_id, "scoreboard"])?;
        url.query_pairs_mut()
            .append_pair("allteams", "false")
            .append_pair("strict", "false");
        self.fetch_json(url, SCOREBOARD_TIMEOUT).await
    }
}

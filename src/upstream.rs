use std::{fmt, time::Duration};

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::value::RawValue;
use url::Url;

use crate::{
    config::Config,
    dto::{GenerateMessageRequest, ListProfilesParams, SearchRequest},
    service,
};

/// Upstream JSON kept byte-for-byte, so relaying it never reorders keys or
/// rounds numbers.
pub type Payload = Box<RawValue>;

/// Cap on how much of an upstream error body ends up in the logs.
const LOGGED_BODY_LIMIT: usize = 1024;

/// Result of one outbound call to the ML service.
#[derive(Debug)]
pub enum UpstreamOutcome {
    Success(Payload),
    /// Connection could not be established.
    Unreachable,
    Timeout(Duration),
    /// Upstream answered with a non-2xx status.
    UpstreamError { status: StatusCode, body: Box<str> },
    /// Any other transport error, or a success payload that is not JSON.
    Failed(Box<str>),
}

impl fmt::Display for UpstreamOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(_) => write!(f, "success"),
            Self::Unreachable => write!(f, "ML service unreachable"),
            Self::Timeout(after) => write!(f, "timeout of {}ms exceeded", after.as_millis()),
            Self::UpstreamError { status, .. } => {
                write!(f, "request failed with status code {}", status.as_u16())
            }
            Self::Failed(message) => write!(f, "{message}"),
        }
    }
}

impl UpstreamOutcome {
    fn from_error(error: reqwest::Error, timeout: Duration) -> Self {
        // A connect attempt that runs out the budget is a timeout, not a refusal.
        if error.is_timeout() {
            Self::Timeout(timeout)
        } else if error.is_connect() {
            Self::Unreachable
        } else {
            Self::Failed(error.to_string().into())
        }
    }

    /// Fine-grained mapping: unreachable is distinguished from every other failure.
    pub fn into_result(self, upstream: &str) -> service::Result<Payload> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Unreachable => Err(service::Error::UpstreamUnreachable {
                upstream: upstream.into(),
            }),
            other => Err(service::Error::UpstreamFailure(other.to_string().into())),
        }
    }

    /// Coarse-grained mapping: every failure becomes "failed to fetch <what>".
    pub fn into_fetch_result(self, what: &'static str) -> service::Result<Payload> {
        match self {
            Self::Success(payload) => Ok(payload),
            _ => Err(service::Error::FetchFailed(what)),
        }
    }
}

/// Client for the external profile-matching service.
#[derive(Debug, Clone)]
pub struct MlClient {
    http: Client,
    base_url: Url,
    upstream_timeout: Duration,
    generate_timeout: Duration,
}

impl MlClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().build()?,
            base_url: config.upstream_url.clone(),
            upstream_timeout: config.upstream_timeout,
            generate_timeout: config.generate_timeout,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn search(&self, request: &SearchRequest) -> UpstreamOutcome {
        let builder = self.http.get(self.endpoint(&["search"])).query(request);
        send(builder, self.upstream_timeout).await
    }

    pub async fn profile(&self, id: &str) -> UpstreamOutcome {
        let builder = self.http.get(self.endpoint(&["profile", id]));
        send(builder, self.upstream_timeout).await
    }

    pub async fn profiles(&self, params: &ListProfilesParams) -> UpstreamOutcome {
        let builder = self.http.get(self.endpoint(&["profiles"])).query(params);
        send(builder, self.upstream_timeout).await
    }

    pub async fn generate_message(&self, request: &GenerateMessageRequest) -> UpstreamOutcome {
        let builder = self.http.post(self.endpoint(&["generate-message"])).json(request);
        send(builder, self.generate_timeout).await
    }
}

async fn send(builder: RequestBuilder, timeout: Duration) -> UpstreamOutcome {
    let response = match builder.timeout(timeout).send().await {
        Ok(response) => response,
        Err(error) => return UpstreamOutcome::from_error(error, timeout),
    };

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!("ML service responded {status}: {}", truncate(&body, LOGGED_BODY_LIMIT));
        return UpstreamOutcome::UpstreamError {
            status,
            body: body.into(),
        };
    }

    let text = match response.text().await {
        Ok(text) => text,
        Err(error) if error.is_timeout() => return UpstreamOutcome::Timeout(timeout),
        Err(error) => return UpstreamOutcome::Failed(error.to_string().into()),
    };

    match RawValue::from_string(text) {
        Ok(payload) => UpstreamOutcome::Success(payload),
        Err(error) => UpstreamOutcome::Failed(format!("invalid ML service response: {error}").into()),
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

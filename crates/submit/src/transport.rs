use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("unable to build http client: {0}")]
    Client(#[source] BoxError),

    #[error("network request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: BoxError,
    },
}

/// Status, content type and body of a completed request, whatever its status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    message: Option<String>,
}

impl RawResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Message from the backend's `{"status": "error", "message": ...}` body, if present.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        serde_json::from_slice::<BackendErrorBody>(&self.body)
            .ok()
            .and_then(|body| body.message)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `pairs` as a URL-encoded form body.
    ///
    /// # Errors
    /// Returns an error only when no response was received.
    async fn post_form(
        &self,
        path: &str,
        pairs: &[(&str, &str)],
    ) -> Result<RawResponse, TransportError>;

    /// # Errors
    /// Returns an error only when no response was received.
    async fn get(&self, path: &str) -> Result<RawResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// # Errors
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| TransportError::Client(Box::new(error)))?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim().trim_start_matches('/'))
    }

    async fn read_response(
        url: &str,
        response: reqwest::Response,
    ) -> Result<RawResponse, TransportError> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|error| network_error(url, error))?
            .to_vec();

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(
        &self,
        path: &str,
        pairs: &[(&str, &str)],
    ) -> Result<RawResponse, TransportError> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(encode_form(pairs))
            .send()
            .await
            .map_err(|error| network_error(&url, error))?;

        Self::read_response(&url, response).await
    }

    async fn get(&self, path: &str) -> Result<RawResponse, TransportError> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|error| network_error(&url, error))?;

        Self::read_response(&url, response).await
    }
}

fn network_error(url: &str, error: reqwest::Error) -> TransportError {
    TransportError::Network {
        url: url.to_string(),
        source: Box::new(error),
    }
}

#[must_use]
pub fn encode_form(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

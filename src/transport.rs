use std::{fmt, time::Duration};

use base64::{engine::general_purpose, Engine as _};
use reqwest::{header, Method};

use crate::RqliteError;

/// Status code and full body of one HTTP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Clone, PartialEq, Eq)]
pub(crate) struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    /// `Authorization` header value, or `None` when both parts are empty.
    pub fn header_value(&self) -> Option<String> {
        if self.username.is_empty() && self.password.is_empty() {
            return None;
        }
        let credentials = format!("{}:{}", self.username, self.password);
        Some(format!(
            "Basic {}",
            general_purpose::STANDARD.encode(credentials.as_bytes())
        ))
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sends single HTTP requests. Never retries.
#[derive(Clone, Debug, Default)]
pub(crate) struct Transport {
    http: reqwest::Client,
    auth: Option<BasicAuth>,
}

impl Transport {
    pub fn set_basic_auth(&mut self, username: String, password: String) {
        self.auth = Some(BasicAuth { username, password });
    }

    /// Performs one request and reads the whole body, whatever the status.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<RawResponse, RqliteError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(%method, url, "sending request");
        #[cfg(feature = "tracing")]
        if let Some(body) = body {
            tracing::trace!(body = %body, "request body");
        }

        let mut request = self.http.request(method, url);
        if let Some(value) = self.auth.as_ref().and_then(BasicAuth::header_value) {
            request = request.header(header::AUTHORIZATION, value);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(RqliteError::Transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(RqliteError::Transport)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(status, "received response");

        Ok(RawResponse { status, body })
    }
}

//! HTTP session for the Polar Flow web service.
//!
//! This module provides a reqwest-based implementation of the [`FlowSession`](crate::FlowSession) trait.
//! Authentication is cookie based, so the underlying client keeps a cookie jar
//! that every later request reuses.

use crate::{FlowError, FlowSession};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

/// Cookie-backed session against Polar Flow using reqwest.
///
/// The cookie jar is shared by clones of this session. Logging in from several
/// tasks at once is not coordinated here; callers that share a session must
/// serialize `authenticate` themselves or use one session per task.
#[derive(Clone, Debug)]
pub struct ReqwestFlowSession {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestFlowSession {
    /// Create a session with a fresh cookie jar.
    ///
    /// # Arguments
    /// * `base_url` - The service root (e.g., "https://flow.polar.com")
    pub fn new(base_url: &str) -> Result<Self, FlowError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Wrap a caller-built client, e.g. one configured with timeouts.
    ///
    /// The client must have a cookie store enabled for login to stick.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, url: &str, resp: reqwest::Response) -> FlowError {
        let status = resp.status().as_u16();
        FlowError::Transport {
            url: url.to_string(),
            status,
            body: body_snippet(resp).await,
        }
    }
}

async fn body_snippet(resp: reqwest::Response) -> String {
    let body = resp.text().await.unwrap_or_default();
    body.chars().take(256).collect()
}

#[async_trait]
impl FlowSession for ReqwestFlowSession {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<(), FlowError> {
        // The login form is rejected unless the session cookies were set first.
        let prime_url = format!("{}/ajaxLogin", self.base_url);
        tracing::debug!("priming session cookies at {}", prime_url);
        self.client.get(&prime_url).send().await?;

        let login_url = format!("{}/login", self.base_url);
        let form = [
            ("email", username),
            ("password", password.expose_secret()),
            ("returnURL", "/"),
        ];
        let resp = self.client.post(&login_url).form(&form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::debug!("login rejected with status {}", status);
            return Err(FlowError::AuthenticationFailed {
                status: status.as_u16(),
                body: body_snippet(resp).await,
            });
        }
        tracing::debug!("logged in as {}", username);
        Ok(())
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, FlowError> {
        let resp = self.client.get(url).query(query).send().await?;
        if !resp.status().is_success() {
            return Err(self.error_from_response(url, resp).await);
        }
        // Read the body as text first so decode errors can quote it.
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            let body_snippet: String = text.chars().take(256).collect();
            FlowError::UnexpectedResponse {
                url: url.to_string(),
                reason: format!("decoding json: {} - body: {}", e, body_snippet),
            }
        })
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FlowError> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(self.error_from_response(url, resp).await);
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

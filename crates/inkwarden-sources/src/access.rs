//! Live accessibility checks
//!
//! A GET with a bounded timeout. A 2xx/3xx answer still fails when the body
//! reads like a "page not found" page. Every failure is a value.

use crate::config::VerifierConfig;
use crate::error::SourceError;
use inkwarden_domain::html::{strip_html, truncate_chars};
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Outcome of the accessibility layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCheck {
    /// Whether the page is reachable and real
    pub accessible: bool,

    /// HTTP status, when a response arrived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Plain-text excerpt of the page for deep reading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl AccessCheck {
    fn fail(status: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            accessible: false,
            status,
            reason: Some(reason.into()),
            content: None,
        }
    }
}

/// Fetches candidate pages
#[derive(Debug, Clone)]
pub struct AccessChecker {
    client: reqwest::Client,
    timeout: Duration,
    user_agent: String,
    soft_404_phrases: Vec<String>,
    excerpt_chars: usize,
}

impl AccessChecker {
    /// Build a checker from verifier settings
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Client` if the HTTP client cannot be built.
    pub fn new(config: &VerifierConfig) -> Result<Self, SourceError> {
        let timeout = config.access_timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| SourceError::Client(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout,
            user_agent: config.user_agent.clone(),
            soft_404_phrases: config.soft_404_phrases.iter().map(|p| p.to_lowercase()).collect(),
            excerpt_chars: config.content_excerpt_chars,
        })
    }

    /// Fetch `url` and classify the response
    pub async fn check(&self, url: &str) -> AccessCheck {
        let response = match self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return AccessCheck::fail(None, format!("timed out after {}s", self.timeout.as_secs()));
            }
            Err(e) => return AccessCheck::fail(None, format!("request failed: {}", e)),
        };

        let status = response.status().as_u16();
        if !(200..400).contains(&status) {
            return AccessCheck::fail(Some(status), format!("HTTP {}", status));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                return AccessCheck::fail(Some(status), format!("timed out after {}s", self.timeout.as_secs()));
            }
            Err(e) => return AccessCheck::fail(Some(status), format!("failed to read body: {}", e)),
        };

        let lower = body.to_lowercase();
        if let Some(phrase) = self.soft_404_phrases.iter().find(|p| lower.contains(p.as_str())) {
            debug!(url = %url, phrase = %phrase, "soft 404");
            return AccessCheck::fail(Some(status), format!("soft 404: page says \"{}\"", phrase));
        }

        AccessCheck {
            accessible: true,
            status: Some(status),
            reason: None,
            content: Some(truncate_chars(&strip_html(&body), self.excerpt_chars)),
        }
    }
}

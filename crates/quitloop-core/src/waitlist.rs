//! Client for the waitlist sign-up endpoint.
//!
//! Independent of the urge flow: nothing here reads or writes the local
//! log. The endpoint takes `{"email": "..."}` and answers
//! `{"ok": true}`, `{"error": "bad_email"}` (400) or
//! `{"error": "server_error"}` (500). A duplicate address counts as joined.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ValidationError, WaitlistError};
use crate::storage::WaitlistConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitlistOutcome {
    Joined,
    AlreadyListed,
}

#[derive(Serialize)]
struct JoinRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct JoinResponse {
    #[serde(default)]
    error: Option<String>,
}

/// Shape check only: exactly one `@` with text on both sides and no
/// whitespace. The server owns real validation.
pub fn validate_email(email: &str) -> Result<&str, ValidationError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct WaitlistClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl WaitlistClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, WaitlistError> {
        let endpoint = Url::parse(endpoint).map_err(|source| WaitlistError::Endpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint, http })
    }

    pub fn from_config(config: &WaitlistConfig) -> Result<Self, WaitlistError> {
        Self::new(&config.endpoint, Duration::from_secs(config.timeout_secs))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Submit an address.
    ///
    /// # Errors
    /// Fails locally on a malformed address; otherwise maps the endpoint's
    /// status to [`WaitlistError`].
    pub async fn join(&self, email: &str) -> Result<WaitlistOutcome, WaitlistError> {
        let email = validate_email(email)?;

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&JoinRequest { email })
            .send()
            .await?;

        let status = resp.status();
        let body: JoinResponse = resp.json().await.unwrap_or_default();
        let duplicate = body
            .error
            .as_deref()
            .is_some_and(|e| e.contains("duplicate"));

        if status.is_success() {
            return Ok(if duplicate {
                WaitlistOutcome::AlreadyListed
            } else {
                WaitlistOutcome::Joined
            });
        }
        if status == reqwest::StatusCode::CONFLICT || duplicate {
            return Ok(WaitlistOutcome::AlreadyListed);
        }
        if status == reqwest::StatusCode::BAD_REQUEST {
            return Err(WaitlistError::Rejected(
                body.error.unwrap_or_else(|| "bad_request".into()),
            ));
        }

        tracing::warn!(status = status.as_u16(), "waitlist endpoint failed");
        Err(WaitlistError::Server {
            status: status.as_u16(),
        })
    }
}

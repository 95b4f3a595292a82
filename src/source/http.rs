//! Remote configuration service client.
//!
//! # Protocol
//! ```text
//! POST {endpoint}/configurationsessions
//!     {ApplicationIdentifier, EnvironmentIdentifier,
//!      ConfigurationProfileIdentifier, RequiredMinimumPollIntervalInSeconds}
//!     → 201 {InitialConfigurationToken}
//!
//! GET {endpoint}/configuration?configuration_token=T
//!     → 200, header Next-Poll-Configuration-Token, body = document or empty
//!     → 400 when T has expired
//! ```

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::source::{ConfigFetchError, ConfigSource, PollOutcome};

pub const NEXT_TOKEN_HEADER: &str = "next-poll-configuration-token";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct StartSessionRequest<'a> {
    application_identifier: &'a str,
    environment_identifier: &'a str,
    configuration_profile_identifier: &'a str,
    required_minimum_poll_interval_in_seconds: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StartSessionResponse {
    initial_configuration_token: String,
}

/// Client for the remote configuration service.
#[derive(Debug, Clone)]
pub struct HttpConfigSource {
    client: reqwest::Client,
    endpoint: Url,
    application_id: String,
    environment_id: String,
    profile_id: String,
    min_poll_interval_secs: u64,
}

impl HttpConfigSource {
    pub fn new(
        client: reqwest::Client,
        endpoint: Url,
        application_id: impl Into<String>,
        environment_id: impl Into<String>,
        profile_id: impl Into<String>,
        min_poll_interval_secs: u64,
    ) -> Self {
        Self {
            client,
            endpoint,
            application_id: application_id.into(),
            environment_id: environment_id.into(),
            profile_id: profile_id.into(),
            min_poll_interval_secs,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.as_str().trim_end_matches('/'), path)
    }
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
    async fn start_session(&self) -> Result<String, ConfigFetchError> {
        let body = StartSessionRequest {
            application_identifier: &self.application_id,
            environment_identifier: &self.environment_id,
            configuration_profile_identifier: &self.profile_id,
            required_minimum_poll_interval_in_seconds: self.min_poll_interval_secs,
        };

        let response = self
            .client
            .post(self.url("configurationsessions"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConfigFetchError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let session: StartSessionResponse = serde_json::from_slice(&response.bytes().await?)?;
        tracing::info!(source = %self.describe(), "Configuration session started");
        Ok(session.initial_configuration_token)
    }

    async fn poll(&self, token: &str) -> Result<PollOutcome, ConfigFetchError> {
        let response = self
            .client
            .get(self.url("configuration"))
            .query(&[("configuration_token", token)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            return Err(ConfigFetchError::SessionExpired);
        }
        if !status.is_success() {
            return Err(ConfigFetchError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let next_token = response
            .headers()
            .get(NEXT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or(ConfigFetchError::MissingField(NEXT_TOKEN_HEADER))?;

        let body = response.bytes().await?;
        let content = if body.is_empty() { None } else { Some(body.to_vec()) };

        Ok(PollOutcome { next_token, content })
    }

    fn describe(&self) -> String {
        format!(
            "{} ({}/{}/{})",
            self.endpoint, self.application_id, self.environment_id, self.profile_id
        )
    }
}

use std::sync::Arc;
use std::time::Duration;

use engine_logging::engine_info;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::profile::ProfileUrl;
use crate::types::{ApiError, CandidateRecord, CreateOutcome, Job, SubmitOutcome};

const OUT_OF_CREDITS_MESSAGE: &str =
    "You are out of candidate credits. Upgrade your plan to keep adding candidates.";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.sourcer.example/v1".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Where session tokens come from. Absence of a token short-circuits every
/// call to its unauthenticated outcome without touching the network.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Option<String>;
}

/// Token handed in once at startup (flag or environment).
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Option<String> {
        self.token.clone()
    }
}

#[derive(Clone)]
pub struct TalentApi {
    settings: ApiSettings,
    tokens: Arc<dyn TokenProvider>,
}

#[derive(Debug, Deserialize)]
struct CreatedCandidate {
    id: String,
}

impl TalentApi {
    pub fn new(settings: ApiSettings, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { settings, tokens }
    }

    pub async fn submit_candidates_bulk(
        &self,
        job_id: &str,
        urls: &[ProfileUrl],
        search_mode: bool,
    ) -> Result<SubmitOutcome, ApiError> {
        let Some(token) = self.tokens.token().await else {
            return Ok(SubmitOutcome::Unauthenticated);
        };
        let body = json!({
            "profile_urls": urls.iter().map(ProfileUrl::canonical).collect::<Vec<_>>(),
            "search_mode": search_mode,
        });
        let response = self
            .build_client()?
            .post(self.endpoint(&format!("/jobs/{job_id}/candidates/bulk")))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if is_unauthenticated(status) {
            return Ok(SubmitOutcome::Unauthenticated);
        }
        if !status.is_success() {
            return Err(error_for_status(status, response).await);
        }
        engine_info!("submitted {} candidates to job {}", urls.len(), job_id);
        Ok(SubmitOutcome::Accepted)
    }

    pub async fn create_candidate(
        &self,
        job_id: &str,
        url: &ProfileUrl,
        search_mode: bool,
    ) -> Result<CreateOutcome, ApiError> {
        let Some(token) = self.tokens.token().await else {
            return Ok(CreateOutcome::Unauthenticated);
        };
        let body = json!({
            "profile_url": url.canonical(),
            "search_mode": search_mode,
        });
        let response = self
            .build_client()?
            .post(self.endpoint(&format!("/jobs/{job_id}/candidates")))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if is_unauthenticated(status) {
            return Ok(CreateOutcome::Unauthenticated);
        }
        if !status.is_success() {
            return Err(error_for_status(status, response).await);
        }
        let created: CreatedCandidate = response
            .json()
            .await
            .map_err(|err| ApiError::Body(err.to_string()))?;
        engine_info!("created candidate {} in job {}", created.id, job_id);
        Ok(CreateOutcome::Created {
            candidate_id: created.id,
        })
    }

    /// Direct status lookup. `Ok(None)` covers the window where the backend
    /// has accepted the candidate but not yet materialized its record.
    pub async fn get_candidate(
        &self,
        job_id: &str,
        candidate_id: &str,
    ) -> Result<Option<CandidateRecord>, ApiError> {
        let token = self.bearer().await?;
        let response = self
            .build_client()?
            .get(self.endpoint(&format!("/jobs/{job_id}/candidates/{candidate_id}")))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if is_unauthenticated(status) {
            return Err(ApiError::Unauthenticated);
        }
        if !status.is_success() {
            return Err(error_for_status(status, response).await);
        }
        let record = response
            .json()
            .await
            .map_err(|err| ApiError::Body(err.to_string()))?;
        Ok(Some(record))
    }

    pub async fn get_candidates(&self, job_id: &str) -> Result<Vec<CandidateRecord>, ApiError> {
        self.get_json(&format!("/jobs/{job_id}/candidates")).await
    }

    pub async fn delete_candidate(
        &self,
        job_id: &str,
        candidate_id: &str,
    ) -> Result<(), ApiError> {
        let token = self.bearer().await?;
        let response = self
            .build_client()?
            .delete(self.endpoint(&format!("/jobs/{job_id}/candidates/{candidate_id}")))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if is_unauthenticated(status) {
            return Err(ApiError::Unauthenticated);
        }
        if !status.is_success() {
            return Err(error_for_status(status, response).await);
        }
        engine_info!("deleted candidate {} from job {}", candidate_id, job_id);
        Ok(())
    }

    pub async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        self.get_json("/jobs").await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let token = self.bearer().await?;
        let response = self
            .build_client()?
            .get(self.endpoint(path))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if is_unauthenticated(status) {
            return Err(ApiError::Unauthenticated);
        }
        if !status.is_success() {
            return Err(error_for_status(status, response).await);
        }
        response
            .json()
            .await
            .map_err(|err| ApiError::Body(err.to_string()))
    }

    async fn bearer(&self) -> Result<String, ApiError> {
        self.tokens.token().await.ok_or(ApiError::Unauthenticated)
    }

    fn build_client(&self) -> Result<reqwest::Client, ApiError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }
}

fn is_unauthenticated(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

async fn error_for_status(status: StatusCode, response: reqwest::Response) -> ApiError {
    let message = server_message(response).await;
    if status == StatusCode::PAYMENT_REQUIRED {
        return ApiError::CreditsExhausted(
            message.unwrap_or_else(|| OUT_OF_CREDITS_MESSAGE.to_string()),
        );
    }
    ApiError::Status {
        status: status.as_u16(),
        message: message.unwrap_or_else(|| status.to_string()),
    }
}

/// Prefer the server's own message field; fall back to the raw body.
async fn server_message(response: reqwest::Response) -> Option<String> {
    let text = response.text().await.ok()?;
    if text.trim().is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return Some(message.to_string());
        }
    }
    Some(text)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    ApiError::Network(err.to_string())
}

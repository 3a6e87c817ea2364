use serde::Deserialize;
use thiserror::Error;

use crate::profile::ProfileUrl;

pub type JobId = String;

/// How a page gets harvested, decided from its URL alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    SingleProfile,
    SearchResults,
    CompanyPeople,
    RecruiterList,
    RecruiterProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarvestOptions {
    /// Stop once this many unique profiles were collected.
    pub target_count: Option<usize>,
    /// On recruiter list pages, keep only rows whose checkbox is checked.
    pub selected_only: bool,
    /// Tag submissions as sourced from search, and on single-profile pages
    /// take the first profile link in the document instead of the location.
    pub search_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    pub strategy: Strategy,
    pub urls: Vec<ProfileUrl>,
    pub pages_visited: usize,
    pub skipped_unselected: usize,
    /// Items that could not be resolved within their bounded wait.
    pub dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Job {
    pub id: String,
    pub job_title: String,
    pub company_name: String,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub key_traits: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Processing,
    Complete,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    pub status: CandidateStatus,
    #[serde(default)]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Terminal outcomes of a bulk submission. Authentication loss is an
/// expected state, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Unauthenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created { candidate_id: String },
    Unauthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Complete,
    TimedOut,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error("{0}")]
    CreditsExhausted(String),
    #[error("http status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("timeout")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    Body(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    HarvestFinished {
        job_id: JobId,
        result: Result<HarvestReport, crate::pager::HarvestError>,
    },
    SubmissionFinished {
        job_id: JobId,
        result: Result<SubmitOutcome, ApiError>,
    },
    CandidateCreated {
        job_id: JobId,
        result: Result<CreateOutcome, ApiError>,
    },
    PollFinished {
        job_id: JobId,
        candidate_id: String,
        result: Result<PollOutcome, ApiError>,
    },
    CandidateDeleted {
        job_id: JobId,
        candidate_id: String,
        result: Result<(), ApiError>,
    },
    JobsListed {
        result: Result<Vec<Job>, ApiError>,
    },
}

use crate::HarvestRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The watched page navigated; all per-page pipeline state is stale.
    NavigationChanged { url: String },
    /// User asked to harvest the current page into a job.
    HarvestClicked {
        job_id: crate::JobId,
        request: HarvestRequest,
    },
    /// Harvest finished with the canonical profile URLs it could collect.
    HarvestFinished {
        job_id: crate::JobId,
        urls: Vec<String>,
        dropped: usize,
    },
    /// Harvest aborted before producing any URLs.
    HarvestFailed {
        job_id: crate::JobId,
        message: String,
    },
    /// Bulk submission completed (in any of its terminal ways).
    SubmissionFinished {
        job_id: crate::JobId,
        outcome: SubmissionOutcome,
    },
    /// User asked to add a single profile URL to a job.
    AddClicked {
        job_id: crate::JobId,
        url: String,
        search_mode: bool,
    },
    /// Completion polling for a single-added candidate reached a terminal state.
    PollFinished {
        job_id: crate::JobId,
        outcome: PollOutcomeKind,
    },
    /// A session token became available again after a login.
    TokenRefreshed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted,
    Unauthenticated,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcomeKind {
    Complete,
    TimedOut,
    Cancelled,
    Failed(String),
}

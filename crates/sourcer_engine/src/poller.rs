use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::api::TalentApi;
use crate::types::{ApiError, CandidateStatus, PollOutcome};

#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Pause between consecutive status lookups.
    pub interval: Duration,
    /// Ceiling on status lookups before giving up.
    pub max_attempts: usize,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: 30,
        }
    }
}

/// Watches a freshly created candidate until the backend finishes
/// enriching it.
pub struct CompletionPoller {
    api: TalentApi,
    settings: PollSettings,
    cancel: CancellationToken,
}

impl CompletionPoller {
    pub fn new(api: TalentApi, settings: PollSettings, cancel: CancellationToken) -> Self {
        Self {
            api,
            settings,
            cancel,
        }
    }

    /// Looks the candidate up until its status turns complete, at most
    /// `max_attempts` times. A missing record counts as still processing;
    /// an API error ends the poll immediately.
    pub async fn poll_until_complete(
        &self,
        job_id: &str,
        candidate_id: &str,
    ) -> Result<PollOutcome, ApiError> {
        for attempt in 1..=self.settings.max_attempts {
            if self.cancel.is_cancelled() {
                return Ok(PollOutcome::Cancelled);
            }
            match self.api.get_candidate(job_id, candidate_id).await? {
                Some(record) if record.status == CandidateStatus::Complete => {
                    engine_info!(
                        "candidate {} complete after {} poll(s)",
                        candidate_id,
                        attempt
                    );
                    return Ok(PollOutcome::Complete);
                }
                Some(_) => {
                    engine_debug!(
                        "candidate {} still processing (attempt {})",
                        candidate_id,
                        attempt
                    );
                }
                None => {
                    engine_debug!(
                        "candidate {} not visible yet (attempt {})",
                        candidate_id,
                        attempt
                    );
                }
            }
            if attempt < self.settings.max_attempts {
                tokio::time::sleep(self.settings.interval).await;
            }
        }
        engine_warn!(
            "candidate {} did not complete within {} polls",
            candidate_id,
            self.settings.max_attempts
        );
        Ok(PollOutcome::TimedOut)
    }
}

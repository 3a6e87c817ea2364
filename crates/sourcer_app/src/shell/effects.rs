use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use sourcer_core::{Effect, Msg, PollOutcomeKind, SubmissionOutcome};
use sourcer_engine::{
    ApiError, CreateOutcome, EngineConfig, EngineEvent, EngineHandle, HarvestOptions, PollOutcome,
    ProfileUrl, SubmitOutcome,
};

pub struct EffectRunner {
    engine: EngineHandle,
    msg_tx: mpsc::Sender<Msg>,
    /// Where harvests navigate first. `None` harvests whatever page the
    /// browser session is already on.
    page_url: Option<String>,
    /// Search-sourced tagging for batches that follow a harvest.
    search_mode: bool,
}

impl EffectRunner {
    pub fn new(
        msg_tx: mpsc::Sender<Msg>,
        config: EngineConfig,
        page_url: Option<String>,
        search_mode: bool,
    ) -> Self {
        let engine = EngineHandle::new(config);
        let runner = Self {
            engine,
            msg_tx: msg_tx.clone(),
            page_url,
            search_mode,
        };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RunHarvest { job_id, request } => {
                    engine_info!(
                        "RunHarvest job_id={} target={:?} selected_only={} search_mode={}",
                        job_id,
                        request.target_count,
                        request.selected_only,
                        request.search_mode
                    );
                    let options = HarvestOptions {
                        target_count: request.target_count,
                        selected_only: request.selected_only,
                        search_mode: request.search_mode,
                    };
                    self.engine.harvest(job_id, self.page_url.clone(), options);
                }
                Effect::SubmitBatch { job_id, urls } => {
                    engine_info!("SubmitBatch job_id={} count={}", job_id, urls.len());
                    let batch: Vec<ProfileUrl> =
                        urls.iter().filter_map(|raw| ProfileUrl::parse(raw)).collect();
                    if batch.len() < urls.len() {
                        engine_warn!(
                            "SubmitBatch dropped {} urls that were not profile links",
                            urls.len() - batch.len()
                        );
                    }
                    self.engine.submit_batch(job_id, batch, self.search_mode);
                }
                Effect::AddCandidate {
                    job_id,
                    url,
                    search_mode,
                } => match ProfileUrl::parse(&url) {
                    Some(profile) => {
                        engine_info!("AddCandidate job_id={} url={}", job_id, url);
                        self.engine.add_and_poll(job_id, profile, search_mode);
                    }
                    None => {
                        engine_warn!("AddCandidate rejected url={}", url);
                        let _ = self.msg_tx.send(Msg::SubmissionFinished {
                            job_id,
                            outcome: SubmissionOutcome::Failed(
                                "not a public profile URL".to_string(),
                            ),
                        });
                    }
                },
            }
        }
    }

    /// Stops in-flight engine work; queued commands are abandoned.
    pub fn shutdown(&self) {
        self.engine.shutdown();
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if let Some(msg) = map_event(event) {
                    if msg_tx.send(msg).is_err() {
                        break;
                    }
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

/// Translates engine events into pipeline messages. Events that only matter
/// to the direct API subcommands map to `None`.
fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::HarvestFinished { job_id, result } => Some(match result {
            Ok(report) => {
                engine_info!(
                    "harvest finished: {} urls over {} pages, {} dropped",
                    report.urls.len(),
                    report.pages_visited,
                    report.dropped
                );
                Msg::HarvestFinished {
                    job_id,
                    urls: report.urls.iter().map(|url| url.canonical()).collect(),
                    dropped: report.dropped,
                }
            }
            Err(error) => {
                engine_warn!("harvest failed: {}", error);
                Msg::HarvestFailed {
                    job_id,
                    message: error.to_string(),
                }
            }
        }),
        EngineEvent::SubmissionFinished { job_id, result } => Some(Msg::SubmissionFinished {
            job_id,
            outcome: match result {
                Ok(SubmitOutcome::Accepted) => SubmissionOutcome::Accepted,
                Ok(SubmitOutcome::Unauthenticated) | Err(ApiError::Unauthenticated) => {
                    SubmissionOutcome::Unauthenticated
                }
                Err(error) => {
                    engine_warn!("submission failed: {}", error);
                    SubmissionOutcome::Failed(error.to_string())
                }
            },
        }),
        EngineEvent::CandidateCreated { job_id, result } => match result {
            Ok(CreateOutcome::Created { candidate_id }) => {
                engine_info!("candidate {} created on job {}", candidate_id, job_id);
                // The pipeline stays loading until the completion poll ends.
                None
            }
            Ok(CreateOutcome::Unauthenticated) | Err(ApiError::Unauthenticated) => {
                Some(Msg::SubmissionFinished {
                    job_id,
                    outcome: SubmissionOutcome::Unauthenticated,
                })
            }
            Err(error) => {
                engine_warn!("candidate create failed: {}", error);
                Some(Msg::SubmissionFinished {
                    job_id,
                    outcome: SubmissionOutcome::Failed(error.to_string()),
                })
            }
        },
        EngineEvent::PollFinished { job_id, result, .. } => Some(match result {
            Ok(outcome) => Msg::PollFinished {
                job_id,
                outcome: match outcome {
                    PollOutcome::Complete => PollOutcomeKind::Complete,
                    PollOutcome::TimedOut => PollOutcomeKind::TimedOut,
                    PollOutcome::Cancelled => PollOutcomeKind::Cancelled,
                },
            },
            // A token revoked mid-poll surfaces as a login prompt, not a failure.
            Err(ApiError::Unauthenticated) => Msg::SubmissionFinished {
                job_id,
                outcome: SubmissionOutcome::Unauthenticated,
            },
            Err(error) => {
                engine_warn!("completion poll failed: {}", error);
                Msg::PollFinished {
                    job_id,
                    outcome: PollOutcomeKind::Failed(error.to_string()),
                }
            }
        }),
        EngineEvent::CandidateDeleted { .. } | EngineEvent::JobsListed { .. } => None,
    }
}

use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use tokio_util::sync::CancellationToken;

use crate::api::{ApiSettings, TalentApi, TokenProvider};
use crate::pager::{HarvestError, HarvestSettings, Harvester};
use crate::poller::{CompletionPoller, PollSettings};
use crate::profile::ProfileUrl;
use crate::types::{CreateOutcome, EngineEvent, HarvestOptions, HarvestReport, JobId};
use crate::webdriver::{WebDriverPage, WebDriverSettings};

pub struct EngineConfig {
    pub api: ApiSettings,
    pub harvest: HarvestSettings,
    pub poll: PollSettings,
    /// Browser attachment. `None` disables harvesting; API commands
    /// still work.
    pub webdriver: Option<WebDriverSettings>,
    pub tokens: Arc<dyn TokenProvider>,
}

enum EngineCommand {
    Harvest {
        job_id: JobId,
        page_url: Option<String>,
        options: HarvestOptions,
    },
    SubmitBatch {
        job_id: JobId,
        urls: Vec<ProfileUrl>,
        search_mode: bool,
    },
    AddAndPoll {
        job_id: JobId,
        url: ProfileUrl,
        search_mode: bool,
    },
    DeleteCandidate {
        job_id: JobId,
        candidate_id: String,
    },
    ListJobs,
    Shutdown,
}

/// Front door of the engine thread. Commands go in without blocking;
/// results come back as events through `try_recv`.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();
        let api = TalentApi::new(config.api.clone(), config.tokens.clone());
        let config = Arc::new(config);

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                if matches!(command, EngineCommand::Shutdown) {
                    worker_cancel.cancel();
                    break;
                }
                let api = api.clone();
                let config = config.clone();
                let event_tx = event_tx.clone();
                let cancel = worker_cancel.clone();
                runtime.spawn(async move {
                    handle_command(&config, api, command, event_tx, cancel).await;
                });
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
            cancel,
        }
    }

    pub fn harvest(&self, job_id: JobId, page_url: Option<String>, options: HarvestOptions) {
        let _ = self.cmd_tx.send(EngineCommand::Harvest {
            job_id,
            page_url,
            options,
        });
    }

    pub fn submit_batch(&self, job_id: JobId, urls: Vec<ProfileUrl>, search_mode: bool) {
        let _ = self.cmd_tx.send(EngineCommand::SubmitBatch {
            job_id,
            urls,
            search_mode,
        });
    }

    /// Creates one candidate and keeps polling it to completion. Emits
    /// `CandidateCreated` first, then `PollFinished` once the watch ends.
    pub fn add_and_poll(&self, job_id: JobId, url: ProfileUrl, search_mode: bool) {
        let _ = self.cmd_tx.send(EngineCommand::AddAndPoll {
            job_id,
            url,
            search_mode,
        });
    }

    pub fn delete_candidate(&self, job_id: JobId, candidate_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::DeleteCandidate {
            job_id,
            candidate_id: candidate_id.into(),
        });
    }

    pub fn list_jobs(&self) {
        let _ = self.cmd_tx.send(EngineCommand::ListJobs);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    /// Cancels in-flight work and stops the engine thread.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }
}

async fn handle_command(
    config: &EngineConfig,
    api: TalentApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) {
    match command {
        EngineCommand::Harvest {
            job_id,
            page_url,
            options,
        } => {
            let result = run_harvest(config, page_url, &options, cancel).await;
            let _ = event_tx.send(EngineEvent::HarvestFinished { job_id, result });
        }
        EngineCommand::SubmitBatch {
            job_id,
            urls,
            search_mode,
        } => {
            let result = api.submit_candidates_bulk(&job_id, &urls, search_mode).await;
            let _ = event_tx.send(EngineEvent::SubmissionFinished { job_id, result });
        }
        EngineCommand::AddAndPoll {
            job_id,
            url,
            search_mode,
        } => {
            let result = api.create_candidate(&job_id, &url, search_mode).await;
            let created = match &result {
                Ok(CreateOutcome::Created { candidate_id }) => Some(candidate_id.clone()),
                _ => None,
            };
            let _ = event_tx.send(EngineEvent::CandidateCreated {
                job_id: job_id.clone(),
                result,
            });
            if let Some(candidate_id) = created {
                let poller = CompletionPoller::new(api, config.poll.clone(), cancel);
                let result = poller.poll_until_complete(&job_id, &candidate_id).await;
                let _ = event_tx.send(EngineEvent::PollFinished {
                    job_id,
                    candidate_id,
                    result,
                });
            }
        }
        EngineCommand::DeleteCandidate {
            job_id,
            candidate_id,
        } => {
            let result = api.delete_candidate(&job_id, &candidate_id).await;
            let _ = event_tx.send(EngineEvent::CandidateDeleted {
                job_id,
                candidate_id,
                result,
            });
        }
        EngineCommand::ListJobs => {
            let result = api.list_jobs().await;
            let _ = event_tx.send(EngineEvent::JobsListed { result });
        }
        EngineCommand::Shutdown => {}
    }
}

async fn run_harvest(
    config: &EngineConfig,
    page_url: Option<String>,
    options: &HarvestOptions,
    cancel: CancellationToken,
) -> Result<HarvestReport, HarvestError> {
    let Some(settings) = config.webdriver.clone() else {
        return Err(HarvestError::NoBrowser);
    };
    let driver = Arc::new(WebDriverPage::connect(settings).await?);
    let result = harvest_with_driver(&driver, config, page_url, options, cancel).await;
    driver.close().await;
    result
}

async fn harvest_with_driver(
    driver: &Arc<WebDriverPage>,
    config: &EngineConfig,
    page_url: Option<String>,
    options: &HarvestOptions,
    cancel: CancellationToken,
) -> Result<HarvestReport, HarvestError> {
    if let Some(url) = page_url {
        driver.navigate(&url).await?;
    }
    let harvester = Harvester::new(driver.clone(), config.harvest.clone(), cancel);
    harvester.harvest(options).await
}

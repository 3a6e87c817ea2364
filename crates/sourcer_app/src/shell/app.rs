use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use sourcer_core::{update, HarvestRequest, Msg, Notice, PanelViewModel, PipelineState};
use sourcer_engine::{
    ApiError, ApiSettings, EngineConfig, EngineEvent, EngineHandle, HarvestSettings, PollSettings,
    StaticTokenProvider, WebDriverSettings,
};

use super::effects::EffectRunner;
use super::logging::{self, LogDestination};

/// Environment variable holding the talent API session token.
const TOKEN_ENV: &str = "SOURCER_TOKEN";

#[derive(Parser)]
#[command(name = "sourcer")]
#[command(about = "Harvest profile URLs from LinkedIn pages into talent pipeline jobs")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Talent API base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// WebDriver endpoint of the browser to drive.
    #[arg(long, global = true)]
    webdriver_url: Option<String>,

    /// Browser profile directory carrying the signed-in session.
    #[arg(long, global = true)]
    user_data_dir: Option<String>,

    /// Where log lines go.
    #[arg(long, global = true, value_enum, default_value_t = LogDestination::File)]
    log: LogDestination,
}

#[derive(Subcommand)]
enum Command {
    /// Harvest profile URLs from a page and submit them to a job
    Harvest {
        job_id: String,
        page_url: String,
        /// Stop after collecting this many unique profiles
        #[arg(long)]
        count: Option<usize>,
        /// Keep only rows whose checkbox is selected (recruiter lists)
        #[arg(long)]
        selected_only: bool,
        /// Tag the submission as sourced from a search
        #[arg(long)]
        search_mode: bool,
    },
    /// Add one public profile URL to a job and wait for processing
    Add {
        job_id: String,
        url: String,
        /// Tag the submission as sourced from a search
        #[arg(long)]
        search_mode: bool,
    },
    /// List jobs visible to the current token
    Jobs,
    /// Remove a candidate from a job
    Delete {
        job_id: String,
        candidate_id: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log);
    let config = engine_config(&cli);

    match cli.command {
        Command::Harvest {
            job_id,
            page_url,
            count,
            selected_only,
            search_mode,
        } => harvest_command(config, job_id, page_url, count, selected_only, search_mode),
        Command::Add {
            job_id,
            url,
            search_mode,
        } => add_command(config, job_id, url, search_mode),
        Command::Jobs => jobs_command(config),
        Command::Delete {
            job_id,
            candidate_id,
        } => delete_command(config, job_id, candidate_id),
    }
}

fn engine_config(cli: &Cli) -> EngineConfig {
    let mut api = ApiSettings::default();
    if let Some(base_url) = &cli.api_url {
        api.base_url = base_url.clone();
    }
    let mut webdriver = WebDriverSettings::default();
    if let Some(endpoint) = &cli.webdriver_url {
        webdriver.endpoint = endpoint.clone();
    }
    webdriver.user_data_dir = cli.user_data_dir.clone();

    EngineConfig {
        api,
        harvest: HarvestSettings::default(),
        poll: PollSettings::default(),
        webdriver: Some(webdriver),
        tokens: Arc::new(StaticTokenProvider::new(session_token())),
    }
}

fn session_token() -> Option<String> {
    std::env::var(TOKEN_ENV)
        .ok()
        .filter(|token| !token.trim().is_empty())
}

fn harvest_command(
    config: EngineConfig,
    job_id: String,
    page_url: String,
    count: Option<usize>,
    selected_only: bool,
    search_mode: bool,
) -> Result<()> {
    // Collecting for minutes only to be turned away at submission is the
    // worst order to find out in, so check the token first.
    if session_token().is_none() {
        bail!("no session token; set {TOKEN_ENV} and retry");
    }

    let (msg_tx, msg_rx) = mpsc::channel();
    let runner = EffectRunner::new(msg_tx, config, Some(page_url.clone()), search_mode);

    let request = HarvestRequest {
        target_count: count,
        selected_only,
        search_mode,
    };
    let seed = vec![
        Msg::NavigationChanged { url: page_url },
        Msg::HarvestClicked {
            job_id: job_id.clone(),
            request,
        },
    ];

    let view = run_pipeline(&runner, &msg_rx, seed, &job_id);
    runner.shutdown();
    conclude(&view?, &job_id)
}

fn add_command(config: EngineConfig, job_id: String, url: String, search_mode: bool) -> Result<()> {
    if session_token().is_none() {
        bail!("no session token; set {TOKEN_ENV} and retry");
    }

    let (msg_tx, msg_rx) = mpsc::channel();
    let runner = EffectRunner::new(msg_tx, config, None, search_mode);

    let seed = vec![Msg::AddClicked {
        job_id: job_id.clone(),
        url,
        search_mode,
    }];

    let view = run_pipeline(&runner, &msg_rx, seed, &job_id);
    runner.shutdown();
    conclude(&view?, &job_id)
}

fn jobs_command(config: EngineConfig) -> Result<()> {
    let engine = EngineHandle::new(config);
    engine.list_jobs();
    let result = wait_for(&engine, |event| match event {
        EngineEvent::JobsListed { result } => Some(result),
        _ => None,
    });
    engine.shutdown();

    let jobs = result?.map_err(api_failure)?;
    if jobs.is_empty() {
        println!("no jobs visible to this token");
        return Ok(());
    }
    for job in jobs {
        println!("{}  {} ({})", job.id, job.job_title, job.company_name);
    }
    Ok(())
}

fn delete_command(config: EngineConfig, job_id: String, candidate_id: String) -> Result<()> {
    let engine = EngineHandle::new(config);
    engine.delete_candidate(job_id.clone(), candidate_id.clone());
    let result = wait_for(&engine, |event| match event {
        EngineEvent::CandidateDeleted { result, .. } => Some(result),
        _ => None,
    });
    engine.shutdown();

    result?.map_err(api_failure)?;
    println!("candidate {candidate_id} removed from job {job_id}");
    Ok(())
}

/// Feeds the seed messages through the pure update loop, then keeps applying
/// engine-driven messages until the job leaves the loading set.
fn run_pipeline(
    runner: &EffectRunner,
    msg_rx: &mpsc::Receiver<Msg>,
    seed: Vec<Msg>,
    job_id: &str,
) -> Result<PanelViewModel> {
    let mut state = PipelineState::new();
    let mut stats_reported = false;
    for msg in seed {
        state = apply(state, msg, runner, &mut stats_reported);
    }
    while is_loading(&state, job_id) {
        match msg_rx.recv_timeout(Duration::from_millis(200)) {
            Ok(msg) => state = apply(state, msg, runner, &mut stats_reported),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                bail!("engine stopped before the job finished")
            }
        }
    }
    Ok(state.view())
}

fn apply(
    state: PipelineState,
    msg: Msg,
    runner: &EffectRunner,
    stats_reported: &mut bool,
) -> PipelineState {
    let (mut state, effects) = update(state, msg);
    runner.enqueue(effects);
    let view = state.view();
    if state.consume_dirty() {
        report_progress(&view, stats_reported);
    }
    state
}

fn is_loading(state: &PipelineState, job_id: &str) -> bool {
    state.view().loading_jobs.iter().any(|job| job == job_id)
}

fn report_progress(view: &PanelViewModel, stats_reported: &mut bool) {
    if *stats_reported {
        return;
    }
    if let Some(stats) = &view.last_harvest {
        println!(
            "collected {} profiles ({} dropped), submitting",
            stats.collected, stats.dropped
        );
        *stats_reported = true;
    }
}

/// Maps the final view of the pipeline onto the process exit.
fn conclude(view: &PanelViewModel, job_id: &str) -> Result<()> {
    if view.needs_login {
        bail!("the talent API rejected the session token; set {TOKEN_ENV} and retry");
    }
    match &view.notice {
        Some(Notice::NoProfilesFound) => bail!("no profiles found on this page"),
        Some(Notice::InvalidProfileUrl) => bail!("not a public profile URL"),
        Some(Notice::HarvestFailed(message)) => bail!("harvest failed: {message}"),
        Some(Notice::SubmissionFailed(message)) => bail!("submission failed: {message}"),
        Some(Notice::PollTimedOut) => {
            println!("timed out waiting for candidate to be processed");
            Ok(())
        }
        Some(Notice::CandidateReady) => {
            println!("candidate ready on job {job_id}");
            Ok(())
        }
        None if view.added_jobs.iter().any(|job| job == job_id) => {
            match &view.last_harvest {
                Some(stats) => println!("job {job_id}: {} profiles submitted", stats.collected),
                None => println!("job {job_id}: accepted"),
            }
            Ok(())
        }
        None => Ok(()),
    }
}

fn wait_for<T>(
    engine: &EngineHandle,
    mut pick: impl FnMut(EngineEvent) -> Option<T>,
) -> Result<T> {
    let deadline = Instant::now() + Duration::from_secs(60);
    while Instant::now() < deadline {
        match engine.try_recv() {
            Some(event) => {
                if let Some(found) = pick(event) {
                    return Ok(found);
                }
            }
            None => thread::sleep(Duration::from_millis(20)),
        }
    }
    bail!("timed out waiting for the engine")
}

fn api_failure(error: ApiError) -> anyhow::Error {
    match error {
        ApiError::Unauthenticated => {
            anyhow!("the talent API rejected the session token; set {TOKEN_ENV} and retry")
        }
        other => anyhow::Error::new(other),
    }
}

use crate::{Effect, Msg, Notice, PipelineState, PollOutcomeKind, SubmissionOutcome};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PipelineState, msg: Msg) -> (PipelineState, Vec<Effect>) {
    let effects = match msg {
        Msg::NavigationChanged { url } => {
            state.reset_for_navigation(url);
            Vec::new()
        }
        Msg::HarvestClicked { job_id, request } => {
            // A job already in flight must not be submitted twice; this set is
            // the only guard, the backend has no idempotency key.
            if state.is_loading(&job_id) {
                return (state, Vec::new());
            }
            state.begin_loading(job_id.clone());
            vec![Effect::RunHarvest { job_id, request }]
        }
        Msg::HarvestFinished {
            job_id,
            urls,
            dropped,
        } => {
            // Late completions for jobs cleared by a navigation are ignored.
            if !state.is_loading(&job_id) {
                return (state, Vec::new());
            }
            state.set_last_harvest(urls.len(), dropped);
            if urls.is_empty() {
                state.finish_loading(&job_id);
                state.set_notice(Notice::NoProfilesFound);
                Vec::new()
            } else {
                vec![Effect::SubmitBatch { job_id, urls }]
            }
        }
        Msg::HarvestFailed { job_id, message } => {
            if !state.is_loading(&job_id) {
                return (state, Vec::new());
            }
            state.finish_loading(&job_id);
            state.set_notice(Notice::HarvestFailed(message));
            Vec::new()
        }
        Msg::SubmissionFinished { job_id, outcome } => {
            if !state.is_loading(&job_id) {
                return (state, Vec::new());
            }
            state.finish_loading(&job_id);
            match outcome {
                SubmissionOutcome::Accepted => state.mark_added(job_id),
                SubmissionOutcome::Unauthenticated => state.set_needs_login(true),
                SubmissionOutcome::Failed(message) => {
                    state.set_notice(Notice::SubmissionFailed(message));
                }
            }
            Vec::new()
        }
        Msg::AddClicked {
            job_id,
            url,
            search_mode,
        } => {
            if state.is_loading(&job_id) {
                return (state, Vec::new());
            }
            if !is_public_profile_url(&url) {
                state.set_notice(Notice::InvalidProfileUrl);
                return (state, Vec::new());
            }
            state.begin_loading(job_id.clone());
            vec![Effect::AddCandidate {
                job_id,
                url,
                search_mode,
            }]
        }
        Msg::PollFinished { job_id, outcome } => {
            if !state.is_loading(&job_id) {
                return (state, Vec::new());
            }
            state.finish_loading(&job_id);
            match outcome {
                PollOutcomeKind::Complete => {
                    state.mark_added(job_id);
                    state.set_notice(Notice::CandidateReady);
                }
                PollOutcomeKind::TimedOut => state.set_notice(Notice::PollTimedOut),
                PollOutcomeKind::Cancelled => {}
                PollOutcomeKind::Failed(message) => {
                    state.set_notice(Notice::SubmissionFailed(message));
                }
            }
            Vec::new()
        }
        Msg::TokenRefreshed => {
            state.set_needs_login(false);
            Vec::new()
        }
    };

    (state, effects)
}

fn is_public_profile_url(raw: &str) -> bool {
    let Ok(parsed) = url::Url::parse(raw.trim()) else {
        return false;
    };
    let host_ok = parsed
        .host_str()
        .is_some_and(|host| host == "linkedin.com" || host.ends_with(".linkedin.com"));
    host_ok && parsed.path().starts_with("/in/") && parsed.path().len() > "/in/".len()
}

use std::collections::BTreeSet;

use crate::view_model::{HarvestStats, PanelViewModel};

pub type JobId = String;

/// User-visible outcome of the most recent pipeline operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NoProfilesFound,
    InvalidProfileUrl,
    HarvestFailed(String),
    SubmissionFailed(String),
    PollTimedOut,
    CandidateReady,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineState {
    page_url: String,
    added: BTreeSet<JobId>,
    loading: BTreeSet<JobId>,
    needs_login: bool,
    notice: Option<Notice>,
    last_harvest: Option<HarvestStats>,
    dirty: bool,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> PanelViewModel {
        PanelViewModel {
            page_url: self.page_url.clone(),
            added_jobs: self.added.iter().cloned().collect(),
            loading_jobs: self.loading.iter().cloned().collect(),
            needs_login: self.needs_login,
            notice: self.notice.clone(),
            last_harvest: self.last_harvest.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns the dirty flag and clears it, so callers re-render at most once
    /// per batch of applied messages.
    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }

    pub(crate) fn is_loading(&self, job_id: &str) -> bool {
        self.loading.contains(job_id)
    }

    pub(crate) fn begin_loading(&mut self, job_id: JobId) {
        self.loading.insert(job_id);
        self.mark_dirty();
    }

    pub(crate) fn finish_loading(&mut self, job_id: &str) {
        self.loading.remove(job_id);
        self.mark_dirty();
    }

    pub(crate) fn mark_added(&mut self, job_id: JobId) {
        self.added.insert(job_id);
        self.mark_dirty();
    }

    pub(crate) fn set_needs_login(&mut self, needs_login: bool) {
        self.needs_login = needs_login;
        self.mark_dirty();
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.mark_dirty();
    }

    pub(crate) fn set_last_harvest(&mut self, collected: usize, dropped: usize) {
        self.last_harvest = Some(HarvestStats { collected, dropped });
        self.mark_dirty();
    }

    /// The added/loading sets describe the page the panel was opened on; any
    /// navigation invalidates them wholesale.
    pub(crate) fn reset_for_navigation(&mut self, url: String) {
        self.page_url = url;
        self.added.clear();
        self.loading.clear();
        self.notice = None;
        self.last_harvest = None;
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

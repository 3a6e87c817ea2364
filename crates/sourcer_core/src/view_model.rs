use crate::{JobId, Notice};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarvestStats {
    pub collected: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelViewModel {
    pub page_url: String,
    pub added_jobs: Vec<JobId>,
    pub loading_jobs: Vec<JobId>,
    pub needs_login: bool,
    pub notice: Option<Notice>,
    pub last_harvest: Option<HarvestStats>,
    pub dirty: bool,
}

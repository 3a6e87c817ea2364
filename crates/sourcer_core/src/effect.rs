#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RunHarvest {
        job_id: crate::JobId,
        request: HarvestRequest,
    },
    SubmitBatch {
        job_id: crate::JobId,
        urls: Vec<String>,
    },
    AddCandidate {
        job_id: crate::JobId,
        url: String,
        search_mode: bool,
    },
}

/// What the user asked a harvest run to do.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarvestRequest {
    pub target_count: Option<usize>,
    pub selected_only: bool,
    pub search_mode: bool,
}

//! Sourcer core: pure pipeline state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, HarvestRequest};
pub use msg::{Msg, PollOutcomeKind, SubmissionOutcome};
pub use state::{JobId, Notice, PipelineState};
pub use update::update;
pub use view_model::{HarvestStats, PanelViewModel};

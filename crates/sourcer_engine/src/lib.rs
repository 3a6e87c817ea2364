//! Sourcer engine: page harvesting, talent API client, and effect execution.
mod api;
mod classify;
mod driver;
mod engine;
mod extract;
mod pager;
mod poller;
mod profile;
mod types;
mod webdriver;

pub use api::{ApiSettings, StaticTokenProvider, TalentApi, TokenProvider};
pub use classify::classify;
pub use driver::{DriverError, PageDriver};
pub use engine::{EngineConfig, EngineHandle};
pub use extract::{
    company_people_profiles, first_profile_anchor, internal_handle_from_href,
    recruiter_profile_handle, recruiter_rows, search_result_profiles, RecruiterRow,
};
pub use pager::{HarvestError, HarvestSettings, Harvester};
pub use poller::{CompletionPoller, PollSettings};
pub use profile::{dedupe, ProfileUrl, INTERNAL_HANDLE_PREFIX, PUBLIC_PROFILE_BASE};
pub use types::{
    ApiError, CandidateRecord, CandidateStatus, CreateOutcome, EngineEvent, HarvestOptions,
    HarvestReport, Job, JobId, PollOutcome, Strategy, SubmitOutcome,
};
pub use webdriver::{WebDriverPage, WebDriverSettings};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::classify::classify;
use crate::driver::{DriverError, PageDriver};
use crate::extract::{self, RecruiterRow};
use crate::profile::ProfileUrl;
use crate::types::{HarvestOptions, HarvestReport, Strategy};

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    /// Wait after each scroll before re-reading the page.
    pub scroll_settle: Duration,
    /// Wait after clicking a next-page control.
    pub page_settle: Duration,
    /// Recruiter rows resolve their public URLs in windows of this size;
    /// windows run one after another.
    pub resolve_batch_size: usize,
    /// Pause between consecutive resolution windows on the same page.
    pub resolve_settle: Duration,
    /// Hard cap on scroll rounds / pages per harvest run.
    pub max_rounds: usize,
    /// Consecutive no-growth rounds at the bottom before a scroll loop stops.
    pub stable_rounds: usize,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            scroll_settle: Duration::from_millis(700),
            page_settle: Duration::from_millis(2000),
            resolve_batch_size: 5,
            resolve_settle: Duration::from_millis(700),
            max_rounds: 60,
            stable_rounds: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarvestError {
    #[error("page is not harvestable: {url}")]
    UnsupportedPage { url: String },
    #[error("no browser session configured")]
    NoBrowser,
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error("cancelled")]
    Cancelled,
}

/// Drives one harvest run against a live page: classify the location, then
/// scroll or page until the target count is reached or the page is exhausted.
pub struct Harvester {
    driver: Arc<dyn PageDriver>,
    settings: HarvestSettings,
    cancel: CancellationToken,
}

impl Harvester {
    pub fn new(
        driver: Arc<dyn PageDriver>,
        settings: HarvestSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            driver,
            settings,
            cancel,
        }
    }

    pub async fn harvest(&self, options: &HarvestOptions) -> Result<HarvestReport, HarvestError> {
        let url = self.driver.location().await?;
        let Some(strategy) = classify(&url) else {
            return Err(HarvestError::UnsupportedPage { url });
        };
        engine_info!("harvest start strategy={:?} url={}", strategy, url);

        let report = match strategy {
            Strategy::SingleProfile => self.harvest_single(&url, options).await?,
            Strategy::RecruiterProfile => self.harvest_recruiter_profile(&url).await?,
            Strategy::SearchResults => {
                self.scroll_collect(strategy, options, extract::search_result_profiles)
                    .await?
            }
            Strategy::CompanyPeople => {
                self.scroll_collect(strategy, options, extract::company_people_profiles)
                    .await?
            }
            Strategy::RecruiterList => self.harvest_recruiter_list(options).await?,
        };
        engine_info!(
            "harvest done strategy={:?} collected={} dropped={} pages={}",
            report.strategy,
            report.urls.len(),
            report.dropped,
            report.pages_visited
        );
        Ok(report)
    }

    async fn harvest_single(
        &self,
        url: &str,
        options: &HarvestOptions,
    ) -> Result<HarvestReport, HarvestError> {
        let profile = if options.search_mode {
            let html = self.driver.document().await?;
            extract::first_profile_anchor(&html)
        } else {
            ProfileUrl::parse(url)
        };
        Ok(HarvestReport {
            strategy: Strategy::SingleProfile,
            urls: profile.into_iter().collect(),
            pages_visited: 1,
            skipped_unselected: 0,
            dropped: 0,
        })
    }

    async fn harvest_recruiter_profile(&self, url: &str) -> Result<HarvestReport, HarvestError> {
        let internal_handle = match extract::internal_handle_from_href(url) {
            Some(handle) => Some(handle),
            None => {
                let html = self.driver.document().await?;
                extract::recruiter_profile_handle(&html)
            }
        };

        let mut dropped = 0;
        let urls = match internal_handle {
            Some(handle) => match self.resolve_one(&handle).await {
                Some(profile) => vec![profile],
                None => {
                    dropped = 1;
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Ok(HarvestReport {
            strategy: Strategy::RecruiterProfile,
            urls,
            pages_visited: 1,
            skipped_unselected: 0,
            dropped,
        })
    }

    /// Infinite-scroll surfaces. Stops on target count, on `stable_rounds`
    /// consecutive rounds with no new profiles while bottomed out at an
    /// unchanged content height, or on the overall round cap.
    async fn scroll_collect(
        &self,
        strategy: Strategy,
        options: &HarvestOptions,
        extract_page: fn(&str) -> Vec<ProfileUrl>,
    ) -> Result<HarvestReport, HarvestError> {
        let mut seen = HashSet::new();
        let mut collected: Vec<ProfileUrl> = Vec::new();
        let mut stable_count = 0usize;
        let mut rounds = 0usize;
        let mut last_height = self.driver.content_height().await?;

        loop {
            self.check_cancelled()?;
            rounds += 1;

            let html = self.driver.document().await?;
            let new_count = merge_unique(&mut seen, &mut collected, extract_page(&html));
            engine_debug!(
                "scroll round {}: {} new, {} collected",
                rounds,
                new_count,
                collected.len()
            );

            if target_reached(options.target_count, collected.len()) {
                break;
            }
            if rounds >= self.settings.max_rounds {
                engine_warn!(
                    "scroll cap of {} rounds hit with {} collected",
                    rounds,
                    collected.len()
                );
                break;
            }

            let height = self.driver.content_height().await?;
            if new_count == 0 && height == last_height && self.driver.at_bottom().await? {
                stable_count += 1;
                if stable_count >= self.settings.stable_rounds {
                    break;
                }
            } else {
                stable_count = 0;
            }
            last_height = height;

            self.driver.scroll_forward().await?;
            self.settle(self.settings.scroll_settle).await?;
        }

        if let Some(target) = options.target_count {
            collected.truncate(target);
        }
        Ok(HarvestReport {
            strategy,
            urls: collected,
            pages_visited: rounds,
            skipped_unselected: 0,
            dropped: 0,
        })
    }

    /// Recruiter list pages paginate with an explicit control and expose only
    /// internal ids; each kept row goes through the public URL lookup.
    async fn harvest_recruiter_list(
        &self,
        options: &HarvestOptions,
    ) -> Result<HarvestReport, HarvestError> {
        let mut seen = HashSet::new();
        let mut collected: Vec<ProfileUrl> = Vec::new();
        let mut pages_visited = 0usize;
        let mut skipped_unselected = 0usize;
        let mut dropped = 0usize;

        loop {
            self.check_cancelled()?;
            pages_visited += 1;

            let html = self.driver.document().await?;
            let rows = extract::recruiter_rows(&html);
            let row_count = rows.len();
            let wanted: Vec<RecruiterRow> = rows
                .into_iter()
                .filter(|row| !options.selected_only || row.selected)
                .collect();
            skipped_unselected += row_count - wanted.len();
            engine_debug!(
                "recruiter page {}: {} rows, {} kept",
                pages_visited,
                row_count,
                wanted.len()
            );

            let windows = wanted.chunks(self.settings.resolve_batch_size);
            let window_count = windows.len();
            for (index, window) in windows.enumerate() {
                self.check_cancelled()?;
                let (resolved, window_dropped) = self.resolve_window(window).await;
                dropped += window_dropped;
                merge_unique(&mut seen, &mut collected, resolved);
                if target_reached(options.target_count, collected.len()) {
                    break;
                }
                if index + 1 < window_count {
                    self.settle(self.settings.resolve_settle).await?;
                }
            }

            if target_reached(options.target_count, collected.len()) {
                break;
            }
            if pages_visited >= self.settings.max_rounds {
                engine_warn!(
                    "page cap of {} hit with {} collected",
                    pages_visited,
                    collected.len()
                );
                break;
            }
            if !self.driver.click_next_page().await? {
                break;
            }
            self.settle(self.settings.page_settle).await?;
        }

        if let Some(target) = options.target_count {
            collected.truncate(target);
        }
        Ok(HarvestReport {
            strategy: Strategy::RecruiterList,
            urls: collected,
            pages_visited,
            skipped_unselected,
            dropped,
        })
    }

    async fn resolve_window(&self, rows: &[RecruiterRow]) -> (Vec<ProfileUrl>, usize) {
        let lookups = rows.iter().map(|row| self.resolve_one(&row.internal_handle));
        let mut urls = Vec::new();
        let mut dropped = 0usize;
        for resolved in futures_util::future::join_all(lookups).await {
            match resolved {
                Some(url) => urls.push(url),
                None => dropped += 1,
            }
        }
        (urls, dropped)
    }

    /// Failed or timed-out lookups drop the item; they never abort the run.
    async fn resolve_one(&self, internal_handle: &str) -> Option<ProfileUrl> {
        match self.driver.resolve_public_url(internal_handle).await {
            Ok(Some(href)) => {
                let parsed = ProfileUrl::parse(&href);
                if parsed.is_none() {
                    engine_warn!("resolved href is not a public profile: {}", href);
                }
                parsed
            }
            Ok(None) => {
                engine_warn!("public url lookup timed out for {}", internal_handle);
                None
            }
            Err(err) => {
                engine_warn!("public url lookup failed for {}: {}", internal_handle, err);
                None
            }
        }
    }

    async fn settle(&self, wait: Duration) -> Result<(), HarvestError> {
        tokio::time::sleep(wait).await;
        self.check_cancelled()
    }

    fn check_cancelled(&self) -> Result<(), HarvestError> {
        if self.cancel.is_cancelled() {
            return Err(HarvestError::Cancelled);
        }
        Ok(())
    }
}

fn merge_unique(
    seen: &mut HashSet<String>,
    collected: &mut Vec<ProfileUrl>,
    found: Vec<ProfileUrl>,
) -> usize {
    let before = collected.len();
    for url in found {
        if seen.insert(url.handle().to_string()) {
            collected.push(url);
        }
    }
    collected.len() - before
}

fn target_reached(target: Option<usize>, collected: usize) -> bool {
    target.is_some_and(|count| collected >= count)
}

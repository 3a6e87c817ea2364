use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("webdriver status {status}: {message}")]
    Protocol { status: u16, message: String },
    #[error("timeout")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    Body(String),
}

/// Capability view of the live page the harvest runs against.
///
/// `resolve_public_url` is the recruiter-list lookup: implementations render
/// the internal profile out of band, wait (bounded by their own configured
/// deadline) for the public profile link to appear, and return it. `Ok(None)`
/// means the link did not appear in time; callers drop the item and move on.
#[async_trait::async_trait]
pub trait PageDriver: Send + Sync {
    async fn location(&self) -> Result<String, DriverError>;

    /// Snapshot of the current DOM as HTML.
    async fn document(&self) -> Result<String, DriverError>;

    async fn content_height(&self) -> Result<u64, DriverError>;

    async fn at_bottom(&self) -> Result<bool, DriverError>;

    /// Scrolls forward by one viewport.
    async fn scroll_forward(&self) -> Result<(), DriverError>;

    /// Clicks the next-page control if one is present and enabled.
    /// Returns false when there is nothing left to click.
    async fn click_next_page(&self) -> Result<bool, DriverError>;

    async fn resolve_public_url(
        &self,
        internal_handle: &str,
    ) -> Result<Option<String>, DriverError>;
}

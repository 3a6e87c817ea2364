use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use reqwest::Method;
use serde_json::{json, Value};
use tokio::time::sleep;

use crate::driver::{DriverError, PageDriver};

#[derive(Debug, Clone)]
pub struct WebDriverSettings {
    /// Remote end of the WebDriver protocol, e.g. a local chromedriver.
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Ceiling on the wait for a public profile link to render during a
    /// recruiter-list lookup.
    pub resolve_timeout: Duration,
    pub resolve_poll_interval: Duration,
    /// Chrome profile directory carrying the operator's signed-in session.
    pub user_data_dir: Option<String>,
}

impl Default for WebDriverSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:4444".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            resolve_timeout: Duration::from_millis(5000),
            resolve_poll_interval: Duration::from_millis(250),
            user_data_dir: None,
        }
    }
}

const DOCUMENT_SCRIPT: &str =
    "return document.documentElement ? document.documentElement.outerHTML : '';";

const CONTENT_HEIGHT_SCRIPT: &str = "return document.body ? document.body.scrollHeight : 0;";

const AT_BOTTOM_SCRIPT: &str = "return (window.innerHeight + window.scrollY) >= \
     (document.body ? document.body.scrollHeight : 0) - 2;";

const SCROLL_FORWARD_SCRIPT: &str = "window.scrollBy(0, window.innerHeight);";

const CLICK_NEXT_PAGE_SCRIPT: &str = r#"
    var selectors = [
        'a[data-test-pagination-next]',
        'button[data-test-pagination-next]',
        'button[aria-label="Next"]',
        'li.pagination__quick-link--next a'
    ];
    for (var i = 0; i < selectors.length; i++) {
        var el = document.querySelector(selectors[i]);
        if (el && !el.disabled && el.getAttribute('aria-disabled') !== 'true') {
            el.click();
            return true;
        }
    }
    return false;
"#;

const PUBLIC_LINK_SCRIPT: &str = r#"
    var selectors = [
        'a[data-test-public-profile-link]',
        'a[href*="linkedin.com/in/"]'
    ];
    for (var i = 0; i < selectors.length; i++) {
        var el = document.querySelector(selectors[i]);
        if (el && el.href) { return el.href; }
    }
    return null;
"#;

/// W3C WebDriver session over plain HTTP, pointed at an already running
/// chromedriver with the operator's LinkedIn session loaded.
pub struct WebDriverPage {
    endpoint: String,
    session_id: String,
    client: reqwest::Client,
    settings: WebDriverSettings,
}

impl WebDriverPage {
    /// Attaches to the remote end and opens a fresh session.
    pub async fn connect(settings: WebDriverSettings) -> Result<Self, DriverError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| DriverError::Network(err.to_string()))?;
        let endpoint = settings.endpoint.trim_end_matches('/').to_string();
        let value = send_command(
            &client,
            Method::POST,
            &format!("{endpoint}/session"),
            Some(capabilities(&settings)),
        )
        .await?;
        let session_id = value
            .pointer("/sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| DriverError::Body("session id missing".to_string()))?
            .to_string();
        engine_info!("webdriver session {} opened at {}", session_id, endpoint);
        Ok(Self {
            endpoint,
            session_id,
            client,
            settings,
        })
    }

    pub async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    /// Ends the session. Failures are logged, not propagated; the remote
    /// end reaps orphaned sessions on its own timeout.
    pub async fn close(&self) {
        let url = format!("{}/session/{}", self.endpoint, self.session_id);
        if let Err(err) = send_command(&self.client, Method::DELETE, &url, None).await {
            engine_warn!("webdriver session close failed: {err}");
        }
    }

    async fn command(
        &self,
        method: Method,
        suffix: &str,
        body: Option<Value>,
    ) -> Result<Value, DriverError> {
        let url = format!("{}/session/{}{}", self.endpoint, self.session_id, suffix);
        send_command(&self.client, method, &url, body).await
    }

    async fn execute(&self, script: &str) -> Result<Value, DriverError> {
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": [] })),
        )
        .await
    }

    async fn current_window(&self) -> Result<String, DriverError> {
        let value = self.command(Method::GET, "/window", None).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DriverError::Body("window handle missing".to_string()))
    }

    async fn open_window(&self) -> Result<String, DriverError> {
        let value = self
            .command(Method::POST, "/window/new", Some(json!({ "type": "tab" })))
            .await?;
        value
            .pointer("/handle")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DriverError::Body("new window handle missing".to_string()))
    }

    async fn switch_window(&self, handle: &str) -> Result<(), DriverError> {
        self.command(Method::POST, "/window", Some(json!({ "handle": handle })))
            .await?;
        Ok(())
    }

    async fn close_window(&self) -> Result<(), DriverError> {
        self.command(Method::DELETE, "/window", None).await?;
        Ok(())
    }

    /// Best-effort teardown of a lookup tab that was never entered. Closing
    /// acts on the current window, so the tab is switched to first; failures
    /// are logged and the leftover tab is reaped with the session.
    async fn discard_window(&self, lookup: &str, origin: &str) {
        if let Err(err) = self.switch_window(lookup).await {
            engine_warn!("lookup window left behind: {err}");
            return;
        }
        if let Err(err) = self.close_window().await {
            engine_warn!("lookup window close failed: {err}");
        }
        if let Err(err) = self.switch_window(origin).await {
            engine_warn!("could not return to the original window: {err}");
        }
    }

    async fn lookup_public_url(
        &self,
        internal_handle: &str,
    ) -> Result<Option<String>, DriverError> {
        let profile_url = format!("https://www.linkedin.com/talent/profile/{internal_handle}");
        self.navigate(&profile_url).await?;
        let deadline = tokio::time::Instant::now() + self.settings.resolve_timeout;
        loop {
            let value = self.execute(PUBLIC_LINK_SCRIPT).await?;
            if let Some(href) = value.as_str() {
                if !href.is_empty() {
                    return Ok(Some(href.to_string()));
                }
            }
            if tokio::time::Instant::now() >= deadline {
                engine_debug!("public link for {} did not render in time", internal_handle);
                return Ok(None);
            }
            sleep(self.settings.resolve_poll_interval).await;
        }
    }
}

#[async_trait::async_trait]
impl PageDriver for WebDriverPage {
    async fn location(&self) -> Result<String, DriverError> {
        let value = self.command(Method::GET, "/url", None).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DriverError::Body("current url missing".to_string()))
    }

    async fn document(&self) -> Result<String, DriverError> {
        let value = self.execute(DOCUMENT_SCRIPT).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DriverError::Body("document snapshot missing".to_string()))
    }

    async fn content_height(&self) -> Result<u64, DriverError> {
        let value = self.execute(CONTENT_HEIGHT_SCRIPT).await?;
        value
            .as_u64()
            .or_else(|| value.as_f64().map(|height| height as u64))
            .ok_or_else(|| DriverError::Body("scroll height missing".to_string()))
    }

    async fn at_bottom(&self) -> Result<bool, DriverError> {
        let value = self.execute(AT_BOTTOM_SCRIPT).await?;
        value
            .as_bool()
            .ok_or_else(|| DriverError::Body("scroll position missing".to_string()))
    }

    async fn scroll_forward(&self) -> Result<(), DriverError> {
        self.execute(SCROLL_FORWARD_SCRIPT).await?;
        Ok(())
    }

    async fn click_next_page(&self) -> Result<bool, DriverError> {
        let value = self.execute(CLICK_NEXT_PAGE_SCRIPT).await?;
        value
            .as_bool()
            .ok_or_else(|| DriverError::Body("pagination result missing".to_string()))
    }

    /// Renders the internal profile in a throwaway tab and waits for its
    /// public profile link. The tab is torn down before the result is
    /// surfaced so a failed lookup cannot leave the session on a dead tab.
    async fn resolve_public_url(
        &self,
        internal_handle: &str,
    ) -> Result<Option<String>, DriverError> {
        let origin = self.current_window().await?;
        let lookup = self.open_window().await?;
        if let Err(err) = self.switch_window(&lookup).await {
            self.discard_window(&lookup, &origin).await;
            return Err(err);
        }
        let result = self.lookup_public_url(internal_handle).await;
        if let Err(err) = self.close_window().await {
            engine_warn!("lookup window close failed: {err}");
        }
        self.switch_window(&origin).await?;
        result
    }
}

fn capabilities(settings: &WebDriverSettings) -> Value {
    let mut args = vec!["--window-size=1400,1200".to_string()];
    if let Some(dir) = &settings.user_data_dir {
        args.push(format!("--user-data-dir={dir}"));
    }
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args }
            }
        }
    })
}

async fn send_command(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> Result<Value, DriverError> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|err| DriverError::Body(err.to_string()))?;
    let parsed: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
    if let Some(error) = parsed.pointer("/value/error").and_then(Value::as_str) {
        let message = parsed
            .pointer("/value/message")
            .and_then(Value::as_str)
            .unwrap_or(error);
        return Err(DriverError::Protocol {
            status: status.as_u16(),
            message: format!("{error}: {message}"),
        });
    }
    if !status.is_success() {
        return Err(DriverError::Protocol {
            status: status.as_u16(),
            message: truncate(&text, 200),
        });
    }
    Ok(parsed.get("value").cloned().unwrap_or(Value::Null))
}

fn map_reqwest_error(err: reqwest::Error) -> DriverError {
    if err.is_timeout() {
        return DriverError::Timeout;
    }
    DriverError::Network(err.to_string())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max).collect::<String>() + "..."
}

use crate::config::BrowserConfig;
use crate::error::{BrowserFetchError, ScrapeError};
use crate::fetchers::{FetchRequest, PageFetcher};
use crate::results::{PageResult, PageSummary, ScrapedElement};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::wd::{
    Capabilities, TimeoutConfiguration, WebDriverCompatibleCommand, WindowHandle,
};
use fantoccini::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Endpoints tried when the configured WebDriver URL does not answer
const FALLBACK_WEBDRIVER_URLS: [&str; 2] = [
    "http://localhost:9515", // ChromeDriver default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

const SELECT_ELEMENTS_JS: &str = r#"
const [selector] = arguments;
return Array.from(document.querySelectorAll(selector)).map(el => ({
    text: el.textContent.trim(),
    html: el.innerHTML,
    tagName: el.tagName
}));
"#;

const PAGE_SUMMARY_JS: &str = r#"
const meta = document.querySelector('meta[name="description"]');
return {
    title: document.title,
    url: window.location.href,
    description: (meta && meta.content) || '',
    h1: Array.from(document.querySelectorAll('h1')).map(h => h.textContent.trim()),
    bodyText: document.body ? document.body.textContent.substring(0, 1000) : ''
};
"#;

/// Resources the page has finished loading so far
const RESOURCE_COUNT_JS: &str = "return performance.getEntriesByType('resource').length;";

/// How long the resource count must stay unchanged for the page to count as idle
const IDLE_WINDOW: Duration = Duration::from_millis(500);
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Extra time the local navigation timer allows over WebDriver's page-load timeout
const NAVIGATION_GRACE: Duration = Duration::from_secs(5);

enum SessionState<T> {
    Idle,
    Running(T),
    Closed,
}

/// Handle that is connected on first use and never recreated after [`LazySession::close`]
struct LazySession<T> {
    state: Mutex<SessionState<T>>,
}

impl<T: Clone> LazySession<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::Idle),
        }
    }

    /// Returns the running handle, running `connect` if there is none yet
    ///
    /// `connect` runs with the state lock held, so concurrent first calls connect once.
    async fn get_or_connect<F, Fut>(&self, connect: F) -> Result<T, BrowserFetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, BrowserFetchError>>,
    {
        let mut state = self.state.lock().await;

        match &*state {
            SessionState::Running(handle) => return Ok(handle.clone()),
            SessionState::Closed => return Err(BrowserFetchError::ShutDown),
            SessionState::Idle => {}
        }

        let handle = connect().await?;
        *state = SessionState::Running(handle.clone());
        Ok(handle)
    }

    async fn is_running(&self) -> bool {
        matches!(*self.state.lock().await, SessionState::Running(_))
    }

    /// Marks the session closed, returning the handle if one was running
    async fn close(&self) -> Option<T> {
        match std::mem::replace(&mut *self.state.lock().await, SessionState::Closed) {
            SessionState::Running(handle) => Some(handle),
            _ => None,
        }
    }
}

/// Lazily started WebDriver session shared by every browser fetch
///
/// The session is created on the first fetch and lives until [`BrowserSession::shutdown`].
pub struct BrowserSession {
    config: BrowserConfig,
    driver: LazySession<(Client, WindowHandle)>,
    // WebDriver has one current window per session; held while driving a tab
    tab_lock: Mutex<()>,
}

impl BrowserSession {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            driver: LazySession::new(),
            tab_lock: Mutex::new(()),
        }
    }

    /// Returns the running client, connecting on first use
    async fn client(&self) -> Result<(Client, WindowHandle), BrowserFetchError> {
        self.driver
            .get_or_connect(move || async move {
                let client = connect_to_webdriver(&self.config).await?;
                set_page_load_timeout(&client, self.config.navigation_timeout_secs).await;
                let home = client.window().await.map_err(BrowserFetchError::Tab)?;
                ::log::info!("Browser session started");
                Ok((client, home))
            })
            .await
    }

    /// Whether a WebDriver session is currently open
    pub async fn is_running(&self) -> bool {
        self.driver.is_running().await
    }

    /// Closes the session; later fetches fail with [`BrowserFetchError::ShutDown`]
    pub async fn shutdown(&self) {
        if let Some((client, _)) = self.driver.close().await {
            match client.close().await {
                Ok(()) => ::log::info!("Browser session closed"),
                Err(e) => ::log::warn!("Failed to close browser session: {}", e),
            }
        }
    }

    /// Opens a tab, scrapes `request` in it and closes the tab again
    pub async fn scrape(&self, request: &FetchRequest) -> Result<PageResult, BrowserFetchError> {
        let (client, home) = self.client().await?;
        let _driving = self.tab_lock.lock().await;

        let tab = client.new_window(true).await.map_err(BrowserFetchError::Tab)?;
        let work = async {
            client
                .switch_to_window(tab.handle.clone())
                .await
                .map_err(BrowserFetchError::Tab)?;
            self.scrape_in_tab(&client, request).await
        };
        then_always(work, close_tab(&client, tab.handle.clone(), home)).await
    }

    async fn scrape_in_tab(
        &self,
        client: &Client,
        request: &FetchRequest,
    ) -> Result<PageResult, BrowserFetchError> {
        let start = std::time::Instant::now();

        if let Some(user_agent) = &request.user_agent {
            set_user_agent(client, user_agent).await?;
        }

        let secs = self.config.navigation_timeout_secs;
        let timed_out = || BrowserFetchError::NavigationTimeout {
            url: request.url.clone(),
            secs,
        };
        let deadline = Instant::now() + Duration::from_secs(secs);

        // WebDriver aborts the load itself; the local timer only guards against a stuck driver
        match tokio::time::timeout_at(deadline + NAVIGATION_GRACE, client.goto(&request.url)).await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) if is_timeout(&e) => return Err(timed_out()),
            Ok(Err(source)) => {
                return Err(BrowserFetchError::Navigation {
                    url: request.url.clone(),
                    source,
                });
            }
            Err(_) => return Err(timed_out()),
        }

        let count_resources = move || async move {
            let value = client.execute(RESOURCE_COUNT_JS, Vec::new()).await?;
            Ok::<u64, CmdError>(value.as_u64().unwrap_or_default())
        };
        let idle = wait_for_idle(count_resources, deadline, IDLE_WINDOW, IDLE_POLL)
            .await
            .map_err(BrowserFetchError::Evaluation)?;
        if !idle {
            return Err(timed_out());
        }

        if let Some(wait_for) = request.wait_for {
            tokio::time::sleep(wait_for).await;
        }

        let mut result = match &request.selector {
            Some(selector) => {
                let value = client
                    .execute(SELECT_ELEMENTS_JS, vec![json!(selector)])
                    .await
                    .map_err(BrowserFetchError::Evaluation)?;
                PageResult::from_elements(decode_elements(value)?)
            }
            None => {
                let value = client
                    .execute(PAGE_SUMMARY_JS, Vec::new())
                    .await
                    .map_err(BrowserFetchError::Evaluation)?;
                PageResult::from_summary(serde_json::from_value::<PageSummary>(value)?)
            }
        };

        if request.screenshot {
            let png = client
                .screenshot()
                .await
                .map_err(BrowserFetchError::Screenshot)?;
            result.screenshot = Some(STANDARD.encode(png));
        }

        ::log::debug!(
            "Browser fetch of {} took {:.2} seconds",
            request.url,
            start.elapsed().as_secs_f64()
        );

        Ok(result)
    }
}

/// Runs `work`, then `cleanup` whatever the outcome of `work`
async fn then_always<T>(work: impl Future<Output = T>, cleanup: impl Future<Output = ()>) -> T {
    let outcome = work.await;
    cleanup.await;
    outcome
}

/// Polls `sample` until it returns the same value for `window`
///
/// Returns `Ok(false)` if the value is still changing at `deadline`.
async fn wait_for_idle<F, Fut>(
    mut sample: F,
    deadline: Instant,
    window: Duration,
    poll: Duration,
) -> Result<bool, CmdError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<u64, CmdError>>,
{
    let mut last = sample().await?;
    let mut stable_since = Instant::now();

    loop {
        let now = Instant::now();
        if now.duration_since(stable_since) >= window {
            return Ok(true);
        }
        if now >= deadline {
            return Ok(false);
        }

        tokio::time::sleep(poll).await;
        let current = sample().await?;
        if current != last {
            last = current;
            stable_since = Instant::now();
        }
    }
}

/// Whether WebDriver gave up on a command because one of its timeouts expired
fn is_timeout(err: &CmdError) -> bool {
    matches!(err, CmdError::Standard(wd) if matches!(wd.error, ErrorStatus::Timeout))
}

/// Makes WebDriver abort page loads after `secs`
async fn set_page_load_timeout(client: &Client, secs: u64) {
    let timeouts = TimeoutConfiguration::new(None, Some(Duration::from_secs(secs)), None);
    if let Err(e) = client.update_timeouts(timeouts).await {
        ::log::warn!("Failed to set the WebDriver page load timeout: {}", e);
    }
}

/// Element as reported by [`SELECT_ELEMENTS_JS`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrowserElement {
    text: String,
    html: Option<String>,
    tag_name: String,
}

fn decode_elements(value: Value) -> Result<Vec<ScrapedElement>, BrowserFetchError> {
    let raw: Vec<BrowserElement> = serde_json::from_value(value)?;
    Ok(raw
        .into_iter()
        .map(|el| ScrapedElement {
            text: el.text,
            html: el.html,
            attributes: BTreeMap::new(),
            tag_name: Some(el.tag_name),
        })
        .collect())
}

/// Closes the current tab and returns focus to the session's first window
async fn close_tab(client: &Client, tab: WindowHandle, home: WindowHandle) {
    if let Err(e) = client.switch_to_window(tab).await {
        ::log::warn!("Failed to focus tab before closing it: {}", e);
    } else if let Err(e) = client.close_window().await {
        ::log::warn!("Failed to close tab: {}", e);
    }

    if let Err(e) = client.switch_to_window(home).await {
        ::log::warn!("Failed to return to the home window: {}", e);
    }
}

/// Chrome DevTools command sent through ChromeDriver's `goog/cdp/execute` endpoint
#[derive(Debug)]
struct CdpCommand {
    cmd: &'static str,
    params: Value,
}

impl WebDriverCompatibleCommand for CdpCommand {
    fn endpoint(
        &self,
        base_url: &url::Url,
        session_id: Option<&str>,
    ) -> Result<url::Url, url::ParseError> {
        base_url.join(&format!(
            "session/{}/goog/cdp/execute",
            session_id.unwrap_or_default()
        ))
    }

    fn method_and_body(&self, _request_url: &url::Url) -> (http::Method, Option<String>) {
        let body = json!({ "cmd": self.cmd, "params": self.params });
        (http::Method::POST, Some(body.to_string()))
    }
}

/// Overrides the user-agent of the current tab
async fn set_user_agent(client: &Client, user_agent: &str) -> Result<(), BrowserFetchError> {
    let command = CdpCommand {
        cmd: "Network.setUserAgentOverride",
        params: json!({ "userAgent": user_agent }),
    };
    client
        .issue_cmd(command)
        .await
        .map(|_| ())
        .map_err(BrowserFetchError::Tab)
}

/// Chrome capabilities for the session
fn capabilities(config: &BrowserConfig) -> Capabilities {
    let mut args = vec![
        "--disable-gpu".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--window-size=1920,1080".to_string(),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
    }
    if let Some(user_agent) = &config.user_agent {
        args.push(format!("--user-agent={user_agent}"));
    }

    let mut caps = Capabilities::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

/// Connects to the configured WebDriver instance, then to common local defaults
async fn connect_to_webdriver(config: &BrowserConfig) -> Result<Client, BrowserFetchError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities(config));

    match builder.connect(&config.webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", config.webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                config.webdriver_url,
                e
            );
        }
    }

    let mut tried = vec![config.webdriver_url.clone()];
    for url in FALLBACK_WEBDRIVER_URLS {
        if url == config.webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        tried.push(url.to_string());
        if let Ok(client) = builder.connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(BrowserFetchError::Connect {
        tried: tried.join(", "),
    })
}

/// Browser strategy backed by a shared [`BrowserSession`]
#[derive(Clone)]
pub struct BrowserFetcher {
    session: std::sync::Arc<BrowserSession>,
}

impl BrowserFetcher {
    pub fn new(session: std::sync::Arc<BrowserSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<PageResult, ScrapeError> {
        self.session.scrape(request).await.map_err(|e| {
            ::log::error!("Browser scraping of {} failed: {}", request.url, e);
            ScrapeError::from(e)
        })
    }
}

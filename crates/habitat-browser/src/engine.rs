use crate::error::{BrowserError, Result};
use crate::fetch::{extract_domain, PageFetcher};
use crate::fingerprint::FingerprintConfig;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use habitat_core::BrowserConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Interval between readiness-marker probes
const MARKER_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Flags that keep Chromium from advertising automation
const LAUNCH_ARGS: [&str; 4] = [
    "--disable-blink-features=AutomationControlled",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--start-maximized",
];

const HIDE_WEBDRIVER_JS: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

/// Browser automation engine
///
/// Owns one Chromium process and a single tab. All navigations go through the
/// tab mutex, so callers sharing the engine are served one at a time.
pub struct BrowserEngine {
    browser: Browser,
    page: Mutex<Page>,
    fingerprint: FingerprintConfig,
    handler_alive: Arc<AtomicBool>,
    handler_task: JoinHandle<()>,
}

impl BrowserEngine {
    /// Launch Chromium according to `config`
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let fingerprint = if config.randomize_fingerprint {
            FingerprintConfig::randomized()
        } else {
            FingerprintConfig::fixed(config.window_width, config.window_height)
        };

        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height);
        for arg in LAUNCH_ARGS {
            builder = builder.arg(arg);
        }
        if !config.headless {
            builder = builder.with_head();
        }
        let chrome_config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(chrome_config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // The CDP connection lives exactly as long as this handler loop
        let handler_alive = Arc::new(AtomicBool::new(true));
        let alive = handler_alive.clone();
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser handler event error");
                }
            }
            alive.store(false, Ordering::SeqCst);
            tracing::warn!("browser handler stopped");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        page.set_user_agent(SetUserAgentOverrideParams::new(
            fingerprint.user_agent.clone(),
        ))
        .await
        .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        page.evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(
            HIDE_WEBDRIVER_JS,
        ))
        .await
        .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        tracing::info!(
            headless = config.headless,
            width = fingerprint.viewport_width,
            height = fingerprint.viewport_height,
            "browser launched"
        );

        Ok(Self {
            browser,
            page: Mutex::new(page),
            fingerprint,
            handler_alive,
            handler_task,
        })
    }

    /// Fingerprint in use for this session
    pub fn fingerprint(&self) -> &FingerprintConfig {
        &self.fingerprint
    }

    /// Shut the browser down and wait for the process to exit
    pub async fn close(mut self) -> Result<()> {
        tracing::info!("closing browser");
        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()));
        if let Err(e) = self.browser.wait().await {
            tracing::warn!(error = %e, "browser process did not exit cleanly");
        }
        self.handler_task.abort();
        closed.map(|_| ())
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.handler_alive.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BrowserError::SessionClosed(
                "CDP handler is no longer running".to_string(),
            ))
        }
    }

    /// Map a CDP failure on one page, promoting it to fatal if the session died
    fn page_error(&self, url: &str, err: impl std::fmt::Display) -> BrowserError {
        if self.handler_alive.load(Ordering::SeqCst) {
            BrowserError::NavigationError(format!("{url}: {err}"))
        } else {
            BrowserError::SessionClosed(format!("{url}: {err}"))
        }
    }

    async fn navigate_and_wait(&self, page: &Page, url: &str, readiness_marker: &str) -> Result<()> {
        page.goto(url).await.map_err(|e| self.page_error(url, e))?;

        loop {
            if page.find_element(readiness_marker).await.is_ok() {
                return Ok(());
            }
            self.ensure_alive()?;
            tokio::time::sleep(MARKER_POLL_INTERVAL).await;
        }
    }
}

#[async_trait::async_trait]
impl PageFetcher for BrowserEngine {
    async fn fetch(
        &self,
        url: &str,
        readiness_marker: &str,
        timeout: Duration,
    ) -> Result<String> {
        self.ensure_alive()?;
        let page = self.page.lock().await;

        tracing::debug!(
            url = %url,
            domain = %extract_domain(url).unwrap_or_default(),
            marker = %readiness_marker,
            "navigating"
        );

        tokio::time::timeout(timeout, self.navigate_and_wait(&page, url, readiness_marker))
            .await
            .map_err(|_| {
                BrowserError::Timeout(format!(
                    "'{readiness_marker}' not present on {url} after {timeout:?}"
                ))
            })??;

        page.content().await.map_err(|e| self.page_error(url, e))
    }
}

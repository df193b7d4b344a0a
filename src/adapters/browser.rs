use crate::core::wait::poll_until;
use crate::core::{ButtonLookup, PageDriver};
use crate::domain::settings::RenderSettings;
use crate::utils::error::{Result, VerifyError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight); true";
const HAS_BUTTON: &str = "Array.from(document.querySelectorAll('button'))
    .some(b => (b.textContent || '').includes(NEEDLE))";

/// Chrome session shared by every render check of a run.
pub struct ChromeSession {
    page: Option<Page>,
    browser: Mutex<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
}

impl ChromeSession {
    pub async fn launch(settings: &RenderSettings) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .args(settings.browser_args.iter().map(String::as_str))
            .request_timeout(settings.timeout + Duration::from_secs(30));
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(VerifyError::browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| VerifyError::browser(format!("launch failed: {}", e)))?;

        // CDP events must be drained for the browser to make progress
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| VerifyError::browser(format!("cannot open a tab: {}", e)))?;

        tracing::info!(
            "🌐 Browser session started ({})",
            if settings.headless { "headless" } else { "headed" }
        );

        Ok(Self {
            page: Some(page),
            browser: Mutex::new(Some(browser)),
            handler: Mutex::new(Some(handler)),
        })
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| VerifyError::browser("session already closed"))
    }

    async fn has_button(&self, text: &str) -> Result<bool> {
        let needle = serde_json::to_string(text)?;
        let script = HAS_BUTTON.replace("NEEDLE", &needle);
        let evaluation = self
            .page()?
            .evaluate(script)
            .await
            .map_err(|e| VerifyError::element_lookup(e.to_string()))?;
        evaluation
            .into_value::<bool>()
            .map_err(|e| VerifyError::element_lookup(e.to_string()))
    }
}

#[async_trait]
impl PageDriver for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page()?
            .goto(url)
            .await
            .map_err(|e| VerifyError::browser(format!("navigation to {} failed: {}", url, e)))?;
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.page()?
            .evaluate(SCROLL_TO_BOTTOM)
            .await
            .map_err(|e| VerifyError::browser(format!("scroll failed: {}", e)))?;
        Ok(())
    }

    async fn wait_for_button(
        &self,
        text: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<ButtonLookup> {
        poll_until(timeout, poll_interval, || self.has_button(text)).await
    }

    async fn page_source(&self) -> Result<String> {
        self.page()?
            .content()
            .await
            .map_err(|e| VerifyError::browser(format!("cannot read page source: {}", e)))
    }

    async fn close(&mut self) -> Result<()> {
        self.page = None;

        let browser = self.browser.get_mut().ok().and_then(Option::take);
        if let Some(mut browser) = browser {
            if let Err(e) = browser.close().await {
                tracing::warn!("⚠️ Browser close failed: {}", e);
            }
            if let Err(e) = browser.wait().await {
                tracing::warn!("⚠️ Browser process did not exit cleanly: {}", e);
            }
        }

        let handler = self.handler.get_mut().ok().and_then(Option::take);
        if let Some(handler) = handler {
            let _ = handler.await;
        }
        tracing::info!("🌐 Browser session closed");
        Ok(())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        // close() was skipped; at least stop draining events
        if let Some(handler) = self.handler.get_mut().ok().and_then(Option::take) {
            handler.abort();
        }
    }
}

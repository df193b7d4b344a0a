use crate::core::retry::{RetryOutcome, RetryPolicy};
use crate::core::{
    ArtworkReference, ButtonLookup, CheckKind, PageDriver, Storage, VerificationResult,
    VerificationStatus, Verifier,
};
use crate::domain::settings::RenderSettings;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

type Launch<D> = Pin<Box<dyn Future<Output = Result<D>> + Send>>;

/// Why a single render attempt did not find the control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    Timeout(Duration),
    ElementLookup(String),
    Navigation(String),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Timeout(waited) => {
                write!(f, "run button did not appear within {:?}", waited)
            }
            AttemptFailure::ElementLookup(e) => write!(f, "element lookup failed: {}", e),
            AttemptFailure::Navigation(e) => write!(f, "page could not be loaded: {}", e),
        }
    }
}

enum DriverSlot<D: 'static> {
    Ready(D),
    Pending(Launch<D>),
    Unavailable(String),
}

/// Opens each artwork page and waits for its "Run" button.
pub struct RenderCheckVerifier<D: PageDriver + 'static, S: Storage> {
    driver: DriverSlot<D>,
    settings: RenderSettings,
    policy: RetryPolicy,
    diagnostics: Option<S>,
}

impl<D: PageDriver + 'static, S: Storage> RenderCheckVerifier<D, S> {
    pub fn new(driver: D, settings: RenderSettings, diagnostics: Option<S>) -> Self {
        Self::with_slot(DriverSlot::Ready(driver), settings, diagnostics)
    }

    /// The driver is started by the first `verify`, after the result file is open.
    /// If `launch` fails, every artwork gets a request error row.
    pub fn launching<F>(launch: F, settings: RenderSettings, diagnostics: Option<S>) -> Self
    where
        F: Future<Output = Result<D>> + Send + 'static,
    {
        Self::with_slot(DriverSlot::Pending(Box::pin(launch)), settings, diagnostics)
    }

    fn with_slot(driver: DriverSlot<D>, settings: RenderSettings, diagnostics: Option<S>) -> Self {
        let policy = RetryPolicy::new(settings.retries, settings.backoff);
        Self {
            driver,
            settings,
            policy,
            diagnostics,
        }
    }

    async fn ensure_driver(&mut self) {
        let slot = std::mem::replace(&mut self.driver, DriverSlot::Unavailable(String::new()));
        self.driver = match slot {
            DriverSlot::Pending(launch) => match launch.await {
                Ok(driver) => DriverSlot::Ready(driver),
                Err(e) => {
                    tracing::error!("❌ Browser unavailable, no page can be checked: {}", e);
                    DriverSlot::Unavailable(e.to_string())
                }
            },
            other => other,
        };
    }
}

#[async_trait]
impl<D: PageDriver + 'static, S: Storage> Verifier for RenderCheckVerifier<D, S> {
    fn kind(&self) -> CheckKind {
        CheckKind::Render
    }

    async fn verify(&mut self, artwork: &ArtworkReference) -> VerificationResult {
        self.ensure_driver().await;

        let driver = match &self.driver {
            DriverSlot::Ready(driver) => driver,
            DriverSlot::Unavailable(reason) => {
                return VerificationResult::render(
                    artwork.clone(),
                    VerificationStatus::RequestError(format!("browser unavailable: {}", reason)),
                    0,
                )
            }
            DriverSlot::Pending(_) => {
                return VerificationResult::render(
                    artwork.clone(),
                    VerificationStatus::RequestError("browser unavailable".to_string()),
                    0,
                )
            }
        };
        let policy = self.policy;
        let settings = &self.settings;
        let diagnostics = self.diagnostics.as_ref();

        let outcome = policy
            .run(&artwork.url, |attempt| {
                check_once(driver, settings, diagnostics, artwork, attempt)
            })
            .await;

        match outcome {
            RetryOutcome::Succeeded { attempts, .. } => {
                VerificationResult::render(artwork.clone(), VerificationStatus::Success, attempts)
            }
            RetryOutcome::Exhausted {
                attempts,
                last_error: AttemptFailure::Navigation(reason),
            } => VerificationResult::render(
                artwork.clone(),
                VerificationStatus::RequestError(reason),
                attempts,
            ),
            RetryOutcome::Exhausted { attempts, .. } => VerificationResult::render(
                artwork.clone(),
                VerificationStatus::TimeoutFailure,
                attempts,
            ),
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        match &mut self.driver {
            DriverSlot::Ready(driver) => driver.close().await,
            _ => Ok(()),
        }
    }
}

async fn check_once<D: PageDriver, S: Storage>(
    driver: &D,
    settings: &RenderSettings,
    diagnostics: Option<&S>,
    artwork: &ArtworkReference,
    attempt: u32,
) -> std::result::Result<(), AttemptFailure> {
    driver
        .navigate(&artwork.url)
        .await
        .map_err(|e| AttemptFailure::Navigation(e.to_string()))?;

    if settings.scroll_first {
        driver
            .scroll_to_bottom()
            .await
            .map_err(|e| AttemptFailure::Navigation(e.to_string()))?;
        tokio::time::sleep(settings.settle_delay).await;
    }

    let lookup = driver
        .wait_for_button(&settings.button_text, settings.timeout, settings.poll_interval)
        .await;

    match lookup {
        Ok(ButtonLookup::Found) => {
            tracing::info!("▶️ Run button found for {} on attempt {}", artwork.url, attempt);
            Ok(())
        }
        Ok(ButtonLookup::TimedOut) => {
            tracing::warn!("⏱️ Timeout waiting for Run button on {}", artwork.url);
            capture_page_source(driver, diagnostics, artwork, attempt).await;
            Err(AttemptFailure::Timeout(settings.timeout))
        }
        Err(e) => {
            tracing::warn!("🔎 Element lookup error on {}: {}", artwork.url, e);
            Err(AttemptFailure::ElementLookup(e.to_string()))
        }
    }
}

async fn capture_page_source<D: PageDriver, S: Storage>(
    driver: &D,
    diagnostics: Option<&S>,
    artwork: &ArtworkReference,
    attempt: u32,
) {
    let source = match driver.page_source().await {
        Ok(source) => source,
        Err(e) => {
            tracing::debug!("Page source unavailable for {}: {}", artwork.url, e);
            return;
        }
    };
    let Some(storage) = diagnostics else {
        tracing::info!("🧾 Page source for {} (attempt {}):\n{}", artwork.url, attempt, source);
        return;
    };
    tracing::debug!("Page source for {} (attempt {}):\n{}", artwork.url, attempt, source);

    let file_name = diagnostics_file_name(artwork, attempt);
    match storage.write_file(&file_name, source.as_bytes()).await {
        Ok(()) => tracing::info!("🧾 Page source saved as {}", file_name),
        Err(e) => tracing::warn!("⚠️ Could not save page source {}: {}", file_name, e),
    }
}

fn diagnostics_file_name(artwork: &ArtworkReference, attempt: u32) -> String {
    let label: String = artwork
        .label()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_attempt{}.html", label, attempt)
}

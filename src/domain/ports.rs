use crate::domain::model::{ArtworkReference, CheckKind, VerificationResult};
use crate::domain::settings::{Endpoints, LibrarySettings, RenderSettings, SourceSpec};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn check(&self) -> CheckKind;
    fn source(&self) -> SourceSpec;
    fn render(&self) -> RenderSettings;
    fn library(&self) -> LibrarySettings;
    fn endpoints(&self) -> Endpoints;
    fn output_path(&self) -> &str;
    fn monitoring_enabled(&self) -> bool;
}

/// Produces the artworks of a run. Failures yield an empty list, never an error.
#[async_trait]
pub trait ArtworkSource: Send {
    async fn artworks(&mut self) -> Vec<ArtworkReference>;
}

/// Checks a single artwork. Always returns a result, terminal failures included.
#[async_trait]
pub trait Verifier: Send {
    fn kind(&self) -> CheckKind;

    async fn verify(&mut self, artwork: &ArtworkReference) -> VerificationResult;

    /// Releases whatever the verifier holds (browser session, connections).
    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait ResultSink {
    fn begin(&mut self, header: &[&str]) -> Result<()>;
    fn append(&mut self, row: &[String]) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
    fn location(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLookup {
    Found,
    TimedOut,
}

/// Browser seam for the render check. `wait_for_button` returns `Err` only when the
/// last lookup before the deadline failed.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;
    async fn scroll_to_bottom(&self) -> Result<()>;
    async fn wait_for_button(
        &self,
        text: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<ButtonLookup>;
    async fn page_source(&self) -> Result<String>;
    async fn close(&mut self) -> Result<()>;
}

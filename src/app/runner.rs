use crate::adapters::csv_sink::CsvSink;
use crate::adapters::fxhash_api::FxhashClient;
use crate::adapters::source::source_from_spec;
use crate::app::pipelines::library_check::LibraryCheckVerifier;
use crate::core::engine::{RunSummary, VerificationEngine};
use crate::core::{ArtworkSource, CheckKind, ConfigProvider};
use crate::utils::error::Result;
use reqwest::Client;

/// Builds source, verifier and sink from `config` and runs one batch.
pub async fn run_with_config<C: ConfigProvider>(config: &C) -> Result<RunSummary> {
    let endpoints = config.endpoints();
    let library = config.library();
    let client = Client::new();

    let api = FxhashClient::with_client(client.clone(), endpoints.clone(), library.request_timeout);
    let source = source_from_spec(&config.source(), api);
    let sink = CsvSink::timestamped(config.output_path());

    match config.check() {
        CheckKind::Library => {
            let verifier = LibraryCheckVerifier::with_client(client, endpoints, library);
            let mut engine = VerificationEngine::new_with_monitoring(
                source,
                verifier,
                sink,
                config.monitoring_enabled(),
            );
            engine.run().await
        }
        CheckKind::Render => run_render_check(config, source, sink).await,
    }
}

#[cfg(feature = "browser")]
async fn run_render_check<C: ConfigProvider>(
    config: &C,
    source: Box<dyn ArtworkSource>,
    sink: CsvSink,
) -> Result<RunSummary> {
    use crate::adapters::browser::ChromeSession;
    use crate::adapters::storage::LocalStorage;
    use crate::app::pipelines::render_check::RenderCheckVerifier;

    let settings = config.render();
    let diagnostics = settings.diagnostics_dir.clone().map(LocalStorage::new);
    let launch_settings = settings.clone();
    let launch = async move { ChromeSession::launch(&launch_settings).await };

    let verifier = RenderCheckVerifier::launching(launch, settings, diagnostics);
    let mut engine = VerificationEngine::new_with_monitoring(
        source,
        verifier,
        sink,
        config.monitoring_enabled(),
    );
    engine.run().await
}

#[cfg(not(feature = "browser"))]
async fn run_render_check<C: ConfigProvider>(
    _config: &C,
    _source: Box<dyn ArtworkSource>,
    _sink: CsvSink,
) -> Result<RunSummary> {
    Err(crate::utils::error::VerifyError::ConfigError {
        message: "the render check needs the `browser` feature".to_string(),
    })
}

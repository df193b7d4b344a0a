use crate::core::{ArtworkSource, ResultSink, Verifier};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Drives source -> verifier -> sink, one artwork at a time.
pub struct VerificationEngine<S: ArtworkSource, V: Verifier, K: ResultSink> {
    source: S,
    verifier: V,
    sink: K,
    monitor: SystemMonitor,
}

impl<S: ArtworkSource, V: Verifier, K: ResultSink> VerificationEngine<S, V, K> {
    pub fn new(source: S, verifier: V, sink: K) -> Self {
        Self::new_with_monitoring(source, verifier, sink, false)
    }

    pub fn new_with_monitoring(source: S, verifier: V, sink: K, monitor_enabled: bool) -> Self {
        Self {
            source,
            verifier,
            sink,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// The verifier is shut down on every path out of here, errors included.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let outcome = self.process().await;

        if let Err(e) = self.verifier.shutdown().await {
            tracing::warn!("⚠️ Verifier shutdown failed: {}", e);
        }
        self.monitor.log_final_stats();

        outcome
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    async fn process(&mut self) -> Result<RunSummary> {
        let kind = self.verifier.kind();
        tracing::info!("🚀 Starting {:?} verification run", kind);

        // Output must exist before anything is fetched
        self.sink.begin(kind.header())?;
        tracing::info!("📁 Writing results to {}", self.sink.location());

        let artworks = self.source.artworks().await;
        let total = artworks.len();
        tracing::info!("📋 {} artworks to check", total);
        self.monitor.log_stats("Source");

        if artworks.is_empty() {
            tracing::warn!("📭 Source produced no artworks, writing header only");
        }

        let mut succeeded = 0;
        for (index, artwork) in artworks.iter().enumerate() {
            tracing::info!("🔍 Checking {}/{}: {}", index + 1, total, artwork.url);

            let result = self.verifier.verify(artwork).await;
            if result.status.is_success() {
                succeeded += 1;
                tracing::info!("✅ {} -> {}", artwork.url, result.status_label());
            } else {
                tracing::warn!(
                    "❌ {} -> {} after {} attempt(s)",
                    artwork.url,
                    result.status_label(),
                    result.attempts
                );
            }

            self.sink.append(&result.to_row())?;
        }

        self.sink.finish()?;
        self.monitor.log_stats("Verify");

        let summary = RunSummary {
            output_path: self.sink.location(),
            total,
            succeeded,
            failed: total - succeeded,
        };
        tracing::info!(
            "🏁 Run finished: {} checked, {} succeeded, {} failed",
            summary.total,
            summary.succeeded,
            summary.failed
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ArtworkReference, CheckKind, VerificationResult, VerificationStatus};
    use crate::domain::model::DEFAULT_URL_TEMPLATE;
    use crate::utils::error::VerifyError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct ListSource(Vec<ArtworkReference>);

    #[async_trait]
    impl ArtworkSource for ListSource {
        async fn artworks(&mut self) -> Vec<ArtworkReference> {
            std::mem::take(&mut self.0)
        }
    }

    /// Odd IDs pass, even IDs time out.
    struct ParityVerifier {
        shut_down: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Verifier for ParityVerifier {
        fn kind(&self) -> CheckKind {
            CheckKind::Render
        }

        async fn verify(&mut self, artwork: &ArtworkReference) -> VerificationResult {
            let status = match artwork.id {
                Some(id) if id % 2 == 1 => VerificationStatus::Success,
                _ => VerificationStatus::TimeoutFailure,
            };
            VerificationResult::render(artwork.clone(), status, 1)
        }

        async fn shutdown(&mut self) -> Result<()> {
            self.shut_down.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemorySink {
        header: Option<Vec<String>>,
        rows: Vec<Vec<String>>,
        fail_on_begin: bool,
        finished: bool,
    }

    impl ResultSink for MemorySink {
        fn begin(&mut self, header: &[&str]) -> Result<()> {
            if self.fail_on_begin {
                return Err(VerifyError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            self.header = Some(header.iter().map(|h| h.to_string()).collect());
            Ok(())
        }

        fn append(&mut self, row: &[String]) -> Result<()> {
            assert!(self.header.is_some(), "row appended before header");
            self.rows.push(row.to_vec());
            Ok(())
        }

        fn finish(&mut self) -> Result<()> {
            self.finished = true;
            Ok(())
        }

        fn location(&self) -> String {
            "memory".to_string()
        }
    }

    fn artworks(ids: &[u64]) -> Vec<ArtworkReference> {
        ids.iter()
            .map(|id| ArtworkReference::from_id(*id, DEFAULT_URL_TEMPLATE))
            .collect()
    }

    #[tokio::test]
    async fn test_one_row_per_artwork_in_source_order() {
        let shut_down = Arc::new(AtomicBool::new(false));
        let verifier = ParityVerifier {
            shut_down: shut_down.clone(),
        };
        let mut engine = VerificationEngine::new(
            ListSource(artworks(&[5, 2, 9, 4])),
            verifier,
            MemorySink::default(),
        );

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 2);
        let sink = engine.sink();
        assert!(sink.finished);
        let urls: Vec<&str> = sink.rows.iter().map(|row| row[0].as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.fxhash.xyz/generative/5",
                "https://www.fxhash.xyz/generative/2",
                "https://www.fxhash.xyz/generative/9",
                "https://www.fxhash.xyz/generative/4",
            ]
        );
        assert_eq!(sink.rows[1][1], "Failed after multiple retries");
        assert!(shut_down.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_empty_source_writes_header_only() {
        let mut engine = VerificationEngine::new(
            ListSource(Vec::new()),
            ParityVerifier {
                shut_down: Arc::new(AtomicBool::new(false)),
            },
            MemorySink::default(),
        );

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.total, 0);
        assert_eq!(
            engine.sink().header.as_deref(),
            Some(&["Artwork URL".to_string(), "Status".to_string()][..])
        );
        assert!(engine.sink().rows.is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_is_fatal_but_still_shuts_down() {
        let shut_down = Arc::new(AtomicBool::new(false));
        let mut engine = VerificationEngine::new(
            ListSource(artworks(&[1])),
            ParityVerifier {
                shut_down: shut_down.clone(),
            },
            MemorySink {
                fail_on_begin: true,
                ..Default::default()
            },
        );

        let result = engine.run().await;

        assert!(matches!(result, Err(VerifyError::IoError(_))));
        assert!(engine.sink().rows.is_empty());
        assert!(shut_down.load(Ordering::SeqCst));
    }
}

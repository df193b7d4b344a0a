pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

#[cfg(feature = "browser")]
pub use adapters::browser::ChromeSession;
pub use adapters::csv_sink::CsvSink;
pub use adapters::storage::LocalStorage;
pub use app::pipelines::{library_check::LibraryCheckVerifier, render_check::RenderCheckVerifier};
pub use app::runner::run_with_config;
pub use core::engine::{RunSummary, VerificationEngine};
pub use utils::error::{Result, VerifyError};

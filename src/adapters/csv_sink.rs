use crate::core::ResultSink;
use crate::utils::error::{Result, VerifyError};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// CSV result file. The header is written on `begin`, then every row is flushed as it arrives.
pub struct CsvSink {
    path: PathBuf,
    writer: Option<csv::Writer<File>>,
    rows_written: usize,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            rows_written: 0,
        }
    }

    /// Like `new`, with any `{timestamp}` in `path` replaced by the current UTC time.
    pub fn timestamped(path: &str) -> Self {
        Self::new(expand_timestamp(path, chrono::Utc::now()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    fn writer(&mut self) -> Result<&mut csv::Writer<File>> {
        self.writer.as_mut().ok_or_else(|| VerifyError::ProcessingError {
            message: format!("result file {} was not created", self.path.display()),
        })
    }
}

pub fn expand_timestamp(path: &str, now: chrono::DateTime<chrono::Utc>) -> String {
    path.replace("{timestamp}", &now.format("%Y%m%d_%H%M%S").to_string())
}

impl ResultSink for CsvSink {
    fn begin(&mut self, header: &[&str]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&self.path)?;
        let mut writer = csv::WriterBuilder::new().from_writer(file);
        writer.write_record(header)?;
        writer.flush()?;

        tracing::debug!("Created {} with {} columns", self.path.display(), header.len());
        self.writer = Some(writer);
        self.rows_written = 0;
        Ok(())
    }

    fn append(&mut self, row: &[String]) -> Result<()> {
        let writer = self.writer()?;
        writer.write_record(row)?;
        // keep partial results on disk if the run is interrupted
        writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        tracing::debug!(
            "Closed {} after {} rows",
            self.path.display(),
            self.rows_written
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

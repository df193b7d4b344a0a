use crate::core::{CheckKind, ConfigProvider};
use crate::domain::model::DEFAULT_URL_TEMPLATE;
use crate::domain::settings::{
    Endpoints, Gateways, LibrarySettings, RenderSettings, SourceSpec, DEFAULT_API_BASE,
    DEFAULT_GENERIC_GATEWAY, DEFAULT_GRAPHQL_ENDPOINT, DEFAULT_RANGE_END, DEFAULT_RANGE_START,
    DEFAULT_SERVICE_GATEWAY,
};
use crate::utils::error::{Result, VerifyError};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "fxhash-verify")]
#[command(about = "Checks fxhash generative tokens: interactive rendering or loaded JavaScript libraries")]
pub struct CliConfig {
    #[arg(long, default_value = "render", help = "Check to run: render or library")]
    pub check: CheckKind,

    #[arg(long, value_delimiter = ',', help = "Artwork page URLs to check")]
    pub urls: Vec<String>,

    #[arg(long, help = "Token ID range as START..END (inclusive)")]
    pub range: Option<String>,

    #[arg(long)]
    pub start: Option<u64>,

    #[arg(long)]
    pub end: Option<u64>,

    #[arg(long, default_value = DEFAULT_URL_TEMPLATE)]
    pub url_template: String,

    #[arg(long, help = "Check the most recently opened tokens")]
    pub feed: bool,

    #[arg(long, default_value = "20")]
    pub feed_size: u32,

    #[arg(long, help = "Also check one random existing token (with --feed)")]
    pub random: bool,

    #[arg(long, default_value = "9")]
    pub random_picks: u32,

    #[arg(long, help = "Result CSV file (default depends on --check)")]
    pub output: Option<String>,

    #[arg(long, default_value = "60", help = "Seconds to wait for the Run button")]
    pub timeout: u64,

    #[arg(long, default_value = "3")]
    pub retries: u32,

    #[arg(long, default_value = "5", help = "Seconds between render attempts")]
    pub backoff: u64,

    #[arg(long, default_value = "500", help = "Milliseconds between button lookups")]
    pub poll_interval: u64,

    #[arg(long, help = "Scroll to the bottom before looking for the button")]
    pub scroll: bool,

    #[arg(long)]
    pub headless: bool,

    #[arg(long, help = "Directory for page sources of timed out attempts")]
    pub diagnostics_dir: Option<String>,

    #[arg(long, default_value = "5", help = "Seconds per library check request")]
    pub request_timeout: u64,

    #[arg(long, default_value = "2")]
    pub fetch_attempts: u32,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    #[arg(long, default_value = DEFAULT_GRAPHQL_ENDPOINT)]
    pub graphql_endpoint: String,

    #[arg(long, default_value = DEFAULT_GENERIC_GATEWAY)]
    pub generic_gateway: String,

    #[arg(long, default_value = DEFAULT_SERVICE_GATEWAY)]
    pub service_gateway: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

impl CliConfig {
    /// `--range` wins over `--start`/`--end`. Either of those alone keeps the default
    /// for the other.
    pub fn id_range(&self) -> Result<Option<(u64, u64)>> {
        if let Some(range) = &self.range {
            return parse_range(range).map(Some);
        }
        if self.start.is_none() && self.end.is_none() {
            return Ok(None);
        }
        Ok(Some((
            self.start.unwrap_or(DEFAULT_RANGE_START),
            self.end.unwrap_or(DEFAULT_RANGE_END),
        )))
    }
}

/// Parses `START..END` or `START..=END`.
pub fn parse_range(range: &str) -> Result<(u64, u64)> {
    let invalid = |reason: &str| VerifyError::InvalidConfigValueError {
        field: "range".to_string(),
        value: range.to_string(),
        reason: reason.to_string(),
    };
    let (start, end) = range
        .split_once("..")
        .ok_or_else(|| invalid("expected START..END"))?;
    let end = end.strip_prefix('=').unwrap_or(end);
    let start = start
        .trim()
        .parse::<u64>()
        .map_err(|_| invalid("start is not a token ID"))?;
    let end = end
        .trim()
        .parse::<u64>()
        .map_err(|_| invalid("end is not a token ID"))?;
    Ok((start, end))
}

impl ConfigProvider for CliConfig {
    fn check(&self) -> CheckKind {
        self.check
    }

    fn source(&self) -> SourceSpec {
        if self.feed {
            return SourceSpec::Feed {
                take: self.feed_size,
                include_random: self.random,
                random_picks: self.random_picks,
            };
        }
        if let Ok(Some((start, end))) = self.id_range() {
            return SourceSpec::Range {
                start,
                end,
                url_template: self.url_template.clone(),
            };
        }
        if self.urls.is_empty() {
            SourceSpec::default()
        } else {
            SourceSpec::Static {
                urls: self.urls.clone(),
            }
        }
    }

    fn render(&self) -> RenderSettings {
        RenderSettings {
            timeout: Duration::from_secs(self.timeout),
            poll_interval: Duration::from_millis(self.poll_interval),
            retries: self.retries,
            backoff: Duration::from_secs(self.backoff),
            scroll_first: self.scroll,
            headless: self.headless,
            diagnostics_dir: self.diagnostics_dir.clone(),
            ..RenderSettings::default()
        }
    }

    fn library(&self) -> LibrarySettings {
        LibrarySettings {
            request_timeout: Duration::from_secs(self.request_timeout),
            attempts: self.fetch_attempts,
            gateways: Gateways {
                generic: self.generic_gateway.clone(),
                service: self.service_gateway.clone(),
            },
            ..LibrarySettings::default()
        }
    }

    fn endpoints(&self) -> Endpoints {
        Endpoints {
            api_base: self.api_base.clone(),
            graphql_endpoint: self.graphql_endpoint.clone(),
        }
    }

    fn output_path(&self) -> &str {
        self.output
            .as_deref()
            .unwrap_or_else(|| self.check.default_output())
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitor
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_range("timeout", self.timeout, 1, 600)?;
        validation::validate_positive_number("retries", self.retries as usize, 1)?;
        validation::validate_positive_number("poll_interval", self.poll_interval as usize, 1)?;
        validation::validate_positive_number("fetch_attempts", self.fetch_attempts as usize, 1)?;
        validation::validate_path("output", self.output_path())?;
        if let Some(dir) = &self.diagnostics_dir {
            validation::validate_path("diagnostics_dir", dir)?;
        }

        validation::validate_url("api_base", &self.api_base)?;
        validation::validate_url("graphql_endpoint", &self.graphql_endpoint)?;
        validation::validate_url("generic_gateway", &self.generic_gateway)?;
        validation::validate_url("service_gateway", &self.service_gateway)?;

        if let Some((start, end)) = self.id_range()? {
            validation::validate_id_range("range", start, end)?;
            validation::validate_url_template("url_template", &self.url_template)?;
        }
        for url in &self.urls {
            validation::validate_url("urls", url.trim())?;
        }
        if self.feed {
            validation::validate_positive_number("feed_size", self.feed_size as usize, 1)?;
        }
        Ok(())
    }
}

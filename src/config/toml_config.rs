use crate::core::{CheckKind, ConfigProvider};
use crate::domain::model::DEFAULT_URL_TEMPLATE;
use crate::domain::settings::{
    default_static_urls, Endpoints, Gateways, LibrarySettings, RenderSettings, SourceSpec,
    DEFAULT_RANGE_END, DEFAULT_RANGE_START,
};
use crate::utils::error::{Result, VerifyError};
use crate::utils::logger::LOG_LEVELS;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub run: RunConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub name: Option<String>,
    pub check: CheckKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Static,
    Range,
    Feed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    pub urls: Option<Vec<String>>,
    pub start: Option<u64>,
    pub end: Option<u64>,
    pub url_template: Option<String>,
    pub take: Option<u32>,
    pub include_random: Option<bool>,
    pub random_picks: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    pub timeout_seconds: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub retries: Option<u32>,
    pub backoff_seconds: Option<u64>,
    pub scroll_first: Option<bool>,
    pub settle_delay_seconds: Option<u64>,
    pub button_text: Option<String>,
    pub headless: Option<bool>,
    pub browser_args: Option<Vec<String>>,
    pub diagnostics_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    pub request_timeout_seconds: Option<u64>,
    pub attempts: Option<u32>,
    pub retry_delay_seconds: Option<u64>,
    pub generic_gateway: Option<String>,
    pub service_gateway: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub graphql_endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(VerifyError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| VerifyError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn run_name(&self) -> &str {
        self.run.name.as_deref().unwrap_or("fxhash-verify")
    }

    /// Default log level for the crate's own events; `RUST_LOG` still takes precedence.
    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    pub fn validate_config(&self) -> Result<()> {
        let render = self.render();
        validation::validate_range("render.timeout_seconds", render.timeout.as_secs(), 1, 600)?;
        validation::validate_positive_number("render.retries", render.retries as usize, 1)?;
        validation::validate_positive_number(
            "render.poll_interval_ms",
            render.poll_interval.as_millis() as usize,
            1,
        )?;
        if let Some(dir) = &render.diagnostics_dir {
            validation::validate_path("render.diagnostics_dir", dir)?;
        }

        let library = self.library();
        validation::validate_positive_number("library.attempts", library.attempts as usize, 1)?;
        validation::validate_url("library.generic_gateway", &library.gateways.generic)?;
        validation::validate_url("library.service_gateway", &library.gateways.service)?;

        let endpoints = self.endpoints();
        for (field, value) in [
            ("api.base_url", &endpoints.api_base),
            ("api.graphql_endpoint", &endpoints.graphql_endpoint),
        ] {
            // an unset ${VAR} survives substitution verbatim
            if ENV_VAR.is_match(value) {
                return Err(VerifyError::MissingConfigError {
                    field: format!("{} ({})", field, value),
                });
            }
        }
        validation::validate_url("api.base_url", &endpoints.api_base)?;
        validation::validate_url("api.graphql_endpoint", &endpoints.graphql_endpoint)?;

        validation::validate_path("output.path", self.output_path())?;

        if let Some(level) = self.log_level() {
            if !LOG_LEVELS.contains(&level) {
                return Err(VerifyError::InvalidConfigValueError {
                    field: "monitoring.log_level".to_string(),
                    value: level.to_string(),
                    reason: format!("expected one of {}", LOG_LEVELS.join(", ")),
                });
            }
        }

        match self.source() {
            SourceSpec::Static { urls } => {
                for url in &urls {
                    validation::validate_url("source.urls", url)?;
                }
            }
            SourceSpec::Range {
                start,
                end,
                url_template,
            } => {
                validation::validate_id_range("source.start", start, end)?;
                validation::validate_url_template("source.url_template", &url_template)?;
            }
            SourceSpec::Feed { take, .. } => {
                validation::validate_positive_number("source.take", take as usize, 1)?;
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn check(&self) -> CheckKind {
        self.run.check
    }

    fn source(&self) -> SourceSpec {
        let source = &self.source;
        match source.kind {
            SourceKind::Static => SourceSpec::Static {
                urls: source.urls.clone().unwrap_or_else(default_static_urls),
            },
            SourceKind::Range => SourceSpec::Range {
                start: source.start.unwrap_or(DEFAULT_RANGE_START),
                end: source.end.unwrap_or(DEFAULT_RANGE_END),
                url_template: source
                    .url_template
                    .clone()
                    .unwrap_or_else(|| DEFAULT_URL_TEMPLATE.to_string()),
            },
            SourceKind::Feed => SourceSpec::Feed {
                take: source.take.unwrap_or(20),
                include_random: source.include_random.unwrap_or(false),
                random_picks: source.random_picks.unwrap_or(9),
            },
        }
    }

    fn render(&self) -> RenderSettings {
        let defaults = RenderSettings::default();
        let render = &self.render;
        RenderSettings {
            timeout: render
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            poll_interval: render
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            retries: render.retries.unwrap_or(defaults.retries),
            backoff: render
                .backoff_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.backoff),
            scroll_first: render.scroll_first.unwrap_or(defaults.scroll_first),
            settle_delay: render
                .settle_delay_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.settle_delay),
            button_text: render.button_text.clone().unwrap_or(defaults.button_text),
            headless: render.headless.unwrap_or(defaults.headless),
            browser_args: render.browser_args.clone().unwrap_or(defaults.browser_args),
            diagnostics_dir: render.diagnostics_dir.clone(),
        }
    }

    fn library(&self) -> LibrarySettings {
        let defaults = LibrarySettings::default();
        let library = &self.library;
        LibrarySettings {
            request_timeout: library
                .request_timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            attempts: library.attempts.unwrap_or(defaults.attempts),
            retry_delay: library
                .retry_delay_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.retry_delay),
            gateways: Gateways {
                generic: library
                    .generic_gateway
                    .clone()
                    .unwrap_or(defaults.gateways.generic),
                service: library
                    .service_gateway
                    .clone()
                    .unwrap_or(defaults.gateways.service),
            },
        }
    }

    fn endpoints(&self) -> Endpoints {
        let defaults = Endpoints::default();
        Endpoints {
            api_base: self.api.base_url.clone().unwrap_or(defaults.api_base),
            graphql_endpoint: self
                .api
                .graphql_endpoint
                .clone()
                .unwrap_or(defaults.graphql_endpoint),
        }
    }

    fn output_path(&self) -> &str {
        self.output
            .path
            .as_deref()
            .unwrap_or_else(|| self.run.check.default_output())
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_library_range_config() {
        let toml_content = r#"
[run]
name = "weekly-library-scan"
check = "library"

[source]
kind = "range"
start = 30661
end = 30700

[library]
attempts = 3
generic_gateway = "https://ipfs.io/ipfs/"

[output]
path = "./reports/libraries.csv"

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.run_name(), "weekly-library-scan");
        assert_eq!(config.check(), CheckKind::Library);
        assert_eq!(
            config.source(),
            SourceSpec::Range {
                start: 30661,
                end: 30700,
                url_template: DEFAULT_URL_TEMPLATE.to_string(),
            }
        );
        let library = config.library();
        assert_eq!(library.attempts, 3);
        assert_eq!(library.gateways.generic, "https://ipfs.io/ipfs/");
        assert_eq!(library.retry_delay, Duration::from_secs(1));
        assert_eq!(config.output_path(), "./reports/libraries.csv");
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_render_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("[run]\ncheck = \"render\"\n").unwrap();

        assert_eq!(config.render(), RenderSettings::default());
        assert_eq!(config.source(), SourceSpec::default());
        assert_eq!(config.output_path(), "artwork_button_check_results.csv");
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FXHASH_VERIFY_TEST_API", "https://api.staging.example");

        let toml_content = r#"
[run]
check = "library"

[api]
base_url = "${FXHASH_VERIFY_TEST_API}"
graphql_endpoint = "${FXHASH_VERIFY_TEST_UNSET}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.endpoints().api_base, "https://api.staging.example");
        assert_eq!(
            config.endpoints().graphql_endpoint,
            "${FXHASH_VERIFY_TEST_UNSET}"
        );
        let err = config.validate().unwrap_err();
        assert!(matches!(
            &err,
            VerifyError::MissingConfigError { field } if field.starts_with("api.graphql_endpoint")
        ));

        std::env::remove_var("FXHASH_VERIFY_TEST_API");
    }

    #[test]
    fn test_config_validation() {
        let out_of_bounds = r#"
[run]
check = "render"

[render]
timeout_seconds = 900
"#;
        let config = TomlConfig::from_toml_str(out_of_bounds).unwrap();
        assert!(config.validate().is_err());

        let reversed = r#"
[run]
check = "library"

[source]
kind = "range"
start = 10
end = 1
"#;
        let config = TomlConfig::from_toml_str(reversed).unwrap();
        assert!(config.validate().is_err());

        assert!(TomlConfig::from_toml_str("[run]\ncheck = \"screenshot\"\n").is_err());
    }

    #[test]
    fn test_log_level_comes_from_monitoring_section() {
        let with_level = r#"
[run]
check = "library"

[monitoring]
enabled = false
log_level = "debug"
"#;
        let config = TomlConfig::from_toml_str(with_level).unwrap();
        assert_eq!(config.log_level(), Some("debug"));
        assert!(config.validate().is_ok());

        let config = TomlConfig::from_toml_str("[run]\ncheck = \"render\"\n").unwrap();
        assert_eq!(config.log_level(), None);

        let unknown = with_level.replace("\"debug\"", "\"loud\"");
        let config = TomlConfig::from_toml_str(&unknown).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            &err,
            VerifyError::InvalidConfigValueError { field, .. } if field == "monitoring.log_level"
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[run]
check = "render"

[source]
kind = "feed"
take = 5
include_random = true

[render]
headless = true
scroll_first = true
diagnostics_dir = "./diagnostics"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.source(),
            SourceSpec::Feed {
                take: 5,
                include_random: true,
                random_picks: 9,
            }
        );
        let render = config.render();
        assert!(render.headless);
        assert!(render.scroll_first);
        assert_eq!(render.diagnostics_dir.as_deref(), Some("./diagnostics"));
    }
}

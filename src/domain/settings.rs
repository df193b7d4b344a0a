use crate::domain::model::DEFAULT_URL_TEMPLATE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.fxhash.xyz";
pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://api.fxhash.xyz/graphql";
pub const DEFAULT_GENERIC_GATEWAY: &str = "https://gateway.ipfs.io/ipfs/";
pub const DEFAULT_SERVICE_GATEWAY: &str = "https://gateway.fxhash2.xyz/ipfs/";

pub const DEFAULT_RANGE_START: u64 = 30661;
pub const DEFAULT_RANGE_END: u64 = 31600;

pub fn default_static_urls() -> Vec<String> {
    (30661..=30663)
        .map(|id| DEFAULT_URL_TEMPLATE.replace("{id}", &id.to_string()))
        .collect()
}

pub fn default_browser_args() -> Vec<String> {
    [
        "--disable-gpu",
        "--no-sandbox",
        "--disable-dev-shm-usage",
        "--enable-unsafe-swiftshader",
    ]
    .iter()
    .map(|arg| arg.to_string())
    .collect()
}

/// Where the artworks of a run come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceSpec {
    Static {
        urls: Vec<String>,
    },
    Range {
        start: u64,
        end: u64,
        url_template: String,
    },
    Feed {
        take: u32,
        include_random: bool,
        random_picks: u32,
    },
}

impl Default for SourceSpec {
    fn default() -> Self {
        SourceSpec::Static {
            urls: default_static_urls(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub retries: u32,
    pub backoff: Duration,
    pub scroll_first: bool,
    pub settle_delay: Duration,
    pub button_text: String,
    pub headless: bool,
    pub browser_args: Vec<String>,
    pub diagnostics_dir: Option<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
            retries: 3,
            backoff: Duration::from_secs(5),
            scroll_first: false,
            settle_delay: Duration::from_secs(2),
            button_text: "Run".to_string(),
            headless: false,
            browser_args: default_browser_args(),
            diagnostics_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gateways {
    pub generic: String,
    pub service: String,
}

impl Default for Gateways {
    fn default() -> Self {
        Self {
            generic: DEFAULT_GENERIC_GATEWAY.to_string(),
            service: DEFAULT_SERVICE_GATEWAY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySettings {
    pub request_timeout: Duration,
    pub attempts: u32,
    pub retry_delay: Duration,
    pub gateways: Gateways,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            attempts: 2,
            retry_delay: Duration::from_secs(1),
            gateways: Gateways::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub api_base: String,
    pub graphql_endpoint: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            graphql_endpoint: DEFAULT_GRAPHQL_ENDPOINT.to_string(),
        }
    }
}

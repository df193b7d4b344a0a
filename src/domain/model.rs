use serde::{Deserialize, Serialize};

/// Placeholder written wherever a field could not be resolved.
pub const PLACEHOLDER: &str = "-";

pub const DEFAULT_URL_TEMPLATE: &str = "https://www.fxhash.xyz/generative/{id}";

/// Token fields already known from the listing API, so the library check can skip the lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSummary {
    pub name: String,
    pub generative_uri: String,
    pub author: String,
}

/// One artwork to verify. Immutable once produced by a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkReference {
    pub id: Option<u64>,
    pub url: String,
    pub token: Option<TokenSummary>,
}

impl ArtworkReference {
    pub fn from_id(id: u64, url_template: &str) -> Self {
        Self {
            id: Some(id),
            url: url_template.replace("{id}", &id.to_string()),
            token: None,
        }
    }

    /// The ID is taken from the last path segment when it is numeric.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let id = url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse::<u64>().ok());
        Self {
            id,
            url,
            token: None,
        }
    }

    pub fn with_token(mut self, token: TokenSummary) -> Self {
        self.token = Some(token);
        self
    }

    /// Short label for log lines and diagnostics file names.
    pub fn label(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => self.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Render,
    Library,
}

impl CheckKind {
    pub fn default_output(&self) -> &'static str {
        match self {
            CheckKind::Render => "artwork_button_check_results.csv",
            CheckKind::Library => "fxhash_artwork_analysis.csv",
        }
    }

    pub fn header(&self) -> &'static [&'static str] {
        match self {
            CheckKind::Render => &["Artwork URL", "Status"],
            CheckKind::Library => &[
                "Link Status",
                "Description",
                "Artwork Link",
                "IPFS Link",
                "p5.js Versions",
                "Other JS Libraries",
                "Artifact URI HTTP",
                "Artifact URI fxhash",
                "Display URI HTTP",
                "Display URI fxhash",
                "Thumbnail URI HTTP",
                "Thumbnail URI fxhash",
                "Generative URI HTTP",
                "Generative URI fxhash",
            ],
        }
    }
}

impl std::str::FromStr for CheckKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "render" | "button" => Ok(CheckKind::Render),
            "library" | "metadata" => Ok(CheckKind::Library),
            other => Err(format!(
                "unknown check '{}', expected 'render' or 'library'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    Success,
    TimeoutFailure,
    NotFound,
    RequestError(String),
}

impl VerificationStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, VerificationStatus::Success)
    }

    pub fn label(&self, kind: CheckKind) -> String {
        match (self, kind) {
            (VerificationStatus::Success, CheckKind::Render) => "Run button works".to_string(),
            (VerificationStatus::Success, CheckKind::Library) => "working".to_string(),
            (VerificationStatus::TimeoutFailure, _) => "Failed after multiple retries".to_string(),
            (VerificationStatus::NotFound, CheckKind::Render) => "Page not found".to_string(),
            (VerificationStatus::NotFound, CheckKind::Library) => "Token not found".to_string(),
            (VerificationStatus::RequestError(reason), _) => {
                format!("Request Error: {}", reason)
            }
        }
    }
}

/// Both HTTP forms of a content-addressed link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPair {
    pub generic: String,
    pub service: String,
}

impl GatewayPair {
    pub fn placeholder() -> Self {
        Self {
            generic: PLACEHOLDER.to_string(),
            service: PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkMetadata {
    pub description: String,
    pub ipfs_link: String,
    pub p5_versions: String,
    pub other_libraries: String,
    pub artifact_uri: GatewayPair,
    pub display_uri: GatewayPair,
    pub thumbnail_uri: GatewayPair,
    pub generative_uri: GatewayPair,
}

impl ArtworkMetadata {
    pub fn placeholder() -> Self {
        Self {
            description: PLACEHOLDER.to_string(),
            ipfs_link: PLACEHOLDER.to_string(),
            p5_versions: PLACEHOLDER.to_string(),
            other_libraries: PLACEHOLDER.to_string(),
            artifact_uri: GatewayPair::placeholder(),
            display_uri: GatewayPair::placeholder(),
            thumbnail_uri: GatewayPair::placeholder(),
            generative_uri: GatewayPair::placeholder(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub artwork: ArtworkReference,
    pub kind: CheckKind,
    pub status: VerificationStatus,
    pub attempts: u32,
    pub metadata: Option<ArtworkMetadata>,
}

impl VerificationResult {
    pub fn render(artwork: ArtworkReference, status: VerificationStatus, attempts: u32) -> Self {
        Self {
            artwork,
            kind: CheckKind::Render,
            status,
            attempts,
            metadata: None,
        }
    }

    pub fn library(
        artwork: ArtworkReference,
        status: VerificationStatus,
        attempts: u32,
        metadata: ArtworkMetadata,
    ) -> Self {
        Self {
            artwork,
            kind: CheckKind::Library,
            status,
            attempts,
            metadata: Some(metadata),
        }
    }

    pub fn status_label(&self) -> String {
        self.status.label(self.kind)
    }

    /// One CSV row matching `self.kind.header()`.
    pub fn to_row(&self) -> Vec<String> {
        match self.kind {
            CheckKind::Render => vec![self.artwork.url.clone(), self.status_label()],
            CheckKind::Library => {
                let meta = self
                    .metadata
                    .clone()
                    .unwrap_or_else(ArtworkMetadata::placeholder);
                vec![
                    self.status_label(),
                    meta.description,
                    self.artwork.url.clone(),
                    meta.ipfs_link,
                    meta.p5_versions,
                    meta.other_libraries,
                    meta.artifact_uri.generic,
                    meta.artifact_uri.service,
                    meta.display_uri.generic,
                    meta.display_uri.service,
                    meta.thumbnail_uri.generic,
                    meta.thumbnail_uri.service,
                    meta.generative_uri.generic,
                    meta.generative_uri.service,
                ]
            }
        }
    }
}

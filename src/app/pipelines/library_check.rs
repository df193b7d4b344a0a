use crate::adapters::fxhash_api::{ApiToken, FxhashClient};
use crate::adapters::gateway::{FetchedCode, GatewayClient};
use crate::core::extract::{is_p5_file, LibraryExtractor, LibrarySummary, NO_P5, UNKNOWN_VERSION};
use crate::core::retry::{RetryOutcome, RetryPolicy};
use crate::core::scrape::PageScrape;
use crate::core::{
    ArtworkMetadata, ArtworkReference, CheckKind, TokenSummary, VerificationResult,
    VerificationStatus, Verifier,
};
use crate::domain::model::PLACEHOLDER;
use crate::domain::settings::{Endpoints, LibrarySettings};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Token fields that lead to the code, whichever lookup produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TokenFields {
    description: String,
    ipfs_link: String,
    artifact_uri: String,
    display_uri: String,
    thumbnail_uri: String,
    generative_uri: String,
}

impl TokenFields {
    fn code_link(&self) -> Option<&str> {
        [self.ipfs_link.as_str(), self.generative_uri.as_str()]
            .into_iter()
            .find(|link| *link != PLACEHOLDER && !link.trim().is_empty())
    }
}

impl From<&TokenSummary> for TokenFields {
    fn from(token: &TokenSummary) -> Self {
        Self {
            description: token.name.clone(),
            ipfs_link: token.generative_uri.clone(),
            artifact_uri: PLACEHOLDER.to_string(),
            display_uri: PLACEHOLDER.to_string(),
            thumbnail_uri: PLACEHOLDER.to_string(),
            generative_uri: token.generative_uri.clone(),
        }
    }
}

impl From<ApiToken> for TokenFields {
    fn from(token: ApiToken) -> Self {
        Self {
            description: token.description,
            ipfs_link: token.ipfs,
            artifact_uri: token.artifact_uri,
            display_uri: token.display_uri,
            thumbnail_uri: token.thumbnail_uri,
            generative_uri: token.generative_uri,
        }
    }
}

impl From<PageScrape> for TokenFields {
    fn from(scrape: PageScrape) -> Self {
        Self {
            description: scrape.description,
            ipfs_link: scrape.ipfs_link,
            artifact_uri: scrape.artifact_uri,
            display_uri: scrape.display_uri,
            thumbnail_uri: scrape.thumbnail_uri,
            generative_uri: scrape.generative_uri,
        }
    }
}

/// Resolves token metadata and reports which JavaScript libraries the token code loads.
pub struct LibraryCheckVerifier {
    api: FxhashClient,
    gateway: GatewayClient,
    pages: Client,
    extractor: LibraryExtractor,
    policy: RetryPolicy,
    request_timeout: Duration,
}

impl LibraryCheckVerifier {
    pub fn new(endpoints: Endpoints, settings: LibrarySettings) -> Self {
        Self::with_client(Client::new(), endpoints, settings)
    }

    /// All lookups share `client` and its connection pool.
    pub fn with_client(client: Client, endpoints: Endpoints, settings: LibrarySettings) -> Self {
        Self {
            api: FxhashClient::with_client(client.clone(), endpoints, settings.request_timeout),
            gateway: GatewayClient::with_client(
                client.clone(),
                settings.gateways,
                settings.request_timeout,
            ),
            pages: client,
            extractor: LibraryExtractor::new(),
            policy: RetryPolicy::new(settings.attempts, settings.retry_delay),
            request_timeout: settings.request_timeout,
        }
    }

    async fn resolve(
        &self,
        artwork: &ArtworkReference,
    ) -> std::result::Result<TokenFields, VerificationStatus> {
        if let Some(token) = &artwork.token {
            tracing::info!(
                "📇 Using listed token data for {}: '{}' by {}",
                artwork.label(),
                token.name,
                token.author
            );
            return Ok(TokenFields::from(token));
        }

        if let Some(id) = artwork.id {
            match self.api.token(id).await {
                Ok(Some(token)) => return Ok(TokenFields::from(token)),
                Ok(None) => tracing::debug!("Token API has no record for {}", id),
                Err(e) => tracing::warn!("⚠️ Token API lookup failed for {}: {}", id, e),
            }
        }

        self.scrape_page(&artwork.url).await
    }

    async fn scrape_page(&self, url: &str) -> std::result::Result<TokenFields, VerificationStatus> {
        tracing::debug!("Scraping artwork page {}", url);
        let response = self
            .pages
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("⚠️ Could not load {}: {}", url, e);
                VerificationStatus::RequestError(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(VerificationStatus::NotFound);
        }
        if !status.is_success() {
            return Err(VerificationStatus::RequestError(format!("HTTP {}", status)));
        }

        let html = response
            .text()
            .await
            .map_err(|e| VerificationStatus::RequestError(e.to_string()))?;
        let scrape = PageScrape::parse(&html);
        if scrape.is_empty() {
            tracing::warn!("📭 No token data on {}", url);
            return Err(VerificationStatus::NotFound);
        }
        Ok(TokenFields::from(scrape))
    }

    async fn libraries(&self, fields: &TokenFields) -> (LibrarySummary, u32) {
        let Some(link) = fields.code_link() else {
            tracing::debug!("No code link, skipping library detection");
            return (LibrarySummary::not_found(), 0);
        };

        let gateway = &self.gateway;
        let outcome = self.policy.run(link, |_| gateway.fetch(link)).await;
        let attempts = outcome.attempts();
        match outcome {
            RetryOutcome::Succeeded { value, .. } => (self.summarize(&value).await, attempts),
            RetryOutcome::Exhausted { last_error, .. } => {
                tracing::warn!("⚠️ IPFS Error for {}: {}", link, last_error);
                (LibrarySummary::not_found(), attempts)
            }
        }
    }

    async fn summarize(&self, code: &FetchedCode) -> LibrarySummary {
        let mut summary = self.extractor.extract(&code.body);
        let banner_versions = self.relative_p5_versions(code).await;
        if banner_versions.is_empty() {
            return summary;
        }

        let mut versions: Vec<String> = match summary.p5_versions.as_str() {
            NO_P5 | UNKNOWN_VERSION => Vec::new(),
            listed => listed.split(" / ").map(str::to_string).collect(),
        };
        for version in banner_versions {
            if !versions.contains(&version) {
                versions.push(version);
            }
        }
        summary.p5_versions = versions.join(" / ");
        summary
    }

    /// Banner versions of p5 files the code loads from its own directory.
    async fn relative_p5_versions(&self, code: &FetchedCode) -> Vec<String> {
        let relative: Vec<String> = self
            .extractor
            .script_sources(&code.body)
            .into_iter()
            .filter(|src| is_p5_file(src) && Url::parse(src).is_err() && !src.starts_with("//"))
            .collect();
        if relative.is_empty() {
            return Vec::new();
        }
        let Some(root) = code_root(&code.url) else {
            return Vec::new();
        };

        let mut versions = Vec::new();
        for src in relative {
            let Ok(script_url) = root.join(&src) else {
                continue;
            };
            match self.gateway.fetch_text(script_url.as_str()).await {
                Ok(script) => match self.extractor.banner_version(&script) {
                    Some(version) => versions.push(version),
                    None => tracing::debug!("No version banner in {}", script_url),
                },
                Err(e) => tracing::debug!("Could not fetch {}: {}", script_url, e),
            }
        }
        versions
    }

    fn metadata(&self, fields: TokenFields, libraries: LibrarySummary) -> ArtworkMetadata {
        let gateways = self.gateway.gateways();
        ArtworkMetadata {
            description: fields.description,
            p5_versions: libraries.p5_versions,
            other_libraries: libraries.other_libraries,
            artifact_uri: gateways.convert(&fields.artifact_uri),
            display_uri: gateways.convert(&fields.display_uri),
            thumbnail_uri: gateways.convert(&fields.thumbnail_uri),
            generative_uri: gateways.convert(&fields.generative_uri),
            ipfs_link: fields.ipfs_link,
        }
    }
}

#[async_trait]
impl Verifier for LibraryCheckVerifier {
    fn kind(&self) -> CheckKind {
        CheckKind::Library
    }

    async fn verify(&mut self, artwork: &ArtworkReference) -> VerificationResult {
        let fields = match self.resolve(artwork).await {
            Ok(fields) => fields,
            Err(status) => {
                return VerificationResult::library(
                    artwork.clone(),
                    status,
                    1,
                    ArtworkMetadata::placeholder(),
                )
            }
        };

        let (libraries, attempts) = self.libraries(&fields).await;
        tracing::debug!(
            "Libraries for {}: p5 [{}], other [{}]",
            artwork.label(),
            libraries.p5_versions,
            libraries.other_libraries
        );

        VerificationResult::library(
            artwork.clone(),
            VerificationStatus::Success,
            attempts.max(1),
            self.metadata(fields, libraries),
        )
    }
}

/// Directory the fetched code was served from. A CID without a file name is a directory.
fn code_root(url: &str) -> Option<Url> {
    let mut root = Url::parse(url).ok()?;
    root.set_query(None);
    root.set_fragment(None);

    let names_file = root
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|last| last.contains('.'))
        .unwrap_or(false);
    if !names_file && !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    Some(root)
}

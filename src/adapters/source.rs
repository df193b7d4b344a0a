use crate::adapters::fxhash_api::{FeedToken, FxhashClient};
use crate::core::{ArtworkReference, ArtworkSource};
use crate::domain::settings::SourceSpec;
use async_trait::async_trait;
use rand::{Rng, SeedableRng};

/// Fixed list of artwork page URLs.
pub struct StaticSource {
    urls: Vec<String>,
}

impl StaticSource {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }
}

#[async_trait]
impl ArtworkSource for StaticSource {
    async fn artworks(&mut self) -> Vec<ArtworkReference> {
        self.urls
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(ArtworkReference::from_url)
            .collect()
    }
}

/// Every ID in `start..=end`, mapped through the page URL template.
pub struct RangeSource {
    start: u64,
    end: u64,
    url_template: String,
}

impl RangeSource {
    pub fn new(start: u64, end: u64, url_template: impl Into<String>) -> Self {
        Self {
            start,
            end,
            url_template: url_template.into(),
        }
    }
}

#[async_trait]
impl ArtworkSource for RangeSource {
    async fn artworks(&mut self) -> Vec<ArtworkReference> {
        if self.start > self.end {
            tracing::warn!("📭 Empty ID range {}..={}", self.start, self.end);
            return Vec::new();
        }
        (self.start..=self.end)
            .map(|id| ArtworkReference::from_id(id, &self.url_template))
            .collect()
    }
}

/// Latest tokens from the listing API, optionally preceded by one random existing token.
pub struct FeedSource<R: Rng + Send> {
    client: FxhashClient,
    take: u32,
    include_random: bool,
    random_picks: u32,
    url_template: String,
    rng: R,
}

impl<R: Rng + Send> FeedSource<R> {
    pub fn new(client: FxhashClient, take: u32, url_template: impl Into<String>, rng: R) -> Self {
        Self {
            client,
            take,
            include_random: false,
            random_picks: 9,
            url_template: url_template.into(),
            rng,
        }
    }

    pub fn with_random(mut self, random_picks: u32) -> Self {
        self.include_random = true;
        self.random_picks = random_picks;
        self
    }

    fn reference(&self, token: FeedToken) -> ArtworkReference {
        ArtworkReference::from_id(token.id, &self.url_template).with_token(token.summary)
    }

    /// Random IDs up to `max_id` that resolve to nothing are skipped.
    async fn pick_random(&mut self, max_id: u64) -> Option<FeedToken> {
        for pick in 1..=self.random_picks {
            let id = self.rng.gen_range(0..=max_id);
            match self.client.generative_token(id).await {
                Some(token) => {
                    tracing::info!("🎲 Random token {} picked on try {}", id, pick);
                    return Some(token);
                }
                None => tracing::debug!("Random id {} has no token (try {})", id, pick),
            }
        }
        tracing::warn!(
            "🎲 No random token found after {} picks",
            self.random_picks
        );
        None
    }
}

#[async_trait]
impl<R: Rng + Send> ArtworkSource for FeedSource<R> {
    async fn artworks(&mut self) -> Vec<ArtworkReference> {
        let latest = self.client.latest_tokens(self.take).await;
        let Some(max_id) = latest.first().map(|token| token.id) else {
            tracing::warn!("📭 Token listing returned nothing");
            return Vec::new();
        };

        let mut artworks = Vec::with_capacity(latest.len() + 1);
        if self.include_random {
            if let Some(token) = self.pick_random(max_id).await {
                artworks.push(self.reference(token));
            }
        }
        artworks.extend(latest.into_iter().map(|token| self.reference(token)));
        artworks
    }
}

/// Builds the source named by `spec`. The feed variant needs an API client.
pub fn source_from_spec(spec: &SourceSpec, client: FxhashClient) -> Box<dyn ArtworkSource> {
    match spec {
        SourceSpec::Static { urls } => Box::new(StaticSource::new(urls.clone())),
        SourceSpec::Range {
            start,
            end,
            url_template,
        } => Box::new(RangeSource::new(*start, *end, url_template.clone())),
        SourceSpec::Feed {
            take,
            include_random,
            random_picks,
        } => {
            let source = FeedSource::new(
                client,
                *take,
                crate::domain::model::DEFAULT_URL_TEMPLATE,
                rand::rngs::StdRng::from_entropy(),
            );
            if *include_random {
                Box::new(source.with_random(*random_picks))
            } else {
                Box::new(source)
            }
        }
    }
}

#[async_trait]
impl ArtworkSource for Box<dyn ArtworkSource> {
    async fn artworks(&mut self) -> Vec<ArtworkReference> {
        (**self).artworks().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DEFAULT_URL_TEMPLATE;
    use crate::domain::settings::Endpoints;
    use httpmock::prelude::*;
    use rand::rngs::StdRng;
    use std::time::Duration;

    fn client_for(server: &MockServer) -> FxhashClient {
        FxhashClient::new(
            Endpoints {
                api_base: server.base_url(),
                graphql_endpoint: server.url("/graphql"),
            },
            Duration::from_secs(2),
        )
    }

    fn listing() -> serde_json::Value {
        serde_json::json!({
            "data": { "generativeTokens": [
                { "id": 120, "name": "Dunes", "generativeUri": "ipfs://QmDunes", "author": { "name": "ana" } },
                { "id": 119, "name": "Grids", "generativeUri": "ipfs://QmGrids", "author": { "name": "bo" } }
            ]}
        })
    }

    #[tokio::test]
    async fn test_static_source_keeps_order_and_ids() {
        let mut source = StaticSource::new(vec![
            "https://www.fxhash.xyz/generative/30663".to_string(),
            " ".to_string(),
            "https://www.fxhash.xyz/generative/30661".to_string(),
        ]);
        let artworks = source.artworks().await;
        assert_eq!(artworks.len(), 2);
        assert_eq!(artworks[0].id, Some(30663));
        assert_eq!(artworks[1].id, Some(30661));
    }

    #[tokio::test]
    async fn test_range_source_is_closed_interval() {
        let mut source = RangeSource::new(30661, 30664, DEFAULT_URL_TEMPLATE);
        let artworks = source.artworks().await;
        assert_eq!(artworks.len(), 4);
        assert_eq!(artworks[0].url, "https://www.fxhash.xyz/generative/30661");
        assert_eq!(artworks[3].url, "https://www.fxhash.xyz/generative/30664");

        let mut empty = RangeSource::new(10, 9, DEFAULT_URL_TEMPLATE);
        assert!(empty.artworks().await.is_empty());
    }

    #[tokio::test]
    async fn test_feed_source_puts_random_token_first() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains("\"operationName\":\"GenerativeTokens\"");
            then.status(200).json_body(listing());
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains("\"operationName\":\"GenerativeTokenFeatures\"");
            then.status(200).json_body(serde_json::json!({
                "data": { "generativeToken": { "name": "Lucky", "generativeUri": "ipfs://QmLucky", "features": null } }
            }));
        });

        let mut source = FeedSource::new(
            client_for(&server),
            20,
            DEFAULT_URL_TEMPLATE,
            StdRng::seed_from_u64(7),
        )
        .with_random(3);
        let artworks = source.artworks().await;

        assert_eq!(artworks.len(), 3);
        let random = &artworks[0];
        assert!(random.id.unwrap() <= 120);
        assert_eq!(random.token.as_ref().unwrap().name, "Lucky");
        assert_eq!(artworks[1].id, Some(120));
        assert_eq!(artworks[2].token.as_ref().unwrap().generative_uri, "ipfs://QmGrids");
    }

    #[tokio::test]
    async fn test_feed_source_gives_up_after_random_picks() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains("\"operationName\":\"GenerativeTokens\"");
            then.status(200).json_body(listing());
        });
        let lookups = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains("\"operationName\":\"GenerativeTokenFeatures\"");
            then.status(200)
                .json_body(serde_json::json!({ "data": { "generativeToken": null } }));
        });

        let mut source = FeedSource::new(
            client_for(&server),
            20,
            DEFAULT_URL_TEMPLATE,
            StdRng::seed_from_u64(1),
        )
        .with_random(4);
        let artworks = source.artworks().await;

        lookups.assert_hits(4);
        assert_eq!(artworks.len(), 2);
        assert_eq!(artworks[0].id, Some(120));
    }

    #[tokio::test]
    async fn test_feed_source_is_empty_when_listing_fails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(500).body("upstream down");
        });

        let mut source = FeedSource::new(
            client_for(&server),
            20,
            DEFAULT_URL_TEMPLATE,
            StdRng::seed_from_u64(1),
        )
        .with_random(9);
        assert!(source.artworks().await.is_empty());
    }
}

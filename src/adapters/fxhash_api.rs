use crate::domain::model::{TokenSummary, PLACEHOLDER};
use crate::domain::settings::Endpoints;
use crate::utils::error::{Result, VerifyError};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const LATEST_TOKENS_QUERY: &str = r#"
query GenerativeTokens($skip: Int, $take: Int, $sort: GenerativeSortInput, $filters: GenerativeTokenFilter) {
  generativeTokens(skip: $skip, take: $take, sort: $sort, filters: $filters) {
    id
    name
    generativeUri
    slug
    flag
    author {
      name
    }
  }
}
"#;

const TOKEN_FEATURES_QUERY: &str = r#"
query GenerativeTokenFeatures($id: Float) {
  generativeToken(id: $id) {
    name
    generativeUri
    features
  }
}
"#;

/// Token record from the REST lookup. Missing fields hold the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiToken {
    pub description: String,
    pub ipfs: String,
    pub artifact_uri: String,
    pub display_uri: String,
    pub thumbnail_uri: String,
    pub generative_uri: String,
}

impl ApiToken {
    fn from_value(token: &Value) -> Self {
        Self {
            description: text_field(token, "description"),
            ipfs: text_field(token, "ipfs"),
            artifact_uri: text_field(token, "artifactUri"),
            display_uri: text_field(token, "displayUri"),
            thumbnail_uri: text_field(token, "thumbnailUri"),
            generative_uri: text_field(token, "generativeUri"),
        }
    }
}

/// Token entry from the GraphQL listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedToken {
    pub id: u64,
    pub summary: TokenSummary,
}

#[derive(Debug, Clone)]
pub struct FxhashClient {
    client: Client,
    endpoints: Endpoints,
    timeout: Duration,
}

impl FxhashClient {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Self {
        Self::with_client(Client::new(), endpoints, timeout)
    }

    pub fn with_client(client: Client, endpoints: Endpoints, timeout: Duration) -> Self {
        Self {
            client,
            endpoints,
            timeout,
        }
    }

    /// REST lookup by ID. `Ok(None)` when the API answers without a token.
    pub async fn token(&self, id: u64) -> Result<Option<ApiToken>> {
        let url = format!(
            "{}/v1/tokens/{}",
            self.endpoints.api_base.trim_end_matches('/'),
            id
        );
        tracing::debug!("Looking up token {} at {}", id, url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        Ok(body
            .get("token")
            .filter(|token| token.is_object())
            .map(ApiToken::from_value))
    }

    /// Most recently opened tokens first. Any failure yields an empty list.
    pub async fn latest_tokens(&self, take: u32) -> Vec<FeedToken> {
        let body = json!({
            "operationName": "GenerativeTokens",
            "variables": {
                "skip": 0,
                "take": take,
                "sort": { "mintOpensAt": "DESC" },
                "filters": { "flag_in": ["CLEAN", "NONE"] }
            },
            "query": LATEST_TOKENS_QUERY,
        });

        let data = match self.post_graphql(&body).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("⚠️ Error fetching latest generative tokens: {}", e);
                return Vec::new();
            }
        };

        let Some(tokens) = data.get("generativeTokens").and_then(Value::as_array) else {
            tracing::warn!("⚠️ Latest tokens response has no generativeTokens list");
            return Vec::new();
        };

        tokens
            .iter()
            .filter_map(|token| match token_id(token) {
                Some(id) => Some(FeedToken {
                    id,
                    summary: summary_from_value(token),
                }),
                None => {
                    tracing::debug!("Skipping listed token without a numeric id: {}", token);
                    None
                }
            })
            .collect()
    }

    /// Single token by ID through GraphQL. `None` when it does not exist or the call fails.
    pub async fn generative_token(&self, id: u64) -> Option<FeedToken> {
        let body = json!({
            "operationName": "GenerativeTokenFeatures",
            "variables": { "id": id },
            "query": TOKEN_FEATURES_QUERY,
        });

        match self.post_graphql(&body).await {
            Ok(data) => data
                .get("generativeToken")
                .filter(|token| token.is_object())
                .map(|token| FeedToken {
                    id,
                    summary: summary_from_value(token),
                }),
            Err(e) => {
                tracing::warn!("⚠️ Error fetching token {}: {}", id, e);
                None
            }
        }
    }

    async fn post_graphql(&self, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.endpoints.graphql_endpoint)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VerifyError::ProcessingError {
                message: format!("GraphQL endpoint returned {} - {}", status, text),
            });
        }

        let mut payload: Value = response.json().await?;
        if let Some(errors) = payload.get("errors").filter(|e| !e.is_null()) {
            return Err(VerifyError::ProcessingError {
                message: format!("GraphQL errors: {}", errors),
            });
        }

        match payload.get_mut("data").map(Value::take) {
            Some(data) if data.is_object() => Ok(data),
            _ => Err(VerifyError::ProcessingError {
                message: "GraphQL response has no data".to_string(),
            }),
        }
    }
}

fn text_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(PLACEHOLDER)
        .to_string()
}

fn summary_from_value(token: &Value) -> TokenSummary {
    TokenSummary {
        name: text_field(token, "name"),
        generative_uri: text_field(token, "generativeUri"),
        author: token
            .get("author")
            .map(|author| text_field(author, "name"))
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
    }
}

// The listing API has served ids both as numbers and as strings
fn token_id(token: &Value) -> Option<u64> {
    match token.get("id")? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> FxhashClient {
        FxhashClient::new(
            Endpoints {
                api_base: server.base_url(),
                graphql_endpoint: server.url("/graphql"),
            },
            Duration::from_secs(2),
        )
    }

    #[tokio::test]
    async fn test_token_lookup_defaults_missing_fields() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/v1/tokens/30661");
            then.status(200).json_body(serde_json::json!({
                "token": {
                    "description": "  Flow fields  ",
                    "ipfs": "ipfs://QmCode",
                    "generativeUri": "ipfs://QmCode",
                    "displayUri": null
                }
            }));
        });

        let token = client_for(&server).token(30661).await.unwrap().unwrap();

        api_mock.assert();
        assert_eq!(token.description, "Flow fields");
        assert_eq!(token.ipfs, "ipfs://QmCode");
        assert_eq!(token.display_uri, "-");
        assert_eq!(token.artifact_uri, "-");
    }

    #[tokio::test]
    async fn test_token_lookup_errors_on_server_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/tokens/1");
            then.status(503);
        });

        assert!(client_for(&server).token(1).await.is_err());
    }

    #[tokio::test]
    async fn test_latest_tokens_parses_listing() {
        let server = MockServer::start();
        let graphql_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains("\"operationName\":\"GenerativeTokens\"");
            then.status(200).json_body(serde_json::json!({
                "data": { "generativeTokens": [
                    { "id": 31600, "name": "Dunes", "generativeUri": "ipfs://QmDunes", "author": { "name": "ana" } },
                    { "id": "31599", "name": "Grids", "generativeUri": "ipfs://QmGrids", "author": null },
                    { "name": "no id" }
                ]}
            }));
        });

        let tokens = client_for(&server).latest_tokens(20).await;

        graphql_mock.assert();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].id, 31600);
        assert_eq!(tokens[0].summary.author, "ana");
        assert_eq!(tokens[1].id, 31599);
        assert_eq!(tokens[1].summary.author, "-");
    }

    #[tokio::test]
    async fn test_latest_tokens_tolerates_graphql_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(serde_json::json!({
                "errors": [{ "message": "rate limited" }]
            }));
        });

        assert!(client_for(&server).latest_tokens(20).await.is_empty());
    }

    #[tokio::test]
    async fn test_latest_tokens_non_json_reply_is_empty() {
        let server = MockServer::start();
        let graphql_mock = server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).body("<html>rate limited</html>");
        });

        let tokens = client_for(&server).latest_tokens(20).await;

        graphql_mock.assert();
        assert!(tokens.is_empty());
    }

    #[tokio::test]
    async fn test_token_lookup_non_json_reply_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/tokens/2");
            then.status(200).body("<html>rate limited</html>");
        });

        assert!(client_for(&server).token(2).await.is_err());
    }

    #[tokio::test]
    async fn test_generative_token_null_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200)
                .json_body(serde_json::json!({ "data": { "generativeToken": null } }));
        });

        assert_eq!(client_for(&server).generative_token(7).await, None);
    }
}

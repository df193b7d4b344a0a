use crate::core::uri::is_content_addressed;
use crate::domain::settings::Gateways;
use crate::utils::error::{Result, VerifyError};
use reqwest::Client;
use std::time::Duration;

/// Document retrieved through one of the gateways.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedCode {
    pub url: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    gateways: Gateways,
    timeout: Duration,
}

impl GatewayClient {
    pub fn new(gateways: Gateways, timeout: Duration) -> Self {
        Self::with_client(Client::new(), gateways, timeout)
    }

    pub fn with_client(client: Client, gateways: Gateways, timeout: Duration) -> Self {
        Self {
            client,
            gateways,
            timeout,
        }
    }

    pub fn gateways(&self) -> &Gateways {
        &self.gateways
    }

    /// Tries the generic gateway, then the service gateway. First 2xx wins.
    pub async fn fetch(&self, uri: &str) -> Result<FetchedCode> {
        if uri.trim().is_empty() || uri == crate::domain::model::PLACEHOLDER {
            return Err(VerifyError::ProcessingError {
                message: "no code link to fetch".to_string(),
            });
        }

        if !is_content_addressed(uri) {
            tracing::debug!("{} is not an IPFS link, fetching it as is", uri);
        }

        let mut failures = Vec::new();
        for url in self.gateways.fetch_candidates(uri) {
            match self.fetch_text(&url).await {
                Ok(body) => return Ok(FetchedCode { url, body }),
                Err(e) => {
                    tracing::debug!("Gateway fetch failed for {}: {}", url, e);
                    failures.push(format!("{} ({})", url, e));
                }
            }
        }

        Err(VerifyError::ProcessingError {
            message: format!("all gateways failed: {}", failures.join("; ")),
        })
    }

    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn gateways_for(server: &MockServer) -> Gateways {
        Gateways {
            generic: server.url("/generic/ipfs/"),
            service: server.url("/service/ipfs/"),
        }
    }

    #[tokio::test]
    async fn test_falls_back_to_service_gateway() {
        let server = MockServer::start();
        let generic = server.mock(|when, then| {
            when.method(GET).path("/generic/ipfs/QmCode");
            then.status(504);
        });
        let service = server.mock(|when, then| {
            when.method(GET).path("/service/ipfs/QmCode");
            then.status(200).body("<html>sketch</html>");
        });

        let client = GatewayClient::new(gateways_for(&server), Duration::from_secs(2));
        let fetched = client.fetch("ipfs://QmCode").await.unwrap();

        generic.assert();
        service.assert();
        assert_eq!(fetched.body, "<html>sketch</html>");
        assert!(fetched.url.ends_with("/service/ipfs/QmCode"));
    }

    #[tokio::test]
    async fn test_placeholder_is_not_fetched() {
        let client = GatewayClient::new(Gateways::default(), Duration::from_secs(1));
        assert!(client.fetch("-").await.is_err());
    }

    #[tokio::test]
    async fn test_all_gateways_failing_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(404);
        });

        let client = GatewayClient::new(gateways_for(&server), Duration::from_secs(2));
        let err = client.fetch("ipfs://QmMissing").await.unwrap_err();
        assert!(err.to_string().contains("all gateways failed"));
    }
}

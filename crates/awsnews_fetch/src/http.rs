use async_trait::async_trait;
use awsnews_core::{Error, PageFetcher, Result, ServiceConfig};
use reqwest::Client;
use tracing::debug;

/// Shared HTTP client for the index endpoint and article pages.
pub fn build_client(config: &ServiceConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| Error::Configuration(format!("Failed to create HTTP client: {}", e)))
}

#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        debug!("Fetching article page {}", url);
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Fetch(format!("Timed out downloading article {}", url))
            } else {
                Error::Fetch(format!("Error downloading article {}: {}", url, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!(
                "HTTP error {} when downloading article {}",
                status.as_u16(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Fetch(format!("Error reading article body {}: {}", url, e)))
    }
}

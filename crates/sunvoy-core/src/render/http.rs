use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{RenderOptions, Renderer};
use crate::api::ApiError;

/// Renders by fetching the server's HTML directly.
///
/// Page scripts never run, so this only works for markup the server sends
/// fully formed. `wait_until` has nothing to wait for and is ignored.
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(
        &self,
        url: &str,
        headers: &[(String, String)],
        options: RenderOptions,
    ) -> Result<String> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body).into());
        }

        let html = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        debug!(url, bytes = html.len(), "Page fetched");
        Ok(html)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

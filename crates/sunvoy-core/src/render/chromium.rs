//! Chromium-based renderer using chromiumoxide.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tracing::{debug, warn};

use super::{RenderOptions, Renderer, WaitUntil};

/// Quiet period after the load event before the page counts as settled.
const NETWORK_SETTLE_MS: u64 = 500;

/// Copies live form values into attributes, then serializes the document.
/// Without this, values set by script (e.g. a nonce) are missing from
/// `outerHTML`.
const SNAPSHOT_SCRIPT: &str = r#"(() => {
    document.querySelectorAll('input').forEach((el) => {
        el.setAttribute('value', el.value == null ? '' : el.value);
    });
    return document.documentElement.outerHTML;
})()"#;

/// Renders pages in a headless Chromium.
///
/// Each call launches its own browser and closes it before returning, so no
/// browser process outlives a render.
pub struct ChromiumRenderer {
    executable: Option<PathBuf>,
}

impl ChromiumRenderer {
    /// `executable` overrides Chromium auto-detection.
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self { executable }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        if let Some(ref path) = self.executable {
            builder = builder.chrome_executable(path);
        }
        builder
            .build()
            .map_err(|e| anyhow!("failed to build browser config: {e}"))
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn render(
        &self,
        url: &str,
        headers: &[(String, String)],
        options: RenderOptions,
    ) -> Result<String> {
        let config = self.browser_config()?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let outcome = match options.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, render_page(&browser, url, headers, options.wait_until)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(anyhow!("page not ready after {}ms: {}", limit.as_millis(), url)),
                }
            }
            None => render_page(&browser, url, headers, options.wait_until).await,
        };

        if let Err(e) = browser.close().await {
            warn!(error = %e, "Failed to close Chromium");
        }
        if let Err(e) = browser.wait().await {
            debug!(error = %e, "Chromium did not exit cleanly");
        }
        handler_task.abort();

        outcome
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// Open a page, take the snapshot, and close the page again.
async fn render_page(
    browser: &Browser,
    url: &str,
    headers: &[(String, String)],
    wait_until: WaitUntil,
) -> Result<String> {
    let page = browser
        .new_page("about:blank")
        .await
        .context("failed to create new page")?;

    let outcome = snapshot(&page, url, headers, wait_until).await;

    if let Err(e) = page.close().await {
        debug!(error = %e, "Failed to close page");
    }
    outcome
}

async fn snapshot(
    page: &Page,
    url: &str,
    headers: &[(String, String)],
    wait_until: WaitUntil,
) -> Result<String> {
    if !headers.is_empty() {
        let map: serde_json::Map<String, serde_json::Value> = headers
            .iter()
            .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
            .collect();
        page.execute(SetExtraHttpHeadersParams::new(Headers::new(
            serde_json::Value::Object(map),
        )))
        .await
        .context("failed to set extra headers")?;
    }

    page.goto(url)
        .await
        .with_context(|| format!("navigation failed: {url}"))?;

    if wait_until == WaitUntil::NetworkIdle {
        page.wait_for_navigation()
            .await
            .with_context(|| format!("page did not finish loading: {url}"))?;
        tokio::time::sleep(Duration::from_millis(NETWORK_SETTLE_MS)).await;
    }

    let html: String = page
        .evaluate(SNAPSHOT_SCRIPT)
        .await
        .context("failed to read page HTML")?
        .into_value()
        .context("failed to convert page HTML")?;

    debug!(url, bytes = html.len(), "Page rendered");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_snapshot_includes_script_set_values() {
        let renderer = ChromiumRenderer::new(None);
        let html = renderer
            .render(
                "data:text/html,<form><input name='nonce'></form>\
                 <script>document.querySelector('input').value='abc123'</script>",
                &[],
                RenderOptions::dom_ready(),
            )
            .await
            .expect("render failed");

        assert!(html.contains(r#"value="abc123""#));
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_timeout_is_an_error() {
        let renderer = ChromiumRenderer::new(None);
        let result = renderer
            .render(
                "data:text/html,<p>slow</p>",
                &[],
                RenderOptions::network_idle(Duration::from_millis(1)),
            )
            .await;

        assert!(result.is_err());
    }
}

//! Renderer abstraction for turning a URL into a DOM snapshot.
//!
//! Defines the `Renderer` trait that the login flow and the page extractor
//! render through, so the browser engine can be swapped without touching the
//! session logic:
//!
//! - `ChromiumRenderer`: headless Chromium via chromiumoxide; runs page scripts
//! - `HttpRenderer`: plain GET through reqwest; no scripts, server markup only

pub mod chromium;
pub mod http;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

pub use chromium::ChromiumRenderer;
pub use http::HttpRenderer;

/// How long to wait before taking the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// The DOM is parsed and synchronous scripts have run.
    DomContentLoaded,
    /// Additionally wait for network activity to settle.
    NetworkIdle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub wait_until: WaitUntil,
    /// Upper bound for the whole render. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl RenderOptions {
    /// DOM readiness, no time limit. Used on the login path.
    pub fn dom_ready() -> Self {
        Self {
            wait_until: WaitUntil::DomContentLoaded,
            timeout: None,
        }
    }

    /// Network idle, bounded by `timeout`. Used on the scrape path.
    pub fn network_idle(timeout: Duration) -> Self {
        Self {
            wait_until: WaitUntil::NetworkIdle,
            timeout: Some(timeout),
        }
    }
}

/// An engine that renders a page and returns its serialized DOM.
///
/// Implementations acquire whatever they need for one render (browser, page,
/// connection) and release it before returning, on success and on error.
/// Form controls in the snapshot carry their live values as `value`
/// attributes.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `url`, sending `headers` with every request the page makes.
    async fn render(
        &self,
        url: &str,
        headers: &[(String, String)],
        options: RenderOptions,
    ) -> Result<String>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use super::{RenderOptions, Renderer};

    #[derive(Debug, Clone)]
    pub(crate) struct RenderCall {
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub options: RenderOptions,
    }

    /// Serves canned HTML by URL path and records every call.
    #[derive(Default)]
    pub(crate) struct StaticRenderer {
        pages: HashMap<String, std::result::Result<String, String>>,
        calls: Mutex<Vec<RenderCall>>,
    }

    impl StaticRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(mut self, path: &str, html: &str) -> Self {
            self.pages.insert(path.to_string(), Ok(html.to_string()));
            self
        }

        pub fn with_failure(mut self, path: &str, message: &str) -> Self {
            self.pages.insert(path.to_string(), Err(message.to_string()));
            self
        }

        pub fn calls(&self) -> Vec<RenderCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Renderer for StaticRenderer {
        async fn render(
            &self,
            url: &str,
            headers: &[(String, String)],
            options: RenderOptions,
        ) -> Result<String> {
            self.calls.lock().unwrap().push(RenderCall {
                url: url.to_string(),
                headers: headers.to_vec(),
                options,
            });
            let path = reqwest::Url::parse(url)?.path().to_string();
            match self.pages.get(&path) {
                Some(Ok(html)) => Ok(html.clone()),
                Some(Err(message)) => Err(anyhow!("{}", message)),
                None => Err(anyhow!("no page for {}", path)),
            }
        }

        fn name(&self) -> &'static str {
            "static"
        }
    }
}

//! Structured extraction from authenticated pages.
//!
//! Extraction is coupled to the site's markup and therefore best-effort:
//! a render failure or a missing element degrades the result (empty list,
//! absent user) and is logged, but never ends the run.

pub mod parse;

use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::api::AuthenticatedClient;
use crate::models::UserRecord;
use crate::render::{RenderOptions, Renderer};

pub use parse::{parse_settings_form, parse_user_cards, PageLayout, Selectors};

const LIST_PATH: &str = "/list";
const SETTINGS_PATH: &str = "/settings";

/// Renders authenticated pages and pulls `UserRecord`s out of them.
pub struct PageExtractor<'a> {
    client: &'a AuthenticatedClient,
    renderer: &'a dyn Renderer,
    selectors: Selectors,
    timeout: Duration,
}

impl<'a> PageExtractor<'a> {
    /// `timeout` bounds each page render. Fails only on an invalid layout.
    pub fn new(
        client: &'a AuthenticatedClient,
        renderer: &'a dyn Renderer,
        layout: &PageLayout,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client,
            renderer,
            selectors: Selectors::compile(layout)?,
            timeout,
        })
    }

    async fn render(&self, path: &str) -> Result<String> {
        let url = self.client.url(path)?;
        self.renderer
            .render(
                url.as_str(),
                &self.client.render_headers(),
                RenderOptions::network_idle(self.timeout),
            )
            .await
    }

    /// All users on the listing page. Empty on any render failure.
    pub async fn extract_list(&self) -> Vec<UserRecord> {
        match self.render(LIST_PATH).await {
            Ok(html) => {
                let users = parse_user_cards(&html, &self.selectors);
                info!(count = users.len(), "Extracted users from list");
                users
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Failed to render user list");
                Vec::new()
            }
        }
    }

    /// The signed-in user from the settings form.
    /// `None` if the page fails to render or has no form.
    pub async fn extract_current_user(&self) -> Option<UserRecord> {
        let html = match self.render(SETTINGS_PATH).await {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Failed to render settings page");
                return None;
            }
        };

        let user = parse_settings_form(&html, &self.selectors);
        if user.is_none() {
            warn!("Settings form not found");
        }
        user
    }
}

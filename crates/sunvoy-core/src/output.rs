//! The JSON document produced by a run.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::UserRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub users: Vec<UserRecord>,
    pub current_user: Option<UserRecord>,
}

impl Report {
    pub fn new(users: Vec<UserRecord>, current_user: Option<UserRecord>) -> Self {
        Self {
            generated_at: Utc::now(),
            users,
            current_user,
        }
    }

    /// Write the report as pretty JSON, replacing any existing file
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
            }
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write output file {}", path.display()))?;
        info!(
            path = %path.display(),
            users = self.users.len(),
            current_user = self.current_user.is_some(),
            "Output written"
        );
        Ok(())
    }
}

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The cookie header that identifies an authenticated caller.
///
/// Opaque to this crate: it is forwarded verbatim as a `Cookie` header and
/// never parsed. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
    /// Wrap a cookie header value. Returns `None` for an empty or blank value.
    pub fn new(cookie_header: impl Into<String>) -> Option<Self> {
        let cookie_header = cookie_header.into();
        if cookie_header.trim().is_empty() {
            None
        } else {
            Some(Self(cookie_header))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Cookie values are bearer secrets
        write!(f, "SessionCredential(<{} bytes>)", self.0.len())
    }
}

/// On-disk layout of the session file
#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    #[serde(rename = "cookieHeader")]
    cookie_header: String,
}

/// Persists a single `SessionCredential` as `{ "cookieHeader": "..." }`.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored credential.
    ///
    /// A missing, unreadable, or malformed file (including one without a
    /// `cookieHeader`, or with an empty one) is reported as `None` so that the
    /// caller falls back to a fresh login.
    pub fn load(&self) -> Option<SessionCredential> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No readable session file");
                return None;
            }
        };

        match serde_json::from_str::<SessionFile>(&contents) {
            Ok(file) => {
                let credential = SessionCredential::new(file.cookie_header);
                if credential.is_none() {
                    debug!(path = %self.path.display(), "Session file has an empty cookie header");
                }
                credential
            }
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Malformed session file");
                None
            }
        }
    }

    /// Save the credential, replacing any previous session file
    pub fn save(&self, credential: &SessionCredential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create session directory {}", parent.display())
                })?;
            }
        }
        let file = SessionFile {
            cookie_header: credential.as_str().to_string(),
        };
        let contents = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write session file {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }
}

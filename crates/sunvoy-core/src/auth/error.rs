use reqwest::StatusCode;
use thiserror::Error;

use crate::api::ApiError;

/// Conditions that make a login impossible. All of them end the run.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Nonce not found on login page")]
    NonceNotFound,

    #[error("Failed to render login page: {0:#}")]
    Render(anyhow::Error),

    #[error("Login failed with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("Login failed: no cookies received")]
    NoCookies,

    #[error("Login request failed: {0}")]
    Api(#[from] ApiError),

    #[error("Failed to save session: {0:#}")]
    Persist(anyhow::Error),
}

//! Core library for sunvoy.
//!
//! Logs in to a single site with a nonce-protected form, keeps the resulting
//! cookie session on disk between runs, and extracts user records from
//! rendered pages.
//!
//! The pipeline runs strictly in order:
//! load session → validate → (login → save) → render pages → extract.

pub mod api;
pub mod auth;
pub mod config;
pub mod extract;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod utils;

pub use api::{ApiError, AuthenticatedClient};
pub use auth::{AuthError, Identity, SessionCredential, SessionManager, SessionOrigin, SessionStore};
pub use config::{Config, ConfigError, RendererKind};
pub use extract::{PageExtractor, PageLayout};
pub use models::UserRecord;
pub use output::Report;
pub use render::{Renderer, RenderOptions, WaitUntil};
